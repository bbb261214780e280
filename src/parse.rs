use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::formats::BookRecord;

/// The description page is missing a structurally required element.
///
/// Only the title heading and the cover image are required; a book with no
/// comments or genres is perfectly well-formed.
#[derive(Debug, thiserror::Error)]
pub enum MalformedPage {
    #[error("description page has no title heading")]
    MissingHeading,
    #[error("title heading is not `Title :: Author`: {0:?}")]
    BadHeading(String),
    #[error("description page has no cover image")]
    MissingCover,
    #[error("cover url does not resolve: {0:?}")]
    BadCoverUrl(String),
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("selector literal")
}

/// Extract a [`BookRecord`] from a description page body.
///
/// The heading text is split on the FIRST `::`; a title containing the
/// literal separator would lose its tail to the author field, which matches
/// how the site encodes the pair. `page_url` is the URL the page itself was
/// fetched from and anchors the cover's relative link.
pub fn parse_book_page(html: &str, page_url: &Url) -> Result<BookRecord, MalformedPage> {
    let document = Html::parse_document(html);

    let heading = document
        .select(&selector("div#content h1"))
        .next()
        .ok_or(MalformedPage::MissingHeading)?;
    let heading_text = text_of(&heading);
    let (title, author) = match heading_text.split_once("::") {
        Some((title, author)) => (title.trim().to_owned(), author.trim().to_owned()),
        None => return Err(MalformedPage::BadHeading(heading_text)),
    };
    if title.is_empty() || author.is_empty() {
        return Err(MalformedPage::BadHeading(heading_text));
    }

    let cover_src = document
        .select(&selector("div.bookimage img"))
        .next()
        .and_then(|img| img.value().attr("src"))
        .ok_or(MalformedPage::MissingCover)?;
    let cover_url = page_url
        .join(cover_src)
        .map_err(|_| MalformedPage::BadCoverUrl(cover_src.to_owned()))?;

    let comments = document
        .select(&selector("div#content div.texts span.black"))
        .map(|span| text_of(&span))
        .collect();
    let genres = document
        .select(&selector("div#content span.d_book a"))
        .map(|link| text_of(&link))
        .collect();

    Ok(BookRecord {
        title,
        author,
        cover_url,
        genres,
        comments,
    })
}

fn text_of(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_owned()
}
