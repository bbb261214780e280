use url::Url;

/// Characters that cannot appear in a single path segment on the platforms
/// we care about, path separators included.
const ILLEGAL: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Reduce untrusted remote text to one safe path segment.
///
/// Separators and filesystem-illegal characters are dropped rather than
/// replaced, trailing dots are trimmed (which also kills `.` and `..`), and
/// a string with nothing left falls back to `untitled`.
pub fn sanitize(raw: &str) -> String {
    let kept = raw
        .chars()
        .filter(|ch| !ch.is_control() && !ILLEGAL.contains(ch))
        .collect::<String>();
    let kept = kept.trim().trim_end_matches('.').trim_end();

    if kept.is_empty() {
        "untitled".to_owned()
    } else {
        kept.to_owned()
    }
}

/// `{id}.{title}.txt`. The id prefix keeps names distinct across books
/// whose titles sanitize to the same string.
pub fn text_filename(id: u32, title: &str) -> String {
    format!("{id}.{}.txt", sanitize(title))
}

/// `{id}_{title}{ext}`, extension taken from the cover URL's path.
pub fn cover_filename(id: u32, title: &str, cover_url: &Url) -> String {
    format!("{id}_{}{}", sanitize(title), extension_from_url(cover_url))
}

/// Extension (leading dot included) of the percent-decoded final path
/// segment. The query string never contributes: `.../image.jpg?v=9341124`
/// is a `.jpg`, whatever the query looks like. A segment with no usable
/// extension yields an empty string.
pub fn extension_from_url(url: &Url) -> String {
    let path = url.path();
    let decoded = urlencoding::decode(path)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| path.to_owned());

    let segment = decoded.rsplit('/').next().unwrap_or_default();
    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => format!(".{ext}"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(raw: &str) -> Url {
        Url::parse(raw).expect("parse test url")
    }

    #[test]
    fn extension_ignores_fragment() {
        let url = parsed("http://example.com/image.png#about_python");
        assert_eq!(extension_from_url(&url), ".png");
    }

    #[test]
    fn extension_ignores_query_string() {
        let url = parsed("http://example.com/image.jpg?v=9341124");
        assert_eq!(extension_from_url(&url), ".jpg");
    }

    #[test]
    fn extension_comes_from_the_percent_decoded_path() {
        let url = parsed("https://example.com/txt/hello%20world.txt?v=9#python");
        assert_eq!(extension_from_url(&url), ".txt");
    }

    #[test]
    fn extension_of_a_plain_path() {
        let url = parsed("http://example.com/image.png");
        assert_eq!(extension_from_url(&url), ".png");
    }

    #[test]
    fn path_without_extension_yields_nothing() {
        let url = parsed("http://example.com/covers/12345");
        assert_eq!(extension_from_url(&url), "");
    }

    #[test]
    fn sanitize_strips_separators_and_illegal_characters() {
        assert_eq!(sanitize("  Fate/Zero  "), "FateZero");
        assert_eq!(sanitize("what? a \"title\": two*"), "what a title two");

        let hostile = sanitize("../../etc/passwd");
        assert!(!hostile.contains('/'));
        assert!(!hostile.contains('\\'));
        assert_ne!(hostile, "..");
    }

    #[test]
    fn sanitize_falls_back_when_nothing_survives() {
        assert_eq!(sanitize("..."), "untitled");
        assert_eq!(sanitize("???"), "untitled");
        assert_eq!(sanitize(""), "untitled");
    }

    #[test]
    fn identical_titles_stay_unique_across_ids() {
        let a = text_filename(17, "Collected Works");
        let b = text_filename(18, "Collected  Works".replace("  ", " ").as_str());

        assert_eq!(a, "17.Collected Works.txt");
        assert_eq!(b, "18.Collected Works.txt");
        assert_ne!(a, b);
    }

    #[test]
    fn cover_filename_uses_the_path_extension() {
        let url = parsed("https://tululu.org/shots/5.jpg?v=9341124");
        assert_eq!(cover_filename(5, "Dune", &url), "5_Dune.jpg");
    }
}
