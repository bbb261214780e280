use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::cli::Cli;
use crate::formats::{ArtifactStatus, BookResult, FetchStage};
use crate::report;
use crate::transport::{FetchOutcome, Transport, TransportConfig};
use crate::{names, parse, store};

#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub base_url: Url,
    pub books_dir: PathBuf,
    pub images_dir: PathBuf,
    /// Fixed pause after a transport failure before moving to the next id.
    pub backoff: Duration,
    pub timeout: Duration,
    pub verify_tls: bool,
}

pub struct Downloader {
    config: DownloadConfig,
    transport: Transport,
}

pub fn run(args: Cli) -> anyhow::Result<()> {
    let base_url = Url::parse(&args.base_url).context("parse --base-url")?;
    if base_url.scheme() != "http" && base_url.scheme() != "https" {
        anyhow::bail!("--base-url must be http/https: {base_url}");
    }

    let downloader = Downloader::new(DownloadConfig {
        base_url,
        books_dir: PathBuf::from(&args.books_dir),
        images_dir: PathBuf::from(&args.images_dir),
        backoff: Duration::from_secs(args.backoff_secs),
        timeout: Duration::from_secs(args.timeout_secs),
        verify_tls: args.verify_tls,
    })?;

    let mut report_writer = match args.report.as_deref() {
        Some(path) => Some(report::ReportWriter::create(Path::new(path))?),
        None => None,
    };

    downloader.run_with(args.start_id, args.end_id, |result| {
        report::print_summary(result);
        if let Some(writer) = report_writer.as_mut() {
            writer.append(result).context("append report record")?;
        }
        Ok(())
    })?;

    if let Some(writer) = report_writer {
        writer.finish().context("flush report")?;
    }

    Ok(())
}

impl Downloader {
    pub fn new(config: DownloadConfig) -> anyhow::Result<Self> {
        let transport = Transport::new(&TransportConfig {
            verify_tls: config.verify_tls,
            timeout: config.timeout,
        })
        .context("build transport")?;

        Ok(Self { config, transport })
    }

    /// Walk the id range in ascending order, one book at a time.
    pub fn run(&self, start_id: u32, end_id: u32) -> anyhow::Result<Vec<BookResult>> {
        self.run_with(start_id, end_id, |_| Ok(()))
    }

    /// Like [`Downloader::run`], calling `on_result` as each id settles so
    /// the caller can report progressively.
    ///
    /// Per-id failures never abort the range: a missing book, a broken page
    /// and a dropped connection all become a [`BookResult`] and the walk
    /// moves on, pausing for the configured backoff after transport
    /// failures. The only aborting errors are bad bounds and an unusable
    /// destination directory, both detected before the first fetch.
    pub fn run_with<F>(
        &self,
        start_id: u32,
        end_id: u32,
        mut on_result: F,
    ) -> anyhow::Result<Vec<BookResult>>
    where
        F: FnMut(&BookResult) -> anyhow::Result<()>,
    {
        if start_id == 0 {
            anyhow::bail!("book ids start at 1");
        }
        if start_id > end_id {
            anyhow::bail!("start id {start_id} is past end id {end_id}");
        }

        store::ensure_dir(&self.config.books_dir).context("create books directory")?;
        store::ensure_dir(&self.config.images_dir).context("create images directory")?;

        let mut results = Vec::with_capacity((end_id - start_id + 1) as usize);
        for id in start_id..=end_id {
            let result = self.process_book(id);
            if let BookResult::TransportFailed { stage, reason, .. } = &result {
                tracing::warn!(
                    id,
                    stage = %stage,
                    reason = %reason,
                    "transport failure; pausing before the next id"
                );
                std::thread::sleep(self.config.backoff);
            }

            on_result(&result)?;
            results.push(result);
        }

        Ok(results)
    }

    fn description_url(&self, id: u32) -> Url {
        let mut url = self.config.base_url.clone();
        url.set_path(&format!("/b{id}/"));
        url
    }

    fn text_url(&self, id: u32) -> Url {
        let mut url = self.config.base_url.clone();
        url.set_path("/txt.php");
        url.set_query(Some(&format!("id={id}")));
        url
    }

    /// FetchDescription -> ParseDescription -> FetchText -> FetchCover.
    /// Every exit from this function is a settled [`BookResult`].
    fn process_book(&self, id: u32) -> BookResult {
        let description_url = self.description_url(id);
        let page = match self.transport.fetch(&description_url) {
            FetchOutcome::Success(page) => page,
            FetchOutcome::NotFound => {
                tracing::info!(id, "no book at this id");
                return BookResult::Missing { id };
            }
            FetchOutcome::TransportError(err) => {
                return BookResult::TransportFailed {
                    id,
                    stage: FetchStage::Description,
                    reason: err.to_string(),
                };
            }
        };

        let record = match parse::parse_book_page(&page.text(), &description_url) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(id, error = %err, "description page did not parse");
                return BookResult::ParseFailed {
                    id,
                    reason: err.to_string(),
                };
            }
        };

        let text = match self.transport.fetch(&self.text_url(id)) {
            FetchOutcome::Success(body) => {
                let path = self
                    .config
                    .books_dir
                    .join(names::text_filename(id, &record.title));
                persist(store::write_text(&path, &body.text()))
            }
            FetchOutcome::NotFound => ArtifactStatus::Absent,
            FetchOutcome::TransportError(err) => {
                return BookResult::TransportFailed {
                    id,
                    stage: FetchStage::Text,
                    reason: err.to_string(),
                };
            }
        };

        let cover = match self.transport.fetch(&record.cover_url) {
            FetchOutcome::Success(image) => {
                let path = self
                    .config
                    .images_dir
                    .join(names::cover_filename(id, &record.title, &record.cover_url));
                persist(store::write_binary(&path, &image.body))
            }
            FetchOutcome::NotFound => ArtifactStatus::Absent,
            FetchOutcome::TransportError(err) => {
                return BookResult::TransportFailed {
                    id,
                    stage: FetchStage::Cover,
                    reason: err.to_string(),
                };
            }
        };

        BookResult::Downloaded {
            id,
            record,
            text,
            cover,
        }
    }
}

/// A failed write is an environment problem, not a gap in the remote data;
/// say so loudly but keep the run going.
fn persist(written: anyhow::Result<PathBuf>) -> ArtifactStatus {
    match written {
        Ok(path) => ArtifactStatus::Saved { path },
        Err(err) => {
            let reason = format!("{err:#}");
            tracing::error!(reason = %reason, "artifact write failed");
            ArtifactStatus::Failed { reason }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downloader(base_url: &str) -> Downloader {
        Downloader::new(DownloadConfig {
            base_url: Url::parse(base_url).expect("parse base url"),
            books_dir: PathBuf::from("books"),
            images_dir: PathBuf::from("images"),
            backoff: Duration::from_secs(0),
            timeout: Duration::from_secs(1),
            verify_tls: false,
        })
        .expect("build downloader")
    }

    #[test]
    fn description_and_text_urls_follow_the_site_layout() {
        let downloader = downloader("https://tululu.org/");

        assert_eq!(
            downloader.description_url(5).as_str(),
            "https://tululu.org/b5/"
        );
        assert_eq!(
            downloader.text_url(5).as_str(),
            "https://tululu.org/txt.php?id=5"
        );
    }

    #[test]
    fn zero_start_id_is_a_configuration_error() {
        let err = downloader("http://127.0.0.1:1/").run(0, 3).unwrap_err();
        assert!(err.to_string().contains("ids start at 1"));
    }

    #[test]
    fn inverted_bounds_are_a_configuration_error() {
        let err = downloader("http://127.0.0.1:1/").run(7, 3).unwrap_err();
        assert!(err.to_string().contains("past end id"));
    }
}
