use std::fs::OpenOptions;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use anyhow::Context as _;
use serde::Serialize;

use crate::formats::{ArtifactStatus, BookResult};

/// One line of the optional JSONL run report.
#[derive(Debug, Serialize)]
struct ReportRecord<'a> {
    finished_at: String,
    #[serde(flatten)]
    result: &'a BookResult,
}

/// Appends one JSON record per processed id, handy for grepping a run
/// after the fact. Created fresh each run; there is no cross-run state.
pub struct ReportWriter {
    out: BufWriter<std::fs::File>,
}

impl ReportWriter {
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("create report: {}", path.display()))?;

        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    pub fn append(&mut self, result: &BookResult) -> anyhow::Result<()> {
        let record = ReportRecord {
            finished_at: chrono::Utc::now().to_rfc3339(),
            result,
        };
        serde_json::to_writer(&mut self.out, &record).context("serialize report record")?;
        self.out.write_all(b"\n").context("write report newline")?;

        Ok(())
    }

    pub fn finish(mut self) -> anyhow::Result<()> {
        self.out.flush().context("flush report")
    }
}

/// The per-book console block. This is the program's output proper, so it
/// goes to stdout; diagnostics go through `tracing` to stderr.
pub fn print_summary(result: &BookResult) {
    println!("index: {}", result.id());
    match result {
        BookResult::Downloaded {
            record,
            text,
            cover,
            ..
        } => {
            println!("title: {}", record.title);
            println!("author: {}", record.author);
            println!("genres: {}", record.genres.join(", "));
            println!("comments: {}", record.comments.len());
            println!("text: {}", describe_artifact(text));
            println!("cover: {}", describe_artifact(cover));
        }
        BookResult::Missing { .. } => {
            println!("no book at this id");
        }
        BookResult::TransportFailed { stage, reason, .. } => {
            println!("{stage} fetch failed: {reason}");
        }
        BookResult::ParseFailed { reason, .. } => {
            println!("description page did not parse: {reason}");
        }
    }
    println!();
}

fn describe_artifact(status: &ArtifactStatus) -> String {
    match status {
        ArtifactStatus::Saved { path } => path.display().to_string(),
        ArtifactStatus::Absent => "not available on the site".to_owned(),
        ArtifactStatus::Failed { reason } => format!("write failed: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lines_are_self_describing_json() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let path = temp.path().join("report.jsonl");

        let mut writer = ReportWriter::create(&path)?;
        writer.append(&BookResult::Missing { id: 3 })?;
        writer.append(&BookResult::ParseFailed {
            id: 4,
            reason: "description page has no title heading".to_owned(),
        })?;
        writer.finish()?;

        let contents = std::fs::read_to_string(&path)?;
        let lines = contents.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0])?;
        assert_eq!(first["status"], "missing");
        assert_eq!(first["id"], 3);
        assert!(first["finished_at"].is_string());

        let second: serde_json::Value = serde_json::from_str(lines[1])?;
        assert_eq!(second["status"], "parse_failed");
        assert_eq!(second["id"], 4);

        Ok(())
    }
}
