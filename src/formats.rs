use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

/// Metadata parsed out of one book description page.
///
/// `title` and `author` are non-empty after trimming; `cover_url` has been
/// resolved against the page's own URL and is always absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub cover_url: Url,
    pub genres: Vec<String>,
    pub comments: Vec<String>,
}

/// Which fetch the pipeline was in the middle of when transport gave out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStage {
    Description,
    Text,
    Cover,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchStage::Description => "description",
            FetchStage::Text => "text",
            FetchStage::Cover => "cover",
        };
        f.write_str(name)
    }
}

/// Where one artifact (text body or cover image) ended up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactStatus {
    /// Written to disk; the path is only reported after the write returned.
    Saved { path: PathBuf },
    /// The site has no such resource for this id. Expected, not an error.
    Absent,
    /// The local write failed. An environment problem, kept for the report.
    Failed { reason: String },
}

/// End-of-pipeline record for one id, the unit handed to reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BookResult {
    Downloaded {
        id: u32,
        record: BookRecord,
        text: ArtifactStatus,
        cover: ArtifactStatus,
    },
    /// The description request came back as a redirect or error status:
    /// a gap in the id space.
    Missing { id: u32 },
    /// A connection-level failure cut this id short; whatever was fetched
    /// before the failure is dropped.
    TransportFailed {
        id: u32,
        stage: FetchStage,
        reason: String,
    },
    /// The description page exists but lacks a required element.
    ParseFailed { id: u32, reason: String },
}

impl BookResult {
    pub fn id(&self) -> u32 {
        match self {
            BookResult::Downloaded { id, .. }
            | BookResult::Missing { id }
            | BookResult::TransportFailed { id, .. }
            | BookResult::ParseFailed { id, .. } => *id,
        }
    }
}
