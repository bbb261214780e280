use clap::Parser;

/// Download books, covers and metadata from a numeric-id library site.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// First book id to try (inclusive).
    #[arg(default_value_t = 1)]
    pub start_id: u32,

    /// Last book id to try (inclusive).
    #[arg(default_value_t = 10)]
    pub end_id: u32,

    /// Base URL of the library site.
    #[arg(long, default_value = "https://tululu.org/")]
    pub base_url: String,

    /// Directory for downloaded book texts.
    #[arg(long, default_value = "books")]
    pub books_dir: String,

    /// Directory for downloaded cover images.
    #[arg(long, default_value = "images")]
    pub images_dir: String,

    /// Pause after a transport failure before moving on to the next id.
    #[arg(long, default_value_t = 5)]
    pub backoff_secs: u64,

    /// Connect/read timeout per request.
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Verify TLS certificates. Off by default: the site serves an
    /// incomplete certificate chain.
    #[arg(long)]
    pub verify_tls: bool,

    /// Write one JSON record per processed id to this file.
    #[arg(long)]
    pub report: Option<String>,
}
