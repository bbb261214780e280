use std::time::Duration;

use anyhow::Context as _;
use url::Url;

/// How one HTTP fetch resolved.
///
/// `NotFound` is a normal outcome for a gap in the id space; `TransportError`
/// means the network or the site itself is unreachable. The distinction
/// drives the orchestrator's skip-vs-backoff decision, so it is made here,
/// once, for description pages, text bodies and cover images alike.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(RawPage),
    NotFound,
    TransportError(reqwest::Error),
}

/// Unparsed response body plus the status it arrived with. Consumed by the
/// parser or the store, never retained.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawPage {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// The site serves an incomplete certificate chain, so verification is
    /// opt-in. Scoped to this client, not a process-wide override.
    pub verify_tls: bool,
    /// Connect/read budget per request.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            verify_tls: false,
            timeout: Duration::from_secs(10),
        }
    }
}

pub struct Transport {
    client: reqwest::blocking::Client,
}

impl Transport {
    pub fn new(config: &TransportConfig) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(config.timeout)
            .user_agent("tululu-dl/0.1")
            .build()
            .context("build http client")?;

        Ok(Self { client })
    }

    /// One GET, redirects not followed, no retries. Retry policy belongs to
    /// the orchestrator.
    ///
    /// The site answers lookups for missing books with a redirect to its
    /// front page, so a 3xx status means "absent" here, never "follow me".
    /// Error statuses are likewise a clean miss; only connection-level
    /// failures (DNS, refused, TLS, timeout) count as transport errors.
    pub fn fetch(&self, url: &Url) -> FetchOutcome {
        let response = match self.client.get(url.clone()).send() {
            Ok(response) => response,
            Err(err) => return FetchOutcome::TransportError(err),
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "resource absent");
            return FetchOutcome::NotFound;
        }

        match response.bytes() {
            Ok(body) => FetchOutcome::Success(RawPage {
                status: status.as_u16(),
                body: body.to_vec(),
            }),
            Err(err) => FetchOutcome::TransportError(err),
        }
    }
}
