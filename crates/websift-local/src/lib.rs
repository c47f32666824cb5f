use std::time::Duration;
use websift_core::{Error, FetchOutcome, PageFetcher, Result};

pub mod normalize;
pub mod pipeline;
pub mod search;
pub mod summarize;

/// Browser-like User-Agent. Many sites 403 the default library UA; result
/// pages are fetched with the same string a desktop browser would send.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Hard cap on bytes read from any result page body.
const MAX_BODY_BYTES: usize = 5_000_000;

/// Shared outbound HTTP client with safety defaults: avoid "hang forever"
/// on DNS/TLS/body stalls. Per-request timeouts can still tighten this.
pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| Error::Fetch(e.to_string()))
}

/// reqwest-backed page fetcher.
///
/// Classifies the response instead of failing: HTTP 403 becomes
/// `Forbidden` (the pipeline drops and backfills those), any other
/// non-2xx status or transport error becomes `Error(reason)`.
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    client: reqwest::Client,
}

impl LocalFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl PageFetcher for LocalFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchOutcome {
        let parsed = match url::Url::parse(url) {
            Ok(u) => u,
            Err(e) => return FetchOutcome::Error(format!("invalid url: {e}")),
        };

        let resp = match self.client.get(parsed).timeout(timeout).send().await {
            Ok(r) => r,
            Err(e) => return FetchOutcome::Error(e.to_string()),
        };

        let status = resp.status();
        if status.as_u16() == 403 {
            return FetchOutcome::Forbidden;
        }
        if !status.is_success() {
            return FetchOutcome::Error(format!("HTTP {status}"));
        }

        // Bounded body read: never buffer more than MAX_BODY_BYTES.
        let mut bytes: Vec<u8> = Vec::new();
        let mut stream = resp.bytes_stream();
        use futures_util::StreamExt;
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => return FetchOutcome::Error(e.to_string()),
            };
            if bytes.len().saturating_add(chunk.len()) > MAX_BODY_BYTES {
                let can_take = MAX_BODY_BYTES.saturating_sub(bytes.len());
                bytes.extend_from_slice(&chunk[..can_take]);
                break;
            }
            bytes.extend_from_slice(&chunk);
        }

        FetchOutcome::Success(String::from_utf8_lossy(&bytes).to_string())
    }
}
