use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("search failed: {0}")]
    Search(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("llm failed: {0}")]
    Llm(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// One ranked candidate from a search backend.
///
/// Ordering is the backend's relevance order; the pipeline preserves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// A candidate after enrichment: fetched, normalized to markdown, and
/// optionally summarized.
///
/// `fetch_error` is set (with `content` empty) when the page fetch failed
/// for a reason other than HTTP 403; forbidden pages never appear at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

impl EnrichedResult {
    pub fn from_hit(hit: &SearchHit, content: String) -> Self {
        Self {
            title: hit.title.clone(),
            url: hit.url.clone(),
            snippet: hit.snippet.clone(),
            content,
            summary: None,
            fetch_error: None,
        }
    }

    pub fn degraded(hit: &SearchHit, reason: String) -> Self {
        Self {
            title: hit.title.clone(),
            url: hit.url.clone(),
            snippet: hit.snippet.clone(),
            content: String::new(),
            summary: None,
            fetch_error: Some(reason),
        }
    }
}

/// Outcome of fetching one result page.
///
/// 403 is kept distinct from other failures because the pipeline's backfill
/// policy treats it specially: forbidden pages are dropped and replaced,
/// while other failures surface as degraded results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(String),
    Forbidden,
    Error(String),
}

/// Outcome of one summarization call. `Failed` is never fatal: the caller
/// falls back to the unsummarized content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Summary(String),
    Failed(String),
}

/// What one pipeline invocation produced.
///
/// `notice` carries user-visible degradations (e.g. summarization requested
/// but not configured) that should be rendered alongside the results rather
/// than raised as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub results: Vec<EnrichedResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;
    /// One call maps to one upstream request; no internal retries.
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchHit>>;
}

#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Errors are folded into the outcome; this never fails the request.
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchOutcome;
}

#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> SummaryOutcome;
}
