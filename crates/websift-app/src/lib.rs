//! `websift` application surface: web UI + JSON API, MCP tool endpoint and
//! the pipeline wiring shared between them.
//!
//! The primary entrypoint for end users is the `websift` binary. This
//! library exists so the integration tests can drive the router and tool
//! server in-process.

use std::sync::Arc;
use websift_core::Summarizer;
use websift_local::pipeline::{Pipeline, PipelineConfig};
use websift_local::summarize::{OpenAiSummarizer, SummarizerConfig};
use websift_local::LocalFetcher;

pub mod api;
pub mod mcp;
pub mod render;

/// Wire up the pipeline from the environment.
///
/// The summarizer is optional: without an API key the pipeline still runs
/// and reports summarization as a disabled feature.
pub fn build_pipeline() -> anyhow::Result<Arc<Pipeline>> {
    let client = websift_local::http_client()?;
    let provider = websift_local::search::provider_from_env(client.clone())?;
    let summarizer = match OpenAiSummarizer::new(client.clone(), SummarizerConfig::from_env()) {
        Ok(s) => Some(Arc::new(s) as Arc<dyn Summarizer>),
        Err(e) => {
            tracing::debug!(%e, "summarizer not configured");
            None
        }
    };
    let fetcher = Arc::new(LocalFetcher::new(client));
    Ok(Arc::new(Pipeline::new(
        provider,
        fetcher,
        summarizer,
        PipelineConfig::default(),
    )))
}
