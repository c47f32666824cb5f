use serde::{Deserialize, Serialize};
use websift_core::EnrichedResult;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub n: Option<usize>,
    #[serde(default)]
    pub summarize: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<EnrichedResult>,
    /// The same results rendered as one markdown document for display.
    pub markdown: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub total_results: usize,
    pub processing_time_ms: u128,
}
