//! The result pipeline: search -> fetch -> normalize -> optional summary.
//!
//! Forbidden pages (HTTP 403) are dropped silently and backfilled from the
//! next-ranked candidate. Any other fetch failure keeps the candidate as a
//! degraded result with the reason attached. Only a search-backend failure
//! aborts the whole request.

use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use websift_core::{
    EnrichedResult, FetchOutcome, PageFetcher, PipelineRun, Result, SearchProvider, Summarizer,
    SummaryOutcome,
};

use crate::normalize::normalize;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The provider is asked for `n * overfetch_factor` candidates so that
    /// forbidden pages can be backfilled without a second search call.
    pub overfetch_factor: usize,
    /// Per-page fetch timeout; one slow page must not stall the others.
    pub fetch_timeout: Duration,
    /// Pages fetched concurrently. Result order is candidate rank order
    /// regardless of completion order.
    pub fetch_concurrency: usize,
    /// Content shorter than this keeps its full markdown instead of being
    /// sent for summarization.
    pub min_summary_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            overfetch_factor: 2,
            fetch_timeout: Duration::from_secs(10),
            fetch_concurrency: 4,
            min_summary_chars: crate::summarize::DEFAULT_MIN_CONTENT_CHARS,
        }
    }
}

pub struct Pipeline {
    provider: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    summarizer: Option<Arc<dyn Summarizer>>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        summarizer: Option<Arc<dyn Summarizer>>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            provider,
            fetcher,
            summarizer,
            config,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn summarizer_configured(&self) -> bool {
        self.summarizer.is_some()
    }

    /// Run the whole pipeline for one query.
    ///
    /// Returns at most `n` results in the backend's relevance order. Fewer
    /// than `n` means the candidate supply was exhausted.
    pub async fn run(&self, query: &str, n: usize, summarize: bool) -> Result<PipelineRun> {
        let n = n.max(1);
        let want = n.saturating_mul(self.config.overfetch_factor.max(1));
        let hits = self.provider.search(query, want).await?;
        tracing::info!(
            provider = self.provider.name(),
            candidates = hits.len(),
            n,
            "search complete"
        );

        let mut results: Vec<EnrichedResult> = Vec::with_capacity(n);
        'candidates: for batch in hits.chunks(self.config.fetch_concurrency.max(1)) {
            let outcomes = join_all(batch.iter().map(|hit| {
                let fetcher = Arc::clone(&self.fetcher);
                let url = hit.url.clone();
                let timeout = self.config.fetch_timeout;
                async move { fetcher.fetch(&url, timeout).await }
            }))
            .await;

            for (hit, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    FetchOutcome::Forbidden => {
                        tracing::debug!(url = %hit.url, "forbidden, backfilling");
                    }
                    FetchOutcome::Error(reason) => {
                        tracing::warn!(url = %hit.url, %reason, "fetch failed, keeping degraded result");
                        results.push(EnrichedResult::degraded(hit, reason));
                    }
                    FetchOutcome::Success(body) => {
                        results.push(EnrichedResult::from_hit(hit, normalize(&body)));
                    }
                }
                if results.len() >= n {
                    break 'candidates;
                }
            }
        }

        let mut notice = None;
        if summarize {
            match &self.summarizer {
                None => {
                    notice = Some(
                        "summarization is disabled: set WEBSIFT_LLM_API_KEY to enable it"
                            .to_string(),
                    );
                }
                Some(summarizer) => {
                    self.summarize_results(summarizer, &mut results).await;
                }
            }
        }

        Ok(PipelineRun { results, notice })
    }

    /// Attach summaries in place. A failed summarization leaves the full
    /// content untouched and never affects the other results.
    async fn summarize_results(
        &self,
        summarizer: &Arc<dyn Summarizer>,
        results: &mut [EnrichedResult],
    ) {
        let jobs: Vec<_> = results
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                r.fetch_error.is_none()
                    && r.content.chars().count() >= self.config.min_summary_chars
            })
            .map(|(i, r)| {
                let summarizer = Arc::clone(summarizer);
                let text = r.content.clone();
                async move { (i, summarizer.summarize(&text).await) }
            })
            .collect();

        for (i, outcome) in join_all(jobs).await {
            match outcome {
                SummaryOutcome::Summary(text) => results[i].summary = Some(text),
                SummaryOutcome::Failed(reason) => {
                    tracing::warn!(url = %results[i].url, %reason, "summarization failed, keeping full content");
                }
            }
        }
    }
}
