use axum::{extract::State, http::StatusCode, Json};
use std::time::Instant;

use super::models::{SearchRequest, SearchResponse};
use super::AppState;
use crate::render::render_markdown;

pub async fn search_handler(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = Instant::now();

    if request.query.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "query cannot be empty".to_string()));
    }
    let n = request.n.unwrap_or(5).clamp(1, 10);
    let summarize = request.summarize.unwrap_or(false);

    let run = state
        .pipeline
        .run(&request.query, n, summarize)
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;

    let markdown = render_markdown(&run.results);
    let total_results = run.results.len();
    Ok(Json(SearchResponse {
        query: request.query,
        results: run.results,
        markdown,
        notice: run.notice,
        total_results,
        processing_time_ms: start.elapsed().as_millis(),
    }))
}
