use axum::response::Html;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use websift_local::pipeline::Pipeline;

pub mod handlers;
pub mod models;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

const INDEX_HTML: &str = include_str!("../../static/index.html");

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Web UI + JSON API + MCP-over-HTTP, one router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/api/search", post(handlers::search_handler))
        .with_state(state.clone())
        .merge(crate::mcp::http_router(state.pipeline))
        .layer(cors)
}
