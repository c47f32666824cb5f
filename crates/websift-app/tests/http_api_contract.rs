//! Offline contract for the web surface: UI page, JSON API, error paths.

use axum::{extract::Path, extract::Query, http::header, http::StatusCode, routing::get, Router};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use websift::api::{create_router, AppState};
use websift_local::pipeline::{Pipeline, PipelineConfig};
use websift_local::search::SearxngProvider;
use websift_local::LocalFetcher;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Search backend + result pages in one fixture server.
async fn fixture_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base = format!("http://{addr}");

    let search_base = base.clone();
    let app = Router::new()
        .route(
            "/search",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let search_base = search_base.clone();
                async move {
                    let q = params.get("q").cloned().unwrap_or_default();
                    axum::Json(serde_json::json!({
                        "results": [
                            {"url": format!("{search_base}/page/1"), "title": "Page One", "content": format!("about {q}")},
                            {"url": format!("{search_base}/page/2"), "title": "Page Two", "content": "second snippet"}
                        ]
                    }))
                }
            }),
        )
        .route(
            "/page/{id}",
            get(|Path(id): Path<String>| async move {
                (
                    [(header::CONTENT_TYPE, "text/html")],
                    format!("<html><body><h1>Heading {id}</h1><p>Body {id}.</p></body></html>"),
                )
            }),
        );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

fn pipeline_for(endpoint: &str) -> Arc<Pipeline> {
    let client = websift_local::http_client().unwrap();
    Arc::new(Pipeline::new(
        Arc::new(SearxngProvider::new(client.clone(), endpoint)),
        Arc::new(LocalFetcher::new(client)),
        None,
        PipelineConfig::default(),
    ))
}

#[tokio::test]
async fn api_search_round_trips_through_fixture_backend() {
    let backend = fixture_backend().await;
    let addr = serve(create_router(AppState {
        pipeline: pipeline_for(&backend),
    }))
    .await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/search"))
        .json(&serde_json::json!({"query": "rust async", "n": 2}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let v: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(v["query"], "rust async");
    assert_eq!(v["total_results"], 2);
    let results = v["results"].as_array().unwrap();
    assert!(results[0]["content"].as_str().unwrap().contains("# Heading 1"));
    assert!(results[0].get("summary").is_none());
    assert!(v["markdown"].as_str().unwrap().contains("## Page One"));
    assert!(v.get("notice").is_none());
    assert!(v["processing_time_ms"].is_number());
}

#[tokio::test]
async fn api_search_rejects_empty_query_with_400() {
    let backend = fixture_backend().await;
    let addr = serve(create_router(AppState {
        pipeline: pipeline_for(&backend),
    }))
    .await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/search"))
        .json(&serde_json::json!({"query": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn backend_failure_maps_to_bad_gateway() {
    // Nothing listens on this endpoint.
    let dead = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    };
    let addr = serve(create_router(AppState {
        pipeline: pipeline_for(&dead),
    }))
    .await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/search"))
        .json(&serde_json::json!({"query": "anything"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    // The core error taxonomy prefixes the reason.
    assert!(resp.text().await.unwrap().contains("search failed"));
}

#[tokio::test]
async fn ui_page_is_served_at_root() {
    let backend = fixture_backend().await;
    let addr = serve(create_router(AppState {
        pipeline: pipeline_for(&backend),
    }))
    .await;

    let resp = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains("websift"));
    assert!(body.contains("/api/search"));
}
