//! MCP tool surface: one `search` tool over stdio or streamable HTTP.
//!
//! Outputs are JSON and schema-versioned; user-facing failures (empty
//! query, backend down) are `ok=false` payloads with a structured error
//! object, not protocol faults.

use rmcp::{
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use websift_local::pipeline::Pipeline;

mod envelope;
use envelope::{add_envelope_fields, error_obj, ErrorCode};

const SCHEMA_VERSION: u64 = 1;

fn tool_result(payload: serde_json::Value) -> CallToolResult {
    // Structured content for machine consumers, plus a text fallback for
    // clients that only read `content[0].text`.
    let mut r = CallToolResult::structured(payload.clone());
    r.content = vec![Content::text(payload.to_string())];
    r
}

#[derive(Debug, Deserialize, JsonSchema, Default)]
pub struct SearchToolArgs {
    /// Search query (required).
    #[serde(default)]
    query: Option<String>,
    /// Number of results to return (default: 5; max: 10).
    #[serde(default)]
    n: Option<usize>,
    /// If true, attach an LLM summary to each result (requires
    /// WEBSIFT_LLM_API_KEY; silently falls back to full content otherwise).
    #[serde(default)]
    summarize: Option<bool>,
}

#[derive(Clone)]
pub struct WebsiftMcp {
    tool_router: ToolRouter<Self>,
    pipeline: Arc<Pipeline>,
}

#[tool_router]
impl WebsiftMcp {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            pipeline,
        }
    }

    #[tool(
        description = "Search the web and return the top results with each page's content converted to markdown (optionally LLM-summarized)"
    )]
    async fn search(
        &self,
        params: Parameters<Option<SearchToolArgs>>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0.unwrap_or_default();
        let t0 = std::time::Instant::now();
        let query = args.query.unwrap_or_default();
        let n = args.n.unwrap_or(5).clamp(1, 10);
        let summarize = args.summarize.unwrap_or(false);

        if query.trim().is_empty() {
            let mut payload = serde_json::json!({
                "ok": false,
                "query": query,
                "n": n,
                "error": error_obj(
                    ErrorCode::InvalidParams,
                    "query must be non-empty",
                    "Pass a non-empty search query."
                )
            });
            add_envelope_fields(&mut payload, "search", t0.elapsed().as_millis());
            return Ok(tool_result(payload));
        }

        match self.pipeline.run(&query, n, summarize).await {
            Ok(run) => {
                let markdown = crate::render::render_markdown(&run.results);
                let mut payload = serde_json::json!({
                    "ok": true,
                    "query": query,
                    "n": n,
                    "provider": self.pipeline.provider_name(),
                    "results": run.results,
                    "notice": run.notice,
                    "markdown": markdown,
                });
                add_envelope_fields(&mut payload, "search", t0.elapsed().as_millis());
                Ok(tool_result(payload))
            }
            Err(e) => {
                let mut payload = serde_json::json!({
                    "ok": false,
                    "query": query,
                    "n": n,
                    "provider": self.pipeline.provider_name(),
                    "error": error_obj(
                        ErrorCode::SearchFailed,
                        e.to_string(),
                        "The search backend is unreachable or returned malformed data. Retry later or switch WEBSIFT_SEARCH_PROVIDER."
                    )
                });
                add_envelope_fields(&mut payload, "search", t0.elapsed().as_millis());
                Ok(tool_result(payload))
            }
        }
    }
}

#[tool_handler]
impl rmcp::ServerHandler for WebsiftMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Web search aggregation: the search tool returns ranked results with page content as markdown. Outputs are JSON and schema-versioned."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// MCP over stdio, for assistant hosts that spawn a child process.
pub async fn serve_stdio(pipeline: Arc<Pipeline>) -> Result<(), McpError> {
    let svc = WebsiftMcp::new(pipeline);
    let running = svc
        .serve(stdio())
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    // Keep the stdio server alive until the client closes.
    running
        .waiting()
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(())
}

/// MCP over streamable HTTP, mounted at `/mcp` in the serve-mode router.
pub fn http_router(pipeline: Arc<Pipeline>) -> axum::Router {
    use rmcp::transport::streamable_http_server::{
        session::local::LocalSessionManager, tower::StreamableHttpService,
    };
    use rmcp::transport::StreamableHttpServerConfig;

    let service = StreamableHttpService::new(
        move || Ok(WebsiftMcp::new(pipeline.clone())),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );
    axum::Router::new().nest_service("/mcp", service)
}
