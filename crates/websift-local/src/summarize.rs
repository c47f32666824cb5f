//! OpenAI-compatible summarization client.
//!
//! Configuration is merged from the environment once at startup into an
//! explicit [`SummarizerConfig`]; there is no hidden global state. A
//! missing access token is a precondition failure surfaced at
//! construction / check time, never a runtime fault inside the pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use websift_core::{Error, Result, Summarizer, SummaryOutcome};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u64 = 256;
pub const DEFAULT_MAX_INPUT_CHARS: usize = 15_000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Content shorter than this is not worth a summarization round trip.
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 500;

const SYSTEM_PROMPT: &str =
    "You summarize web pages. Reply with a short plain-text summary (3-5 sentences) of the page content you are given.";

fn env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_output_tokens: u64,
    pub max_input_chars: usize,
    pub timeout: Duration,
    pub min_content_chars: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            timeout: DEFAULT_TIMEOUT,
            min_content_chars: DEFAULT_MIN_CONTENT_CHARS,
        }
    }
}

impl SummarizerConfig {
    /// Defaults overridden by `WEBSIFT_LLM_BASE_URL`, `WEBSIFT_LLM_API_KEY`
    /// and `WEBSIFT_LLM_MODEL`.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(base_url) = env("WEBSIFT_LLM_BASE_URL") {
            cfg.base_url = base_url;
        }
        cfg.api_key = env("WEBSIFT_LLM_API_KEY");
        if let Some(model) = env("WEBSIFT_LLM_MODEL") {
            cfg.model = model;
        }
        cfg
    }
}

/// Hard cutoff after `max` characters; no semantic boundary preservation.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    config: SummarizerConfig,
    api_key: String,
}

impl OpenAiSummarizer {
    pub fn new(client: reqwest::Client, config: SummarizerConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            Error::NotConfigured("missing WEBSIFT_LLM_API_KEY".to_string())
        })?;
        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn from_env(client: reqwest::Client) -> Result<Self> {
        Self::new(client, SummarizerConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint_chat_completions(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn chat(&self, user: &str, max_tokens: u64) -> Result<String> {
        let req = ChatCompletionsRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: Some(max_tokens),
            stream: Some(false),
        };

        let resp = self
            .client
            .post(self.endpoint_chat_completions())
            .timeout(self.config.timeout)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::Llm(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Llm(format!("chat.completions HTTP {status}")));
        }

        let parsed: ChatCompletionsResponse =
            resp.json().await.map_err(|e| Error::Llm(e.to_string()))?;
        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();
        if content.is_empty() {
            return Err(Error::Llm("empty completion".to_string()));
        }
        Ok(content)
    }

    /// Lightweight connectivity/auth probe for the `check-llm` CLI mode.
    pub async fn check(&self) -> Result<()> {
        self.chat("Reply with the single word: ok", 8).await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, text: &str) -> SummaryOutcome {
        let truncated = truncate_chars(text, self.config.max_input_chars);
        match self.chat(truncated, self.config.max_output_tokens).await {
            Ok(summary) => SummaryOutcome::Summary(summary),
            Err(e) => SummaryOutcome::Failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use std::net::SocketAddr;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct EnvGuard {
        k: &'static str,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn set(k: &'static str, v: &str) -> Self {
            let prev = std::env::var(k).ok();
            std::env::set_var(k, v);
            Self { k, prev }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(v) = self.prev.take() {
                std::env::set_var(self.k, v);
            } else {
                std::env::remove_var(self.k);
            }
        }
    }

    fn config_for(base_url: String) -> SummarizerConfig {
        SummarizerConfig {
            base_url,
            api_key: Some("test-key".to_string()),
            timeout: Duration::from_secs(2),
            ..SummarizerConfig::default()
        }
    }

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[test]
    fn truncation_is_exact_in_characters() {
        let text = "a".repeat(DEFAULT_MAX_INPUT_CHARS + 100);
        let out = truncate_chars(&text, DEFAULT_MAX_INPUT_CHARS);
        assert_eq!(out.chars().count(), DEFAULT_MAX_INPUT_CHARS);

        // Multi-byte characters must not be split.
        let text = "é".repeat(10);
        let out = truncate_chars(&text, 4);
        assert_eq!(out, "éééé");

        // Short input passes through untouched.
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[test]
    fn missing_api_key_is_a_precondition_failure() {
        let cfg = SummarizerConfig::default();
        let err = OpenAiSummarizer::new(reqwest::Client::new(), cfg).unwrap_err();
        assert!(matches!(err, Error::NotConfigured(_)));
    }

    #[test]
    fn config_from_env_merges_overrides_once() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let _g1 = EnvGuard::set("WEBSIFT_LLM_BASE_URL", "http://127.0.0.1:9/v1");
        let _g2 = EnvGuard::set("WEBSIFT_LLM_API_KEY", "sk-test");
        let _g3 = EnvGuard::set("WEBSIFT_LLM_MODEL", "test-model");
        let cfg = SummarizerConfig::from_env();
        assert_eq!(cfg.base_url, "http://127.0.0.1:9/v1");
        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.model, "test-model");
        // Code-level budgets stay at their defaults.
        assert_eq!(cfg.max_input_chars, DEFAULT_MAX_INPUT_CHARS);
        assert_eq!(cfg.min_content_chars, DEFAULT_MIN_CONTENT_CHARS);
    }

    #[test]
    fn parses_chat_completions_shape() {
        let js = r#"
        {
          "id": "cmpl-1",
          "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "A summary."}, "finish_reason": "stop"}
          ]
        }
        "#;
        let parsed: ChatCompletionsResponse = serde_json::from_str(js).unwrap();
        assert_eq!(parsed.choices[0].message.content, "A summary.");
    }

    #[tokio::test]
    async fn summarize_returns_summary_from_a_compatible_endpoint() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["model"], DEFAULT_MODEL);
                assert_eq!(body["messages"][0]["role"], "system");
                Json(serde_json::json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "Short summary."}}
                    ]
                }))
            }),
        );
        let addr = serve(app).await;

        let s = OpenAiSummarizer::new(
            reqwest::Client::new(),
            config_for(format!("http://{addr}/v1")),
        )
        .unwrap();
        let out = s.summarize("some long page content").await;
        assert_eq!(out, SummaryOutcome::Summary("Short summary.".to_string()));
        s.check().await.unwrap();
    }

    #[tokio::test]
    async fn http_error_and_malformed_response_become_failed_outcomes() {
        let app = Router::new()
            .route(
                "/bad/chat/completions",
                post(|| async { (axum::http::StatusCode::UNAUTHORIZED, "nope") }),
            )
            .route(
                "/weird/chat/completions",
                post(|| async { Json(serde_json::json!({"choices": []})) }),
            );
        let addr = serve(app).await;

        let unauthorized = OpenAiSummarizer::new(
            reqwest::Client::new(),
            config_for(format!("http://{addr}/bad")),
        )
        .unwrap();
        match unauthorized.summarize("text").await {
            SummaryOutcome::Failed(reason) => assert!(reason.contains("401"), "reason={reason}"),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(unauthorized.check().await.is_err());

        let empty_choices = OpenAiSummarizer::new(
            reqwest::Client::new(),
            config_for(format!("http://{addr}/weird")),
        )
        .unwrap();
        assert!(matches!(
            empty_choices.summarize("text").await,
            SummaryOutcome::Failed(_)
        ));
    }
}
