//! Search providers.
//!
//! `DuckDuckGoProvider` is the key-free default and scrapes the HTML
//! results endpoint. `SearxngProvider` talks JSON to a self-hosted
//! instance and is what the offline contract tests point at.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use websift_core::{Error, Result, SearchHit, SearchProvider};

/// Providers can hang indefinitely without an explicit timeout.
const SEARCH_TIMEOUT: Duration = Duration::from_secs(20);

fn env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn ddg_endpoint_from_env() -> Option<String> {
    env("WEBSIFT_DDG_ENDPOINT")
}

fn searxng_endpoint_from_env() -> Option<String> {
    env("WEBSIFT_SEARXNG_ENDPOINT")
}

/// Pick a provider from `WEBSIFT_SEARCH_PROVIDER` (default: duckduckgo).
pub fn provider_from_env(client: reqwest::Client) -> Result<Arc<dyn SearchProvider>> {
    let name = env("WEBSIFT_SEARCH_PROVIDER")
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_else(|| "duckduckgo".to_string());
    match name.as_str() {
        "duckduckgo" | "ddg" => Ok(Arc::new(DuckDuckGoProvider::new(client))),
        "searxng" => Ok(Arc::new(SearxngProvider::from_env(client)?)),
        other => Err(Error::NotConfigured(format!(
            "unknown search provider: {other} (allowed: duckduckgo, searxng)"
        ))),
    }
}

#[derive(Debug, Clone)]
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
}

impl DuckDuckGoProvider {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn endpoint() -> String {
        ddg_endpoint_from_env().unwrap_or_else(|| "https://html.duckduckgo.com/html/".to_string())
    }
}

#[async_trait::async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchHit>> {
        let resp = self
            .client
            .get(Self::endpoint())
            .query(&[("q", query)])
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::Search(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Search(format!("duckduckgo search HTTP {status}")));
        }
        let body = resp.text().await.map_err(|e| Error::Search(e.to_string()))?;
        Ok(parse_ddg_html(&body, count.min(30)))
    }
}

/// Parse the DuckDuckGo HTML results page into ranked hits.
///
/// Result links carry the target URL in a `uddg` redirect parameter;
/// ad results are dropped.
fn parse_ddg_html(html: &str, count: usize) -> Vec<SearchHit> {
    let doc = scraper::Html::parse_document(html);
    let selectors = (
        scraper::Selector::parse("div.result").ok(),
        scraper::Selector::parse("a.result__a").ok(),
        scraper::Selector::parse(".result__snippet").ok(),
    );
    let (Some(result_sel), Some(title_sel), Some(snippet_sel)) = selectors else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for result in doc.select(&result_sel) {
        if out.len() >= count {
            break;
        }
        if result
            .value()
            .attr("class")
            .is_some_and(|c| c.contains("result--ad"))
        {
            continue;
        }
        let Some(anchor) = result.select(&title_sel).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_ddg_href(href) else {
            continue;
        };
        let title = normalize_ws(&anchor.text().collect::<String>());
        if title.is_empty() {
            continue;
        }
        let snippet = result
            .select(&snippet_sel)
            .next()
            .map(|s| normalize_ws(&s.text().collect::<String>()))
            .unwrap_or_default();
        out.push(SearchHit { title, url, snippet });
    }
    out
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn resolve_ddg_href(href: &str) -> Option<String> {
    let absolute = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };
    let parsed = url::Url::parse(&absolute).ok()?;
    // Redirect links embed the real target in `uddg`.
    let redirect_target = parsed
        .query_pairs()
        .find_map(|(k, v)| (k == "uddg").then(|| v.into_owned()));
    if let Some(target) = redirect_target {
        let t = url::Url::parse(&target).ok()?;
        return matches!(t.scheme(), "http" | "https").then_some(target);
    }
    matches!(parsed.scheme(), "http" | "https").then(|| parsed.to_string())
}

#[derive(Debug, Clone)]
pub struct SearxngProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl SearxngProvider {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_env(client: reqwest::Client) -> Result<Self> {
        let endpoint = searxng_endpoint_from_env().ok_or_else(|| {
            Error::NotConfigured("missing WEBSIFT_SEARXNG_ENDPOINT".to_string())
        })?;
        Ok(Self::new(client, endpoint))
    }

    fn endpoint_search(&self) -> String {
        // Accept either a base URL or a full /search endpoint.
        let mut base = self.endpoint.trim().trim_end_matches('/').to_string();
        if !base.ends_with("/search") {
            base.push_str("/search");
        }
        base
    }
}

#[derive(Debug, Deserialize)]
struct SearxngSearchResponse {
    results: Option<Vec<SearxngResult>>,
}

#[derive(Debug, Deserialize)]
struct SearxngResult {
    url: Option<String>,
    title: Option<String>,
    // SearXNG uses `content` for snippets in JSON format.
    content: Option<String>,
}

#[async_trait::async_trait]
impl SearchProvider for SearxngProvider {
    fn name(&self) -> &'static str {
        "searxng"
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchHit>> {
        let resp = self
            .client
            .get(self.endpoint_search())
            .query(&[("q", query), ("format", "json")])
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::Search(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Search(format!("searxng search HTTP {status}")));
        }
        let parsed: SearxngSearchResponse =
            resp.json().await.map_err(|e| Error::Search(e.to_string()))?;

        let mut out = Vec::new();
        if let Some(rs) = parsed.results {
            for r in rs.into_iter().take(count) {
                let Some(url) = r.url else { continue };
                out.push(SearchHit {
                    title: r.title.unwrap_or_default(),
                    url,
                    snippet: r.content.unwrap_or_default(),
                });
            }
        }
        Ok(out)
    }
}
