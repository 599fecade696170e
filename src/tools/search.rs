//! web_search tool - Tavily search API

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Tool, string_input};
use crate::config::SearchConfig;
use crate::error::{AgentError, Result};

const TAVILY_API_URL: &str = "https://api.tavily.com/search";

/// Tavily rejects larger result counts
const MAX_RESULTS_LIMIT: u32 = 20;

/// Snippet length shown to the model per result
const SNIPPET_CHARS: usize = 300;

/// One hit returned by the search API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

/// Search the web through Tavily
pub struct WebSearchTool {
    client: Client,
    api_key: String,
    max_results: u32,
    search_depth: String,
}

impl WebSearchTool {
    pub fn new(api_key: impl Into<String>, config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AgentError::Tool(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            max_results: config.max_results,
            search_depth: config.search_depth.clone(),
        })
    }

    /// Per-call `max_results`, capped at what Tavily serves
    fn requested_max_results(&self, input: &Value) -> u32 {
        input
            .get("max_results")
            .and_then(|v| v.as_u64())
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX).min(MAX_RESULTS_LIMIT))
            .unwrap_or(self.max_results)
    }

    fn build_body(&self, query: &str, max_results: u32) -> Value {
        json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": max_results,
            "search_depth": self.search_depth
        })
    }

    fn parse_results(body: &Value) -> Result<Vec<SearchResult>> {
        match body.get("results") {
            Some(results) => Ok(serde_json::from_value(results.clone())?),
            None => Ok(Vec::new()),
        }
    }

    fn format_results(results: &[SearchResult]) -> String {
        if results.is_empty() {
            return "No results found".to_string();
        }

        results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let title = if r.title.is_empty() { "(no title)" } else { r.title.as_str() };
                format!("{}. {}\n   {}\n   {}\n", i + 1, title, r.url, truncate(&r.content, SNIPPET_CHARS))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information. Input is a search query; returns titles, urls and snippets."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum results to return"
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, input: Value) -> Result<Value> {
        let query = string_input(&input, "query")?;
        let max_results = self.requested_max_results(&input);

        debug!("web_search query={:?} max_results={}", query, max_results);

        let response = self
            .client
            .post(TAVILY_API_URL)
            .json(&self.build_body(&query, max_results))
            .send()
            .await
            .map_err(|e| AgentError::Tool(format!("Search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Tavily returned {}", status);
            return Err(AgentError::Tool(format!("Tavily API error {}: {}", status, error_text)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AgentError::Tool(format!("Failed to parse search response: {}", e)))?;

        let results = Self::parse_results(&body)?;
        Ok(Value::String(Self::format_results(&results)))
    }
}

/// Truncate string to max chars
fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> WebSearchTool {
        WebSearchTool::new("tvly-test", &SearchConfig::default()).unwrap()
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is a ...");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    #[test]
    fn test_build_body() {
        let body = tool().build_body("rust async", 3);
        assert_eq!(body["api_key"], "tvly-test");
        assert_eq!(body["query"], "rust async");
        assert_eq!(body["max_results"], 3);
        assert_eq!(body["search_depth"], "basic");
    }

    #[test]
    fn test_requested_max_results_is_capped() {
        let tool = tool();
        assert_eq!(tool.requested_max_results(&json!({"query": "q"})), 5);
        assert_eq!(tool.requested_max_results(&json!({"query": "q", "max_results": 3})), 3);
        assert_eq!(tool.requested_max_results(&json!({"query": "q", "max_results": 4294967297u64})), MAX_RESULTS_LIMIT);
        assert_eq!(tool.requested_max_results(&json!({"query": "q", "max_results": u64::MAX})), MAX_RESULTS_LIMIT);
        assert_eq!(tool.requested_max_results(&json!({"query": "q", "max_results": -1})), 5);
    }

    #[test]
    fn test_parse_and_format_results() {
        let body = json!({
            "query": "q",
            "results": [
                {"title": "Rust", "url": "https://www.rust-lang.org", "content": "A language", "score": 0.9},
                {"url": "https://example.com", "content": "No title here"}
            ]
        });

        let results = WebSearchTool::parse_results(&body).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust");
        assert_eq!(results[1].title, "");

        let text = WebSearchTool::format_results(&results);
        assert!(text.starts_with("1. Rust\n   https://www.rust-lang.org"));
        assert!(text.contains("2. (no title)"));
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(WebSearchTool::format_results(&[]), "No results found");
        assert!(WebSearchTool::parse_results(&json!({})).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_query_is_invalid_input() {
        let result = tool().invoke(json!({"max_results": 2})).await;
        assert!(matches!(result, Err(AgentError::InvalidInput(_))));
    }
}
