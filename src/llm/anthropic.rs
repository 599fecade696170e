//! Anthropic API client implementation
//!
//! This module implements the LlmClient trait for the Anthropic Messages API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{AgentError, Result};
use crate::llm::client::LlmClient;
use crate::llm::tool_parser::parse_stop_reason;
use crate::llm::types::{CompletionRequest, CompletionResponse, ToolCall, Usage};

/// Anthropic API base URL
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default model to use
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default max tokens
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Configuration for the Anthropic client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub base_url: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.0,
            timeout: Duration::from_secs(300),
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    config: AnthropicConfig,
    usage: Arc<Mutex<Usage>>,
}

impl AnthropicClient {
    /// Create a client with an explicit API key
    pub fn new(api_key: impl Into<String>, config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
            usage: Arc::new(Mutex::new(Usage::default())),
        })
    }

    /// Build the request body for the Anthropic API
    fn build_request(&self, request: &CompletionRequest) -> Result<Value> {
        // Messages already use the Anthropic wire shape
        let messages = serde_json::to_value(&request.messages)?;

        let mut body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": messages
        });

        if !request.system.is_empty() {
            body["system"] = json!(request.system);
        }

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request.tools.iter().map(|t| t.to_anthropic_schema()).collect();
            body["tools"] = json!(tools);
        }

        Ok(body)
    }

    /// Parse the API response into a CompletionResponse
    fn parse_response(&self, body: Value) -> Result<CompletionResponse> {
        let stop_reason = parse_stop_reason(body["stop_reason"].as_str().unwrap_or("end_turn"));

        let usage = if let Some(u) = body.get("usage") {
            Usage::new(
                u["input_tokens"].as_u64().unwrap_or(0),
                u["output_tokens"].as_u64().unwrap_or(0),
            )
        } else {
            Usage::default()
        };

        if let Ok(mut total) = self.usage.lock() {
            total.add(&usage);
        }

        let blocks = body["content"]
            .as_array()
            .ok_or_else(|| AgentError::Llm("Response has no content array".to_string()))?;

        let mut segments = Vec::new();
        let mut tool_calls = Vec::new();

        for block in blocks {
            match block["type"].as_str() {
                Some("text") => {
                    if let Some(text) = block["text"].as_str() {
                        segments.push(text.to_string());
                    }
                }
                Some("tool_use") => {
                    let id = block["id"].as_str().unwrap_or("").to_string();
                    let name = block["name"].as_str().unwrap_or("").to_string();
                    let input = block.get("input").cloned().unwrap_or_else(|| json!({}));
                    tool_calls.push(ToolCall::new(id, name, input));
                }
                other => debug!("Skipping content block of type {:?}", other),
            }
        }

        Ok(CompletionResponse {
            content: segments.join("\n"),
            segments: Some(segments),
            tool_calls,
            stop_reason,
            usage,
        })
    }

    /// Send a request to the Anthropic API
    async fn send_request(&self, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.config.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Llm(format!("Request failed: {}", e)))?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            warn!("Anthropic rate limit hit, retry after {}s", retry_after);
            return Err(AgentError::Llm(format!(
                "Rate limited, retry after {} seconds",
                retry_after
            )));
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AgentError::Llm(format!("API error {}: {}", status, error_body)));
        }

        response
            .json()
            .await
            .map_err(|e| AgentError::Llm(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_request(&request)?;
        let response = self.send_request(body).await?;
        self.parse_response(response)
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn is_ready(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn total_usage(&self) -> Usage {
        self.usage.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("model", &self.config.model)
            .field("max_tokens", &self.config.max_tokens)
            .finish()
    }
}
