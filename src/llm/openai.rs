//! OpenAI Chat Completions client
//!
//! Implements LlmClient against `/v1/chat/completions` with function tools.
//! Conversation blocks are translated to the OpenAI message layout: tool_use
//! blocks become `tool_calls` on the assistant message and every tool_result
//! becomes its own `tool` role message.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{AgentError, Result};
use crate::llm::client::LlmClient;
use crate::llm::tool_parser::{parse_finish_reason, parse_tool_arguments};
use crate::llm::types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, MessageContent, Role, ToolCall, Usage,
};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Configuration for the OpenAI client
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.0,
            timeout: Duration::from_secs(300),
            base_url: OPENAI_API_URL.to_string(),
        }
    }
}

/// OpenAI API client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    config: OpenAiConfig,
    usage: Arc<Mutex<Usage>>,
}

impl OpenAiClient {
    /// Create a client with an explicit API key
    pub fn new(api_key: impl Into<String>, config: OpenAiConfig) -> Result<Self> {
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

    fn build_request(&self, request: &CompletionRequest) -> Value {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system.is_empty() {
            messages.push(json!({"role": "system", "content": request.system}));
        }
        for message in &request.messages {
            messages.extend(to_openai_messages(message));
        }

        let mut body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": messages
        });

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request.tools.iter().map(|t| t.to_openai_schema()).collect();
            body["tools"] = json!(tools);
        }

        body
    }

    fn parse_response(&self, body: Value) -> Result<CompletionResponse> {
        let choice = body["choices"]
            .get(0)
            .ok_or_else(|| AgentError::Llm("Response has no choices".to_string()))?;
        let message = &choice["message"];

        let usage = body
            .get("usage")
            .map(|u| {
                Usage::new(
                    u["prompt_tokens"].as_u64().unwrap_or(0),
                    u["completion_tokens"].as_u64().unwrap_or(0),
                )
            })
            .unwrap_or_default();

        if let Ok(mut total) = self.usage.lock() {
            total.add(&usage);
        }

        let tool_calls: Vec<ToolCall> = message["tool_calls"]
            .as_array()
            .map(|calls| {
                calls
                    .iter()
                    .map(|c| {
                        let id = c["id"].as_str().unwrap_or("").to_string();
                        let name = c["function"]["name"].as_str().unwrap_or("").to_string();
                        let input = parse_tool_arguments(c["function"]["arguments"].as_str().unwrap_or(""));
                        ToolCall::new(id, name, input)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: message["content"].as_str().unwrap_or("").to_string(),
            segments: None,
            tool_calls,
            stop_reason: parse_finish_reason(choice["finish_reason"].as_str().unwrap_or("stop")),
            usage,
        })
    }

    async fn send_request(&self, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.config.base_url)
            .bearer_auth(&self.api_key)
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
            warn!("OpenAI rate limit hit, retry after {}s", retry_after);
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

/// Translate one conversation message into OpenAI chat messages
fn to_openai_messages(message: &Message) -> Vec<Value> {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };

    let blocks = match &message.content {
        MessageContent::Text(text) => return vec![json!({"role": role, "content": text})],
        MessageContent::Blocks(blocks) => blocks,
    };

    let mut out = Vec::new();
    let mut text = Vec::new();
    let mut tool_calls = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text: t } => text.push(t.as_str()),
            ContentBlock::ToolUse { id, name, input } => tool_calls.push(json!({
                "id": id,
                "type": "function",
                "function": { "name": name, "arguments": input.to_string() }
            })),
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => {
                let content = if *is_error {
                    format!("Error: {}", content)
                } else {
                    content.clone()
                };
                out.push(json!({"role": "tool", "tool_call_id": tool_use_id, "content": content}));
            }
        }
    }

    if !text.is_empty() || !tool_calls.is_empty() {
        let mut msg = json!({"role": role});
        msg["content"] = if text.is_empty() {
            Value::Null
        } else {
            json!(text.join("\n"))
        };
        if !tool_calls.is_empty() {
            msg["tool_calls"] = json!(tool_calls);
        }
        out.insert(0, msg);
    }

    out
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_request(&request);
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

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
