//! LLM Client Layer - provider APIs behind one trait
//!
//! This module provides:
//! - Message types for LLM communication
//! - LlmClient trait for API abstraction
//! - OpenAiClient and AnthropicClient implementations
//! - MockLlmClient for scripted tests
//! - Tool call parsing and validation

pub mod anthropic;
pub mod client;
pub mod openai;
pub mod tool_parser;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use client::{LlmClient, MockLlmClient};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use tool_parser::{needs_tool_execution, parse_tool_arguments, validate_tool_input};
pub use types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, MessageContent, Role, StopReason, ToolCall,
    ToolDefinition, ToolResult, Usage,
};

use crate::config::{Credentials, LlmConfig, LlmProvider};
use crate::error::Result;

/// Build the client for the configured provider with explicit credentials
pub fn build_client(config: &LlmConfig, credentials: &Credentials) -> Result<Arc<dyn LlmClient>> {
    let timeout = Duration::from_millis(config.timeout_ms);

    let client: Arc<dyn LlmClient> = match config.provider {
        LlmProvider::OpenAi => {
            let mut openai = OpenAiConfig {
                model: config.model_name().to_string(),
                max_tokens: config.max_tokens,
                temperature: config.temperature,
                timeout,
                ..Default::default()
            };
            if let Some(url) = &config.base_url {
                openai.base_url = url.clone();
            }
            Arc::new(OpenAiClient::new(credentials.openai_api_key()?, openai)?)
        }
        LlmProvider::Anthropic => {
            let mut anthropic = AnthropicConfig {
                model: config.model_name().to_string(),
                max_tokens: config.max_tokens,
                temperature: config.temperature,
                timeout,
                ..Default::default()
            };
            if let Some(url) = &config.base_url {
                anthropic.base_url = url.clone();
            }
            Arc::new(AnthropicClient::new(credentials.anthropic_api_key()?, anthropic)?)
        }
    };

    log::info!("Using {:?} model {}", config.provider, client.model());
    Ok(client)
}
