//! Agents - request/response types, the tool-calling executor, and the
//! adapter that exposes an agent as a tool of another agent.

mod adapter;
mod executor;
pub mod presets;

pub use adapter::AgentTool;
pub use executor::{ITERATION_LIMIT_OUTPUT, ToolCallingAgent};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// Anything that turns a natural-language request into a response
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    async fn invoke(&self, request: AgentRequest) -> Result<AgentResponse>;
}

/// Request payload, serialized as `{"input": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub input: String,
}

impl AgentRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self { input: input.into() }
    }
}

/// One text segment of a segmented output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub text: String,
}

impl TextSegment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: Some("text".to_string()),
            text: text.into(),
        }
    }
}

/// Final answer of an agent: a plain string or a list of text segments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseOutput {
    Text(String),
    Segments(Vec<TextSegment>),
}

impl ResponseOutput {
    /// Human-readable text: the string itself, or the first segment's text
    pub fn primary_text(&self) -> Result<&str> {
        match self {
            ResponseOutput::Text(text) => Ok(text),
            ResponseOutput::Segments(segments) => segments
                .first()
                .map(|s| s.text.as_str())
                .ok_or_else(|| AgentError::UnrecognizedResponse("output has no segments".to_string())),
        }
    }
}

/// A tool invocation made while answering a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntermediateStep {
    pub tool: String,
    pub tool_input: serde_json::Value,
    pub observation: String,
    pub is_error: bool,
    pub timestamp: DateTime<Utc>,
}

/// Result of one agent invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub input: String,
    pub output: ResponseOutput,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intermediate_steps: Vec<IntermediateStep>,
}

impl AgentResponse {
    /// Plain-text response with no recorded steps
    pub fn text(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: ResponseOutput::Text(output.into()),
            intermediate_steps: Vec::new(),
        }
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
