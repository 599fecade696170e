//! Tool System - leaf tools and the tool set an agent exposes to its model
//!
//! A tool has a name, a description the model reads to decide when to call
//! it, a JSON schema for its input, and an async `invoke`.

mod multiply;
mod python_repl;
mod search;
mod toolset;

pub use multiply::{MultiplyTool, multiply};
pub use python_repl::{PythonReplTool, sanitize_code};
pub use search::{SearchResult, WebSearchTool};
pub use toolset::{ToolSet, validate_tool_name};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AgentError, Result};
use crate::llm::ToolDefinition;

/// A tool that can be called by the LLM
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches the tool-call name sent by the model)
    fn name(&self) -> &str;

    /// Natural-language description shown to the model
    fn description(&self) -> &str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Run the tool. Malformed input is an error, never coerced.
    async fn invoke(&self, input: Value) -> Result<Value>;

    /// Definition sent to the model
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }
}

/// Schema for tools that take one free-text field
pub fn string_input_schema(field: &str, description: &str) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            field: { "type": "string", "description": description }
        },
        "required": [field]
    })
}

/// Extract a string argument from either a bare JSON string or `{field: "..."}`
pub fn string_input(input: &Value, field: &str) -> Result<String> {
    match input {
        Value::String(s) => Ok(s.clone()),
        Value::Object(map) => match map.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(AgentError::InvalidInput(format!(
                "'{}' must be a string, got {}",
                field, other
            ))),
            None => Err(AgentError::InvalidInput(format!("missing required field '{}'", field))),
        },
        other => Err(AgentError::InvalidInput(format!(
            "expected a string or an object with '{}', got {}",
            field, other
        ))),
    }
}

/// Render a tool output as the observation text handed back to the model
pub fn observation_text(output: &Value) -> String {
    match output {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
