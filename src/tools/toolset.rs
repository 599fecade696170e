//! Tool set - registration and dispatch by name
//!
//! Names are unique within a set and restricted to what provider APIs accept.

use std::sync::Arc;

use log::{debug, info};
use serde_json::Value;

use crate::error::{AgentError, Result};
use crate::llm::{ToolCall, ToolDefinition, validate_tool_input};

use super::Tool;

/// Longest tool name the hosted APIs accept
const MAX_TOOL_NAME_LEN: usize = 64;

/// Check a tool name against `[A-Za-z0-9_-]{1,64}`
pub fn validate_tool_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_TOOL_NAME_LEN
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(AgentError::InvalidToolName(name.to_string()))
    }
}

/// Ordered collection of tools with pairwise-distinct names
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    /// Create an empty tool set
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Build a tool set, failing on the first invalid or duplicate name
    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Result<Self> {
        let mut set = Self::new();
        for tool in tools {
            set.register(tool)?;
        }
        Ok(set)
    }

    /// Add a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        validate_tool_name(tool.name())?;
        if self.contains(tool.name()) {
            return Err(AgentError::DuplicateTool(tool.name().to_string()));
        }
        debug!("Registered tool {}", tool.name());
        self.tools.push(tool);
        Ok(())
    }

    /// Builder-style registration
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Result<Self> {
        self.register(tool)?;
        Ok(self)
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get tool definitions for the LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Validate and execute one tool call
    pub async fn invoke(&self, call: &ToolCall) -> Result<Value> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::UnknownTool(call.name.clone()))?;

        validate_tool_input(call, &tool.definition())?;

        info!("Invoking tool {} ({})", call.name, call.id);
        tool.invoke(call.input.clone()).await
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSet").field("tools", &self.names()).finish()
    }
}
