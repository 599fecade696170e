//! Error types for agent-router
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while building or running agents
#[derive(Debug, Error)]
pub enum AgentError {
    /// LLM API error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Tool execution error
    #[error("Tool error: {0}")]
    Tool(String),

    /// Tool or agent input did not match the expected shape
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A tool with the same name is already registered
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    /// Tool name that provider APIs would reject
    #[error("Invalid tool name: {0}")]
    InvalidToolName(String),

    /// Model asked for a tool that is not in the tool set
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Agent response matched neither the text nor the segmented shape
    #[error("Unrecognized response shape: {0}")]
    UnrecognizedResponse(String),

    /// Credential required by a client or tool is absent
    #[error("Missing credential: environment variable {0} not set")]
    MissingCredential(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Prompt template error
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for agent-router operations
pub type Result<T> = std::result::Result<T, AgentError>;
