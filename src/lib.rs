//! agent-router - route natural-language requests to tool-using agents
//!
//! A router agent picks among tools by their descriptions. Tools are either
//! leaf functions (multiply, a Python shell, web search) or whole agents
//! wrapped with `AgentTool`, so one agent can delegate to another.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod prompt;
pub mod tools;

pub use error::{AgentError, Result};
