//! Prompt System - system prompt templates rendered with Handlebars

mod render;

pub use render::{AGENT_SYSTEM_TEMPLATE, CSV_INSTRUCTIONS_TEMPLATE, PromptRenderer};
