//! Output formatting for agent responses
//!
//! Agent output is either a plain string or a list of text segments,
//! depending on the provider. `extract_text` handles both shapes and fails
//! with `UnrecognizedResponse` on anything else.

use colored::*;
use serde_json::Value;

use crate::error::{AgentError, Result};

/// Pull the human-readable answer out of a serialized response
pub fn extract_text(response: &Value) -> Result<String> {
    let output = response
        .get("output")
        .ok_or_else(|| AgentError::UnrecognizedResponse("missing 'output' field".to_string()))?;

    match output {
        Value::String(text) => Ok(text.clone()),
        Value::Array(segments) => {
            let first = segments
                .first()
                .ok_or_else(|| AgentError::UnrecognizedResponse("output has no segments".to_string()))?;
            match first.get("text") {
                Some(Value::String(text)) => Ok(text.clone()),
                _ => Err(AgentError::UnrecognizedResponse(format!("segment without text: {}", first))),
            }
        }
        other => Err(AgentError::UnrecognizedResponse(format!("unexpected output: {}", other))),
    }
}

/// Colorize markdown-ish text for the terminal
pub fn render(text: &str) -> String {
    let mut in_code = false;
    let mut lines = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            in_code = !in_code;
            lines.push(line.dimmed().to_string());
        } else if in_code {
            lines.push(line.green().to_string());
        } else if trimmed.starts_with('#') {
            lines.push(trimmed.trim_start_matches('#').trim().bold().cyan().to_string());
        } else if let Some(item) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
            let indent = &line[..line.len() - trimmed.len()];
            lines.push(format!("{}{} {}", indent, "•".yellow(), item));
        } else {
            lines.push(line.to_string());
        }
    }

    lines.join("\n")
}

/// Extract and render in one step
pub fn format_response(response: &Value) -> Result<String> {
    Ok(render(&extract_text(response)?))
}
