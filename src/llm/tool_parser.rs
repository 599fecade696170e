//! Tool call helpers shared by the provider clients and the agent executor
//!
//! Stop-reason mapping, argument parsing for providers that send tool
//! arguments as a JSON string, and validation of tool calls against the
//! definitions that were offered to the model.

use serde_json::Value;

use crate::error::{AgentError, Result};
use crate::llm::types::{CompletionResponse, StopReason, ToolCall, ToolDefinition};

/// Parse an Anthropic stop reason string into StopReason
pub fn parse_stop_reason(reason: &str) -> StopReason {
    match reason {
        "end_turn" => StopReason::EndTurn,
        "tool_use" => StopReason::ToolUse,
        "max_tokens" => StopReason::MaxTokens,
        "stop_sequence" => StopReason::StopSequence,
        _ => StopReason::EndTurn,
    }
}

/// Parse an OpenAI finish_reason into StopReason
pub fn parse_finish_reason(reason: &str) -> StopReason {
    match reason {
        "tool_calls" | "function_call" => StopReason::ToolUse,
        "length" => StopReason::MaxTokens,
        "content_filter" => StopReason::StopSequence,
        _ => StopReason::EndTurn,
    }
}

/// Parse tool arguments sent as a JSON string.
///
/// Empty arguments become an empty object. Text that is not valid JSON is
/// passed through as a JSON string so string-input tools can still use it.
pub fn parse_tool_arguments(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Validate a tool call's input against a tool definition's schema
///
/// Checks that all required fields are present in the input. A bare string
/// input satisfies a schema with a single required field.
pub fn validate_tool_input(call: &ToolCall, definition: &ToolDefinition) -> Result<()> {
    let Some(required) = definition.input_schema.get("required").and_then(|r| r.as_array()) else {
        return Ok(());
    };

    if call.input.is_string() && required.len() <= 1 {
        return Ok(());
    }

    for req in required {
        if let Some(field_name) = req.as_str()
            && call.input.get(field_name).is_none()
        {
            return Err(AgentError::InvalidInput(format!(
                "Tool '{}' missing required field: {}",
                call.name, field_name
            )));
        }
    }

    Ok(())
}

/// Check if a response requires tool execution
pub fn needs_tool_execution(response: &CompletionResponse) -> bool {
    !response.tool_calls.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn multiply_definition() -> ToolDefinition {
        ToolDefinition::new(
            "multiply",
            "Multiply",
            json!({
                "type": "object",
                "properties": { "a": {"type": "number"}, "b": {"type": "number"} },
                "required": ["a", "b"]
            }),
        )
    }

    #[test]
    fn test_parse_stop_reason() {
        assert_eq!(parse_stop_reason("end_turn"), StopReason::EndTurn);
        assert_eq!(parse_stop_reason("tool_use"), StopReason::ToolUse);
        assert_eq!(parse_stop_reason("max_tokens"), StopReason::MaxTokens);
        assert_eq!(parse_stop_reason("stop_sequence"), StopReason::StopSequence);
        assert_eq!(parse_stop_reason("unknown"), StopReason::EndTurn);
    }

    #[test]
    fn test_parse_finish_reason() {
        assert_eq!(parse_finish_reason("stop"), StopReason::EndTurn);
        assert_eq!(parse_finish_reason("tool_calls"), StopReason::ToolUse);
        assert_eq!(parse_finish_reason("length"), StopReason::MaxTokens);
    }

    #[test]
    fn test_parse_tool_arguments() {
        assert_eq!(parse_tool_arguments("{\"a\": 1}"), json!({"a": 1}));
        assert_eq!(parse_tool_arguments(""), json!({}));
        assert_eq!(parse_tool_arguments("print(1)"), json!("print(1)"));
    }

    #[test]
    fn test_validate_tool_input_ok() {
        let call = ToolCall::new("1", "multiply", json!({"a": 1, "b": 2}));
        assert!(validate_tool_input(&call, &multiply_definition()).is_ok());
    }

    #[test]
    fn test_validate_tool_input_missing_field() {
        let call = ToolCall::new("1", "multiply", json!({"a": 1}));
        let err = validate_tool_input(&call, &multiply_definition()).unwrap_err();
        assert!(err.to_string().contains("missing required field: b"));
    }

    #[test]
    fn test_validate_bare_string_for_single_field() {
        let def = ToolDefinition::new(
            "csv_agent",
            "Ask",
            json!({"type": "object", "properties": {"input": {"type": "string"}}, "required": ["input"]}),
        );
        let call = ToolCall::new("1", "csv_agent", json!("how many columns?"));
        assert!(validate_tool_input(&call, &def).is_ok());
    }

    #[test]
    fn test_needs_tool_execution() {
        assert!(!needs_tool_execution(&CompletionResponse::text("done")));
        let response = CompletionResponse::tool_use("", vec![ToolCall::new("1", "multiply", json!({}))]);
        assert!(needs_tool_execution(&response));
    }
}
