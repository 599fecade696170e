//! multiply tool - arithmetic leaf tool

use async_trait::async_trait;
use serde_json::{Value, json};

use super::Tool;
use crate::error::{AgentError, Result};

/// Product of two numbers
pub fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

pub struct MultiplyTool;

impl MultiplyTool {
    fn number_arg(input: &Value, field: &str) -> Result<f64> {
        match input.get(field) {
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| AgentError::InvalidInput(format!("'{}' is not representable as f64", field))),
            Some(other) => Err(AgentError::InvalidInput(format!(
                "'{}' must be a number, got {}",
                field, other
            ))),
            None => Err(AgentError::InvalidInput(format!("missing required field '{}'", field))),
        }
    }
}

#[async_trait]
impl Tool for MultiplyTool {
    fn name(&self) -> &str {
        "multiply"
    }

    fn description(&self) -> &str {
        "Multiply two numbers. Call with both factors as JSON numbers: {\"a\": 3, \"b\": 4}."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "a": { "type": "number", "description": "First factor" },
                "b": { "type": "number", "description": "Second factor" }
            },
            "required": ["a", "b"]
        })
    }

    async fn invoke(&self, input: Value) -> Result<Value> {
        let a = Self::number_arg(&input, "a")?;
        let b = Self::number_arg(&input, "b")?;
        Ok(json!(multiply(a, b)))
    }
}
