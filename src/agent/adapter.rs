//! Agent-as-tool adapter
//!
//! Wraps an agent so a router can call it like any leaf tool. The tool's
//! string argument is forwarded verbatim as the agent's `input` and the
//! agent's response comes back unmodified.

use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use serde_json::Value;

use super::{Agent, AgentRequest};
use crate::error::Result;
use crate::tools::{Tool, string_input, string_input_schema};

pub struct AgentTool {
    agent: Arc<dyn Agent>,
    name: String,
    description: String,
}

impl AgentTool {
    pub fn new(agent: Arc<dyn Agent>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            agent,
            name: name.into(),
            description: description.into(),
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        string_input_schema("input", "The complete question to hand to this agent")
    }

    async fn invoke(&self, input: Value) -> Result<Value> {
        let question = string_input(&input, "input")?;
        info!("Delegating to agent {} via tool {}", self.agent.name(), self.name);

        let response = self.agent.invoke(AgentRequest::new(question)).await?;
        response.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentResponse, ResponseOutput, TextSegment};
    use crate::error::AgentError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every request and replies with a fixed output
    struct RecordingAgent {
        seen: Mutex<Vec<AgentRequest>>,
        output: ResponseOutput,
    }

    impl RecordingAgent {
        fn new(output: ResponseOutput) -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                output,
            })
        }
    }

    #[async_trait]
    impl Agent for RecordingAgent {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn invoke(&self, request: AgentRequest) -> Result<AgentResponse> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(AgentResponse {
                input: request.input,
                output: self.output.clone(),
                intermediate_steps: Vec::new(),
            })
        }
    }

    struct FailingAgent;

    #[async_trait]
    impl Agent for FailingAgent {
        fn name(&self) -> &str {
            "failing"
        }

        async fn invoke(&self, _request: AgentRequest) -> Result<AgentResponse> {
            Err(AgentError::Llm("provider down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_forwards_input_verbatim() {
        let recorder = RecordingAgent::new(ResponseOutput::Text("answer".to_string()));
        let tool = AgentTool::new(recorder.clone(), "csv_agent", "Answers questions about a CSV file.");

        let question = "  Which season had the most episodes?\n";
        let result = tool.invoke(json!({"input": question})).await.unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].input, question);
        assert_eq!(result, json!({"input": question, "output": "answer"}));
    }

    #[tokio::test]
    async fn test_bare_string_argument() {
        let recorder = RecordingAgent::new(ResponseOutput::Text("ok".to_string()));
        let tool = AgentTool::new(recorder.clone(), "python_agent", "Writes and runs python.");

        tool.invoke(json!("print a QR code")).await.unwrap();
        assert_eq!(recorder.seen.lock().unwrap()[0].input, "print a QR code");
    }

    #[tokio::test]
    async fn test_segmented_output_passes_through() {
        let recorder = RecordingAgent::new(ResponseOutput::Segments(vec![TextSegment::text("hi there")]));
        let tool = AgentTool::new(recorder, "python_agent", "Writes and runs python.");

        let result = tool.invoke(json!({"input": "hello"})).await.unwrap();
        assert_eq!(result["output"][0]["text"], "hi there");
    }

    #[tokio::test]
    async fn test_missing_input_rejected() {
        let recorder = RecordingAgent::new(ResponseOutput::Text("unused".to_string()));
        let tool = AgentTool::new(recorder.clone(), "python_agent", "Writes and runs python.");

        let result = tool.invoke(json!({"question": "hello"})).await;
        assert!(matches!(result, Err(AgentError::InvalidInput(_))));
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_agent_error_propagates() {
        let tool = AgentTool::new(Arc::new(FailingAgent), "broken_agent", "Always fails.");
        let result = tool.invoke(json!({"input": "x"})).await;
        assert!(matches!(result, Err(AgentError::Llm(_))));
    }

    #[test]
    fn test_definition() {
        let recorder = RecordingAgent::new(ResponseOutput::Text(String::new()));
        let tool = AgentTool::new(recorder, "csv_agent", "Answers questions about a CSV file.");
        let def = tool.definition();
        assert_eq!(def.name, "csv_agent");
        assert_eq!(def.input_schema["required"], json!(["input"]));
    }
}
