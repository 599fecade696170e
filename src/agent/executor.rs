//! Tool-calling agent executor
//!
//! Runs the model/tool loop: ask the model, execute the tool calls it
//! requests, hand the results back, and stop when it answers without tools
//! or the iteration limit is reached.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use colored::*;
use log::{info, warn};
use serde_json::json;

use super::{Agent, AgentRequest, AgentResponse, IntermediateStep, ResponseOutput, TextSegment};
use crate::config::AgentConfig;
use crate::error::Result;
use crate::llm::{
    CompletionRequest, CompletionResponse, LlmClient, Message, ToolCall, ToolResult, Usage, needs_tool_execution,
};
use crate::prompt::PromptRenderer;
use crate::tools::{ToolSet, observation_text};

/// Output returned when the model never produced a final answer
pub const ITERATION_LIMIT_OUTPUT: &str = "Agent stopped due to iteration limit.";

/// Observation text echoed to the console in verbose mode
const VERBOSE_OBSERVATION_CHARS: usize = 500;

pub struct ToolCallingAgent {
    name: String,
    llm: Arc<dyn LlmClient>,
    instructions: String,
    tools: ToolSet,
    config: AgentConfig,
    renderer: PromptRenderer,
}

impl ToolCallingAgent {
    pub fn new(name: impl Into<String>, llm: Arc<dyn LlmClient>, tools: ToolSet) -> Self {
        Self {
            name: name.into(),
            llm,
            instructions: String::new(),
            tools,
            config: AgentConfig::default(),
            renderer: PromptRenderer::new(),
        }
    }

    /// Instructions placed ahead of the tool list in the system prompt
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Render the system prompt for this agent's instructions and tools
    pub fn system_prompt(&self) -> Result<String> {
        let tools: Vec<_> = self
            .tools
            .definitions()
            .into_iter()
            .map(|d| json!({"name": d.name, "description": d.description}))
            .collect();

        self.renderer.render_named(
            "agent_system",
            &json!({"instructions": self.instructions, "tools": tools}),
        )
    }

    /// Execute requested tool calls in order; failures become error results
    async fn execute_calls(&self, calls: &[ToolCall], steps: &mut Vec<IntermediateStep>) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            if self.config.verbose {
                println!("{} `{}` with `{}`", "Invoking:".green(), call.name, call.input);
            }

            let (content, is_error) = match self.tools.invoke(call).await {
                Ok(output) => (observation_text(&output), false),
                Err(e) => {
                    warn!("[{}] tool {} failed: {}", self.name, call.name, e);
                    (e.to_string(), true)
                }
            };

            if self.config.verbose {
                let shown = preview(&content, VERBOSE_OBSERVATION_CHARS);
                if is_error {
                    println!("{}", shown.red());
                } else {
                    println!("{}", shown.dimmed());
                }
            }

            steps.push(IntermediateStep {
                tool: call.name.clone(),
                tool_input: call.input.clone(),
                observation: content.clone(),
                is_error,
                timestamp: Utc::now(),
            });

            results.push(if is_error {
                ToolResult::error(call.id.clone(), content)
            } else {
                ToolResult::success(call.id.clone(), content)
            });
        }

        results
    }

    fn log_usage(&self, usage: &Usage) {
        let model = self.llm.model();
        info!(
            "[{}] {} tokens on {} (~${:.4})",
            self.name,
            usage.total(),
            model,
            usage.cost_usd(model)
        );
    }

    fn final_output(response: &CompletionResponse) -> ResponseOutput {
        match &response.segments {
            Some(segments) if !segments.is_empty() => {
                ResponseOutput::Segments(vec![TextSegment::text(segments.join("\n"))])
            }
            _ => ResponseOutput::Text(response.content.clone()),
        }
    }

    fn finish(&self, input: String, output: ResponseOutput, steps: Vec<IntermediateStep>) -> AgentResponse {
        if self.config.verbose {
            println!("{} {}", "Finished agent".cyan(), self.name.bold());
        }
        AgentResponse {
            input,
            output,
            intermediate_steps: if self.config.return_intermediate_steps {
                steps
            } else {
                Vec::new()
            },
        }
    }
}

#[async_trait]
impl Agent for ToolCallingAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, request: AgentRequest) -> Result<AgentResponse> {
        info!("[{}] request: {}", self.name, request.input);
        if self.config.verbose {
            println!("{} {}", "Entering agent".cyan(), self.name.bold());
        }

        let system = self.system_prompt()?;
        let definitions = self.tools.definitions();
        let mut messages = vec![Message::user(&request.input)];
        let mut steps = Vec::new();
        let mut usage = Usage::default();

        for iteration in 0..self.config.max_iterations {
            let completion = CompletionRequest::new(system.clone())
                .with_messages(messages.clone())
                .with_tools(definitions.clone());

            let response = self.llm.complete(completion).await?;
            usage.add(&response.usage);
            info!(
                "[{}] iteration {}: {} tool call(s), stop={:?}",
                self.name,
                iteration + 1,
                response.tool_calls.len(),
                response.stop_reason
            );

            if !needs_tool_execution(&response) {
                self.log_usage(&usage);
                let output = Self::final_output(&response);
                return Ok(self.finish(request.input, output, steps));
            }

            if self.config.verbose && !response.content.is_empty() {
                println!("{}", response.content.italic());
            }

            let results = self.execute_calls(&response.tool_calls, &mut steps).await;
            messages.push(Message::assistant_tool_calls(&response.content, &response.tool_calls));
            messages.push(Message::tool_results(&results));
        }

        self.log_usage(&usage);
        warn!(
            "[{}] no final answer after {} iterations",
            self.name, self.config.max_iterations
        );
        Ok(self.finish(
            request.input,
            ResponseOutput::Text(ITERATION_LIMIT_OUTPUT.to_string()),
            steps,
        ))
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use crate::llm::{ContentBlock, MessageContent, MockLlmClient};
    use crate::tools::MultiplyTool;

    fn quiet() -> AgentConfig {
        AgentConfig {
            max_iterations: 15,
            verbose: false,
            return_intermediate_steps: true,
        }
    }

    fn math_agent(mock: Arc<MockLlmClient>) -> ToolCallingAgent {
        let tools = ToolSet::new().with(Arc::new(MultiplyTool)).unwrap();
        ToolCallingAgent::new("math", mock, tools).with_config(quiet())
    }

    #[tokio::test]
    async fn test_answers_without_tools() {
        let mock = Arc::new(MockLlmClient::new(vec![CompletionResponse::text("Paris")]));
        let agent = math_agent(mock.clone());

        let response = agent.invoke(AgentRequest::new("Capital of France?")).await.unwrap();

        assert_eq!(response.input, "Capital of France?");
        assert_eq!(response.output, ResponseOutput::Text("Paris".to_string()));
        assert!(response.intermediate_steps.is_empty());
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_executes_tool_then_answers() {
        let mock = Arc::new(MockLlmClient::new(vec![
            CompletionResponse::tool_use(
                "I'll multiply",
                vec![ToolCall::new("call_1", "multiply", json!({"a": 3, "b": 4}))],
            ),
            CompletionResponse::text("3 times 4 is 12"),
        ]));
        let agent = math_agent(mock.clone());

        let response = agent.invoke(AgentRequest::new("3*4?")).await.unwrap();

        assert_eq!(response.output, ResponseOutput::Text("3 times 4 is 12".to_string()));
        assert_eq!(response.intermediate_steps.len(), 1);
        assert_eq!(response.intermediate_steps[0].tool, "multiply");
        assert_eq!(response.intermediate_steps[0].observation, "12.0");
        assert!(!response.intermediate_steps[0].is_error);

        // Second request carries the tool call and its result
        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        let second = &requests[1].messages;
        assert_eq!(second.len(), 3);
        match &second[2].content {
            MessageContent::Blocks(blocks) => assert_eq!(
                blocks[0],
                ContentBlock::ToolResult {
                    tool_use_id: "call_1".to_string(),
                    content: "12.0".to_string(),
                    is_error: false,
                }
            ),
            MessageContent::Text(_) => panic!("expected tool_result blocks"),
        }
    }

    #[tokio::test]
    async fn test_tool_error_is_fed_back() {
        let mock = Arc::new(MockLlmClient::new(vec![
            CompletionResponse::tool_use("", vec![ToolCall::new("c1", "multiply", json!({"a": "x", "b": 2}))]),
            CompletionResponse::tool_use("", vec![ToolCall::new("c2", "divide", json!({}))]),
            CompletionResponse::text("I could not compute that"),
        ]));
        let agent = math_agent(mock.clone());

        let response = agent.invoke(AgentRequest::new("x*2?")).await.unwrap();

        assert_eq!(response.intermediate_steps.len(), 2);
        assert!(response.intermediate_steps.iter().all(|s| s.is_error));
        assert!(response.intermediate_steps[0].observation.contains("must be a number"));
        assert!(response.intermediate_steps[1].observation.contains("Unknown tool: divide"));
        assert_eq!(response.output.primary_text().unwrap(), "I could not compute that");
    }

    #[tokio::test]
    async fn test_stops_at_iteration_limit() {
        let looping: Vec<_> = (0..3)
            .map(|i| {
                CompletionResponse::tool_use("", vec![ToolCall::new(format!("c{}", i), "multiply", json!({"a": 1, "b": 1}))])
            })
            .collect();
        let mock = Arc::new(MockLlmClient::new(looping));
        let agent = math_agent(mock.clone()).with_config(AgentConfig {
            max_iterations: 2,
            ..quiet()
        });

        let response = agent.invoke(AgentRequest::new("loop")).await.unwrap();

        assert_eq!(response.output, ResponseOutput::Text(ITERATION_LIMIT_OUTPUT.to_string()));
        assert_eq!(mock.requests().len(), 2);
        assert_eq!(mock.remaining(), 1);
    }

    #[tokio::test]
    async fn test_llm_error_propagates() {
        let mock = Arc::new(MockLlmClient::new(vec![]));
        let result = math_agent(mock).invoke(AgentRequest::new("anything")).await;
        assert!(matches!(result, Err(AgentError::Llm(_))));
    }

    #[tokio::test]
    async fn test_segmented_provider_output() {
        let mut reply = CompletionResponse::text("hi there\nmore");
        reply.segments = Some(vec!["hi there".to_string(), "more".to_string()]);
        let mock = Arc::new(MockLlmClient::new(vec![reply]));

        let response = math_agent(mock).invoke(AgentRequest::new("hello")).await.unwrap();

        // Text blocks merge into one segment so the formatter shows all of them
        match &response.output {
            ResponseOutput::Segments(segments) => assert_eq!(segments.len(), 1),
            ResponseOutput::Text(_) => panic!("expected segments"),
        }
        assert_eq!(response.output.primary_text().unwrap(), "hi there\nmore");
        let value = response.to_value().unwrap();
        assert_eq!(crate::output::extract_text(&value).unwrap(), "hi there\nmore");
    }

    #[tokio::test]
    async fn test_steps_hidden_unless_requested() {
        let mock = Arc::new(MockLlmClient::new(vec![
            CompletionResponse::tool_use("", vec![ToolCall::new("c1", "multiply", json!({"a": 2, "b": 2}))]),
            CompletionResponse::text("4"),
        ]));
        let agent = math_agent(mock).with_config(AgentConfig {
            return_intermediate_steps: false,
            ..quiet()
        });

        let response = agent.invoke(AgentRequest::new("2*2")).await.unwrap();
        assert!(response.intermediate_steps.is_empty());
    }

    #[test]
    fn test_system_prompt_lists_tools() {
        let mock = Arc::new(MockLlmClient::default());
        let agent = math_agent(mock).with_instructions("Only use tools for arithmetic.");

        let prompt = agent.system_prompt().unwrap();
        assert!(prompt.starts_with("Only use tools for arithmetic."));
        assert!(prompt.contains("- multiply: Multiply two numbers."));
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("abc", 5), "abc");
        assert_eq!(preview("abcdef", 3), "abc...");
    }
}
