//! LlmClient trait and a scripted client for tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::llm::types::{CompletionRequest, CompletionResponse, Usage};

/// Stateless LLM client - the caller sends the whole conversation every call
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Model identifier used for requests
    fn model(&self) -> &str;

    /// Whether the client has what it needs to make requests
    fn is_ready(&self) -> bool;

    /// Tokens consumed by every request this client has completed
    fn total_usage(&self) -> Usage;
}

/// LLM client that replays a fixed script of responses.
///
/// Every request is recorded so tests can assert on what the agent sent.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    responses: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
    usage: Mutex<Usage>,
}

impl MockLlmClient {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            usage: Mutex::new(Usage::default()),
        }
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of scripted responses not yet consumed
    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let response = self
            .responses
            .lock()
            .map_err(|_| AgentError::Llm("mock client poisoned".to_string()))?
            .pop_front()
            .ok_or_else(|| AgentError::Llm("mock script exhausted".to_string()))?;

        if let Ok(mut usage) = self.usage.lock() {
            usage.add(&response.usage);
        }
        Ok(response)
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn total_usage(&self) -> Usage {
        self.usage.lock().map(|u| u.clone()).unwrap_or_default()
    }
}
