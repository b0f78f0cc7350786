//! In-memory provider with scripted responses.
//!
//! Tests push responses (or errors) in the order the code under test will
//! request them, then inspect the recorded requests afterwards. The queue is
//! behind a mutex so one mock can be shared across a compiled pipeline.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use pipeline::{ChatRequest, ChatResponse, LlmError, LlmProvider, TokenCount};

/// Scripted [`LlmProvider`] for tests.
#[derive(Default)]
pub struct MockProvider {
    script: Mutex<VecDeque<Result<ChatResponse, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    /// Creates a mock with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response with the given content and zero usage.
    pub fn push_content(&self, content: impl Into<String>) {
        self.push_response(ChatResponse {
            content: content.into(),
            tokens_in: TokenCount::new(0),
            tokens_out: TokenCount::new(0),
        });
    }

    /// Queues a successful response.
    pub fn push_response(&self, response: ChatResponse) {
        self.script
            .lock()
            .expect("mock script lock")
            .push_back(Ok(response));
    }

    /// Queues a failure.
    pub fn push_error(&self, error: LlmError) {
        self.script
            .lock()
            .expect("mock script lock")
            .push_back(Err(error));
    }

    /// The requests received so far, in call order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("mock request lock").clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "MockProvider"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests
            .lock()
            .expect("mock request lock")
            .push(request.clone());
        self.script
            .lock()
            .expect("mock script lock")
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Transport {
                    message: "mock script exhausted".to_owned(),
                })
            })
    }
}
