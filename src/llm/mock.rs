use async_trait::async_trait;
use crate::error::AgentError;
use crate::llm::{ChatBackend, ChatRequest};
use crate::types::ChatResponse;
use std::sync::{Arc, Mutex};

/// Scripted backend for tests — returns programmed responses in order and
/// records every request it receives. No network calls.
pub struct MockBackend {
    responses: Mutex<Vec<ChatResponse>>,
    requests:  Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockBackend {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests:  Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A clonable handle onto the recorded requests, usable after the
    /// backend has been boxed into an LlmClient.
    pub fn request_log(&self) -> MockRequestLog {
        MockRequestLog(Arc::clone(&self.requests))
    }
}

/// Shared view over a MockBackend's recorded requests.
#[derive(Clone)]
pub struct MockRequestLog(Arc<Mutex<Vec<ChatRequest>>>);

impl MockRequestLog {
    /// Returns the number of times complete() was invoked.
    pub fn call_count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    /// Returns a copy of the Nth recorded request (0-indexed).
    pub fn request(&self, n: usize) -> Option<ChatRequest> {
        self.0.lock().unwrap().get(n).cloned()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        self.requests.lock().unwrap().push(request.clone());

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(AgentError::Provider(
                "MockBackend: no more programmed responses".to_string(),
            ));
        }
        Ok(responses.remove(0))
    }
}
