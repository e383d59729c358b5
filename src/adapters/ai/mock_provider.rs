//! Mock reasoning provider for tests and offline mode.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ports::{ReasoningError, ReasoningProvider, ReasoningRequest, ReasoningResponse};

/// Queue-driven provider: responses and errors are replayed in FIFO
/// order; an empty queue yields an empty JSON object, which pushes the
/// selection strategy onto its heuristic fallback.
pub struct MockReasoningProvider {
    responses: Mutex<VecDeque<String>>,
    errors: Mutex<VecDeque<ReasoningError>>,
    requests: Mutex<Vec<ReasoningRequest>>,
}

impl MockReasoningProvider {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            errors: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues a canned response.
    pub async fn queue_response(&self, content: impl Into<String>) {
        self.responses.lock().await.push_back(content.into());
    }

    /// Queues an error to be returned before any canned response.
    pub async fn fail_next(&self, error: ReasoningError) {
        self.errors.lock().await.push_back(error);
    }

    /// Number of completed calls.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// The most recent request, for prompt assertions.
    pub async fn last_request(&self) -> Option<ReasoningRequest> {
        self.requests.lock().await.last().cloned()
    }
}

impl Default for MockReasoningProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReasoningProvider for MockReasoningProvider {
    async fn complete(
        &self,
        request: ReasoningRequest,
    ) -> Result<ReasoningResponse, ReasoningError> {
        self.requests.lock().await.push(request);

        if let Some(error) = self.errors.lock().await.pop_front() {
            return Err(error);
        }

        let content = self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "{}".to_string());

        Ok(ReasoningResponse {
            content,
            model: "mock".to_string(),
            tokens_used: None,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
