//! Reasoning provider port - a chat-completion model used for service
//! selection.

use async_trait::async_trait;
use thiserror::Error;

/// Role of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningRole {
    System,
    User,
    Assistant,
}

/// One message in a reasoning prompt.
#[derive(Debug, Clone)]
pub struct ReasoningMessage {
    pub role: ReasoningRole,
    pub content: String,
}

impl ReasoningMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ReasoningRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ReasoningRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ReasoningRole::Assistant,
            content: content.into(),
        }
    }
}

/// A completion request. Generation parameters (max tokens,
/// temperature) belong to the provider's configuration, not the
/// request.
#[derive(Debug, Clone)]
pub struct ReasoningRequest {
    pub messages: Vec<ReasoningMessage>,
}

impl ReasoningRequest {
    pub fn new(messages: Vec<ReasoningMessage>) -> Self {
        Self { messages }
    }
}

/// A completion response.
#[derive(Debug, Clone)]
pub struct ReasoningResponse {
    pub content: String,
    pub model: String,
    pub tokens_used: Option<u32>,
}

/// Errors a reasoning provider can surface.
///
/// All of these are recoverable from the planner's point of view: the
/// selection strategy falls back to its heuristic.
#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("invalid API key")]
    InvalidApiKey,

    #[error("rate limited by provider")]
    RateLimited,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),
}

/// Chat-completion access for the selection strategy.
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    async fn complete(&self, request: ReasoningRequest) -> Result<ReasoningResponse, ReasoningError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
