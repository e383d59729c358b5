//! OpenAI chat-completions adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AiConfig;
use crate::ports::{
    ReasoningError, ReasoningMessage, ReasoningProvider, ReasoningRequest, ReasoningResponse,
    ReasoningRole,
};

/// Reasoning provider backed by the OpenAI chat-completions API.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: Secret<String>,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f64,
}

impl OpenAiProvider {
    /// Builds a provider from configuration.
    ///
    /// Fails when no API key is configured or the HTTP client cannot
    /// be constructed.
    pub fn from_config(config: &AiConfig) -> Result<Self, ReasoningError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(ReasoningError::InvalidApiKey)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ReasoningError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    model: String,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

fn to_wire(message: &ReasoningMessage) -> ChatMessage {
    let role = match message.role {
        ReasoningRole::System => "system",
        ReasoningRole::User => "user",
        ReasoningRole::Assistant => "assistant",
    };
    ChatMessage {
        role: role.to_string(),
        content: message.content.clone(),
    }
}

#[async_trait]
impl ReasoningProvider for OpenAiProvider {
    async fn complete(
        &self,
        request: ReasoningRequest,
    ) -> Result<ReasoningResponse, ReasoningError> {
        let body = ChatRequest {
            model: &self.model,
            messages: request.messages.iter().map(to_wire).collect(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReasoningError::Timeout
                } else {
                    ReasoningError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED => ReasoningError::InvalidApiKey,
                StatusCode::TOO_MANY_REQUESTS => ReasoningError::RateLimited,
                StatusCode::BAD_REQUEST => ReasoningError::InvalidRequest(detail),
                s if s.is_server_error() => ReasoningError::Unavailable(detail),
                _ => ReasoningError::Network(format!("unexpected status {}: {}", status, detail)),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ReasoningError::Network(format!("malformed response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ReasoningError::Unavailable("empty choices".to_string()))?;

        debug!(model = %parsed.model, "completion received");

        Ok(ReasoningResponse {
            content,
            model: parsed.model,
            tokens_used: parsed.usage.map(|u| u.total_tokens),
        })
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_fails_construction() {
        let config = AiConfig::default();
        assert!(matches!(
            OpenAiProvider::from_config(&config),
            Err(ReasoningError::InvalidApiKey)
        ));
    }

    #[test]
    fn trailing_slash_in_base_url_is_trimmed() {
        let config = AiConfig {
            api_key: Some(Secret::new("sk-test".to_string())),
            base_url: "https://api.openai.com/v1/".to_string(),
            ..AiConfig::default()
        };
        let provider = OpenAiProvider::from_config(&config).unwrap();
        assert_eq!(provider.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn generation_parameters_come_from_config() {
        let config = AiConfig {
            api_key: Some(Secret::new("sk-test".to_string())),
            max_tokens: 2048,
            temperature: 0.9,
            ..AiConfig::default()
        };
        let provider = OpenAiProvider::from_config(&config).unwrap();
        assert_eq!(provider.max_tokens, 2048);
        assert_eq!(provider.temperature, 0.9);
    }

    #[test]
    fn roles_map_to_wire_names() {
        assert_eq!(to_wire(&ReasoningMessage::system("s")).role, "system");
        assert_eq!(to_wire(&ReasoningMessage::user("u")).role, "user");
        assert_eq!(to_wire(&ReasoningMessage::assistant("a")).role, "assistant");
    }
}
