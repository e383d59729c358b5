//! Reasoning provider adapters.

mod mock_provider;
mod openai_provider;

pub use mock_provider::MockReasoningProvider;
pub use openai_provider::OpenAiProvider;
