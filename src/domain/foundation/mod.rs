//! Foundation module - shared value objects and error types.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ConversationId, ServiceId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
