//! Conversation aggregate - phases, message history, and the turn engine
//! that drives fact gathering toward planning.

mod conversation;
mod engine;
mod message;
mod phase;

pub use conversation::Conversation;
pub use engine::{EngineOutput, NextAction, TurnEngine, NUDGE_TEMPLATES};
pub use message::{Message, MessageRole};
pub use phase::ConversationPhase;
