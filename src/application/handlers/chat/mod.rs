//! Chat turn handling.

mod send_message;

pub use send_message::{SendMessageCommand, SendMessageError, SendMessageHandler, SendMessageResult};
