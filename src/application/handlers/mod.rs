//! Command handlers.

pub mod chat;
