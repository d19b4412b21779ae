//! Conversation orchestration for chat-bot integrations.
//!
//! For each incoming message the [`ConversationService`]:
//! 1. reads the user's recent history (newest first)
//! 2. stores the incoming text
//! 3. builds a prompt with [`build_prompt`] and asks a [`ReplyGenerator`]
//! 4. stores the reply
//!
//! A `/forget` command purges the user's history instead. Transport (webhooks,
//! platform message types) stays outside this module.

mod command;
mod prompt;
mod service;

pub use command::Command;
pub use prompt::build_prompt;
pub use service::{
    ConversationService, DEFAULT_HISTORY_WINDOW, FORGET_CONFIRMATION, FORGET_FAILED,
    HistoryWindow, Reply, ReplyGenerator,
};
