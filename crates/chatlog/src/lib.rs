//! Chatlog Library
//!
//! Per-user conversation history for chat bots: a durable SQLite-backed
//! [`history::HistoryStore`] and the [`conversation::ConversationService`] that
//! sequences it around reply generation.

pub mod conversation;
pub mod history;
