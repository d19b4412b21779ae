//! Conversation orchestration around the history store.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::command::Command;
use super::prompt::build_prompt;
use crate::history::{HistoryResult, HistoryStore};

/// Window size used when none is configured or the configured one is not positive.
pub const DEFAULT_HISTORY_WINDOW: i64 = 20;

/// Reply sent after a successful `/forget`.
pub const FORGET_CONFIRMATION: &str = "Conversation history cleared.";

/// Reply sent when `/forget` could not purge the history.
pub const FORGET_FAILED: &str = "Sorry, I couldn't clear your history right now.";

/// Number of past messages fed into each prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow(i64);

impl HistoryWindow {
    /// Use `size`, falling back to [`DEFAULT_HISTORY_WINDOW`] when it is not positive.
    pub fn new(size: i64) -> Self {
        if size > 0 {
            Self(size)
        } else {
            Self(DEFAULT_HISTORY_WINDOW)
        }
    }

    /// Parse a raw setting such as the `MAX_HISTORY` environment variable.
    ///
    /// Returns `None` for missing, unparsable or non-positive values.
    pub fn parse(value: Option<&str>) -> Option<Self> {
        value?
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|n| *n > 0)
            .map(Self)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self(DEFAULT_HISTORY_WINDOW)
    }
}

/// Produces the bot's reply for a prompt.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Outcome of handling one incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The generator answered; the text has been stored as the bot's turn.
    Generated(String),
    /// `/forget` was handled; `cleared` is false if the purge failed.
    Forgot { cleared: bool },
}

impl Reply {
    /// Text to send back to the user.
    pub fn text(&self) -> &str {
        match self {
            Self::Generated(text) => text,
            Self::Forgot { cleared: true } => FORGET_CONFIRMATION,
            Self::Forgot { cleared: false } => FORGET_FAILED,
        }
    }
}

/// Sequences store calls around reply generation for each incoming message.
///
/// A failed write is logged and skipped, and a failed history read is treated
/// as an empty history, so the bot keeps answering without context. Using the
/// service while its store is closed is a caller bug and is returned as
/// [`HistoryError::NotInitialized`](crate::history::HistoryError::NotInitialized).
#[derive(Debug, Clone)]
pub struct ConversationService {
    store: Arc<HistoryStore>,
    window: HistoryWindow,
}

/// Log a recoverable store failure and use `fallback` instead.
///
/// Lifecycle errors pass through untouched.
fn recover<T>(result: HistoryResult<T>, fallback: T, action: &str) -> HistoryResult<T> {
    match result {
        Err(e) if e.is_lifecycle_error() => Err(e),
        Err(e) => {
            warn!("failed to {action}: {e}");
            Ok(fallback)
        }
        ok => ok,
    }
}

impl ConversationService {
    /// Create a new conversation service.
    pub fn new(store: Arc<HistoryStore>, window: HistoryWindow) -> Self {
        Self { store, window }
    }

    /// Persist a user's incoming message. Write failures are logged, not returned.
    #[instrument(skip(self, text))]
    pub async fn save_incoming(&self, user_id: i64, text: &str) -> HistoryResult<()> {
        let saved = self.store.append(user_id, text).await.map(|_| ());
        recover(saved, (), "save incoming message")
    }

    /// Persist the bot's reply. Write failures are logged, not returned.
    #[instrument(skip(self, reply))]
    pub async fn save_reply(&self, user_id: i64, reply: &str) -> HistoryResult<()> {
        let saved = self.store.append(user_id, reply).await.map(|_| ());
        recover(saved, (), "save bot reply")
    }

    /// Recent messages for prompt building, newest first.
    ///
    /// Returns an empty history when the store cannot be read.
    #[instrument(skip(self))]
    pub async fn conversation_history(&self, user_id: i64) -> HistoryResult<Vec<String>> {
        let history = self.store.recent_history(user_id, self.window.get()).await;
        recover(history, Vec::new(), "get history")
    }

    /// Erase a user's history. Returns false if the purge failed.
    #[instrument(skip(self))]
    pub async fn forget(&self, user_id: i64) -> HistoryResult<bool> {
        let purged = self.store.purge(user_id).await.map(|_| true);
        recover(purged, false, "delete history")
    }

    /// Prompt the generator would see for `text`, without storing anything.
    pub async fn preview_prompt(&self, user_id: i64, text: &str) -> HistoryResult<String> {
        let history = self.conversation_history(user_id).await?;
        Ok(build_prompt(&history, text))
    }

    /// Handle one incoming message end to end.
    ///
    /// `/forget` purges and answers directly; the command itself is not stored.
    /// Otherwise the history is read before the message is stored, so the
    /// prompt carries the current text once. Generator failures and a closed
    /// store are returned as errors.
    #[instrument(skip(self, text, generator))]
    pub async fn handle_message(
        &self,
        user_id: i64,
        text: &str,
        generator: &dyn ReplyGenerator,
    ) -> Result<Reply> {
        if let Some(Command::Forget) = Command::parse(text) {
            let cleared = self.forget(user_id).await?;
            return Ok(Reply::Forgot { cleared });
        }

        let history = self.conversation_history(user_id).await?;
        self.save_incoming(user_id, text).await?;

        let prompt = build_prompt(&history, text);
        debug!(context_messages = history.len(), "built prompt");

        let reply = generator
            .generate(&prompt)
            .await
            .context("generating reply")?;

        self.save_reply(user_id, &reply).await?;
        Ok(Reply::Generated(reply))
    }
}
