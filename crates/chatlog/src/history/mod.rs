//! Conversation history store.
//!
//! A keyed, append-only log of messages per user, stored in a single SQLite
//! file (`telegram_history` table). The store supports:
//! - `append`: record one turn (user input or bot reply)
//! - `recent_history`: the newest N turns for a user, newest first
//! - `purge`: drop everything for one user in one transaction
//!
//! Records are ordered by `(timestamp, id)`. The id is an `AUTOINCREMENT` key,
//! so it only grows and breaks ties when timestamps collide.

mod db;
mod error;
mod models;
mod repository;
mod store;

pub use db::IN_MEMORY_LOCATION;
pub use error::{HistoryError, HistoryResult};
pub use models::MessageRecord;
pub use store::HistoryStore;
