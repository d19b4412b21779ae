//! History store with an explicit open/closed lifecycle.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, info, instrument};

use super::db::HistoryDb;
use super::error::{HistoryError, HistoryResult};
use super::models::MessageRecord;
use super::repository::HistoryRepository;

/// Durable per-user conversation history.
///
/// A store starts `Closed`. [`initialize`](Self::initialize) opens the backing
/// database and moves it to `Open`; [`shutdown`](Self::shutdown) releases the
/// connections and returns it to `Closed`. Data operations on a closed store
/// fail with [`HistoryError::NotInitialized`].
///
/// The store is `Send + Sync`; share it behind an `Arc`. Concurrent calls are
/// safe and each one is atomic, with SQLite serializing writers.
#[derive(Debug, Default)]
pub struct HistoryStore {
    db: RwLock<Option<HistoryDb>>,
}

impl HistoryStore {
    /// Create a closed store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store and initialize it at `location` in one step.
    pub async fn open(location: impl AsRef<Path>) -> HistoryResult<Self> {
        let store = Self::new();
        store.initialize(location).await?;
        Ok(store)
    }

    /// Open or create the backing database and ensure the schema exists.
    ///
    /// Fails with [`HistoryError::AlreadyInitialized`] if the store is already
    /// open, and with [`HistoryError::StoreUnavailable`] if the location cannot
    /// be opened.
    #[instrument(skip(self, location), fields(location = %location.as_ref().display()))]
    pub async fn initialize(&self, location: impl AsRef<Path>) -> HistoryResult<()> {
        if let Some(existing) = self.current() {
            return Err(HistoryError::AlreadyInitialized(existing.path().to_path_buf()));
        }

        let db = HistoryDb::open(location.as_ref()).await?;

        // Another caller may have opened the store while we were connecting
        let conflict = {
            let mut slot = self.db.write().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(existing) => Some(existing.path().to_path_buf()),
                None => {
                    *slot = Some(db.clone());
                    None
                }
            }
        };
        if let Some(path) = conflict {
            db.close().await;
            return Err(HistoryError::AlreadyInitialized(path));
        }

        info!("history store open at {}", db.path().display());
        Ok(())
    }

    /// Release the backing connections. Closing a closed store is a no-op.
    pub async fn shutdown(&self) {
        let db = self.db.write().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(db) = db {
            db.close().await;
            info!("history store closed ({})", db.path().display());
        }
    }

    /// Whether the store is open.
    pub fn is_open(&self) -> bool {
        self.current().is_some()
    }

    /// Location of the open database, if any.
    pub fn location(&self) -> Option<PathBuf> {
        self.current().map(|db| db.path().to_path_buf())
    }

    /// Check that the open database answers queries. `false` when closed.
    pub async fn is_healthy(&self) -> bool {
        match self.current() {
            Some(db) => db.is_healthy().await,
            None => false,
        }
    }

    /// Store one message for `user_id` and return its assigned id.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub async fn append(&self, user_id: i64, text: &str) -> HistoryResult<i64> {
        let db = self.require_open()?;
        let id = HistoryRepository::new(db.pool())
            .insert(user_id, text)
            .await
            .map_err(|e| HistoryError::write("append", user_id, e))?;

        debug!(id, "appended message");
        Ok(id)
    }

    /// The `limit` most recent message texts for `user_id`, newest first.
    ///
    /// A user without history yields an empty vector. A non-positive `limit`
    /// also yields an empty vector and does not touch the database.
    #[instrument(skip(self))]
    pub async fn recent_history(&self, user_id: i64, limit: i64) -> HistoryResult<Vec<String>> {
        let db = self.require_open()?;
        if limit <= 0 {
            return Ok(Vec::new());
        }

        HistoryRepository::new(db.pool())
            .recent_texts(user_id, limit)
            .await
            .map_err(|e| HistoryError::read(user_id, e))
    }

    /// Like [`recent_history`](Self::recent_history) but returns full records.
    #[instrument(skip(self))]
    pub async fn recent_records(
        &self,
        user_id: i64,
        limit: i64,
    ) -> HistoryResult<Vec<MessageRecord>> {
        let db = self.require_open()?;
        if limit <= 0 {
            return Ok(Vec::new());
        }

        HistoryRepository::new(db.pool())
            .recent_records(user_id, limit)
            .await
            .map_err(|e| HistoryError::read(user_id, e))
    }

    /// Number of stored messages for `user_id`.
    #[instrument(skip(self))]
    pub async fn count(&self, user_id: i64) -> HistoryResult<i64> {
        let db = self.require_open()?;
        HistoryRepository::new(db.pool())
            .count(user_id)
            .await
            .map_err(|e| HistoryError::read(user_id, e))
    }

    /// Delete every message for `user_id` atomically.
    ///
    /// Returns how many were removed; purging a user with no history returns 0.
    #[instrument(skip(self))]
    pub async fn purge(&self, user_id: i64) -> HistoryResult<u64> {
        let db = self.require_open()?;
        let removed = HistoryRepository::new(db.pool())
            .delete_user(user_id)
            .await
            .map_err(|e| HistoryError::write("purge", user_id, e))?;

        info!(removed, "purged history");
        Ok(removed)
    }

    fn current(&self) -> Option<HistoryDb> {
        self.db
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn require_open(&self) -> HistoryResult<HistoryDb> {
        self.current().ok_or(HistoryError::NotInitialized)
    }
}
