//! Test utilities and common setup.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chatlog::history::HistoryStore;
use sqlx::Connection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use tempfile::TempDir;

/// An open store backed by a fresh database file.
///
/// Keep the returned `TempDir` alive for as long as the store is used.
pub async fn file_store() -> (TempDir, PathBuf, Arc<HistoryStore>) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("history.db");
    let store = HistoryStore::open(&path).await.unwrap();
    (temp, path, Arc::new(store))
}

/// Append `texts` for `user_id` in order.
pub async fn append_all(store: &HistoryStore, user_id: i64, texts: &[&str]) {
    for text in texts {
        store.append(user_id, text).await.unwrap();
    }
}

/// Drop the history table through a separate connection.
///
/// Every later query from a store open on `path` then fails inside SQLite.
pub async fn drop_history_table(path: &Path) {
    let options = SqliteConnectOptions::new().filename(path);
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
    sqlx::query("DROP TABLE telegram_history")
        .execute(&mut conn)
        .await
        .unwrap();
    conn.close().await.unwrap();
}
