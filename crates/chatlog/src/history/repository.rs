//! Repository for history database operations.

use sqlx::SqlitePool;

use super::models::MessageRecord;

/// Repository for `telegram_history` queries.
///
/// Each method is a single statement, so every call is atomic on its own.
/// Nothing here spans more than one public store call.
pub struct HistoryRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> HistoryRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one message and return its id.
    pub async fn insert(&self, user_id: i64, text: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO telegram_history (user_id, message)
            VALUES (?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(text)
        .fetch_one(self.pool)
        .await
    }

    /// Newest-first message texts for a user, at most `limit` rows.
    pub async fn recent_texts(&self, user_id: i64, limit: i64) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT message
            FROM telegram_history
            WHERE user_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await
    }

    /// Newest-first full records for a user, at most `limit` rows.
    pub async fn recent_records(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, sqlx::Error> {
        sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, user_id, message AS text, timestamp AS created_at
            FROM telegram_history
            WHERE user_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await
    }

    /// Count stored messages for a user.
    pub async fn count(&self, user_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM telegram_history WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool)
            .await
    }

    /// Delete every message for a user in one transaction.
    pub async fn delete_user(&self, user_id: i64) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM telegram_history WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::db::HistoryDb;

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let db = HistoryDb::in_memory().await.unwrap();
        let repo = HistoryRepository::new(db.pool());

        let first = repo.insert(1, "one").await.unwrap();
        let second = repo.insert(1, "two").await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let db = HistoryDb::in_memory().await.unwrap();
        let repo = HistoryRepository::new(db.pool());

        let first = repo.insert(1, "one").await.unwrap();
        repo.delete_user(1).await.unwrap();
        let second = repo.insert(1, "two").await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_recent_records_columns() {
        let db = HistoryDb::in_memory().await.unwrap();
        let repo = HistoryRepository::new(db.pool());

        let id = repo.insert(9, "ping").await.unwrap();
        let records = repo.recent_records(9, 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].user_id, 9);
        assert_eq!(records[0].text, "ping");
        assert!(records[0].created_at_utc().is_some());
    }

    #[tokio::test]
    async fn test_timestamp_tie_broken_by_id() {
        let db = HistoryDb::in_memory().await.unwrap();
        let repo = HistoryRepository::new(db.pool());

        // Same explicit timestamp for every row, so only id can order them
        for text in ["a", "b", "c"] {
            sqlx::query(
                "INSERT INTO telegram_history (user_id, message, timestamp) VALUES (3, ?, '2025-01-01 00:00:00.000')",
            )
            .bind(text)
            .execute(db.pool())
            .await
            .unwrap();
        }

        let texts = repo.recent_texts(3, 10).await.unwrap();
        assert_eq!(texts, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_count_and_delete() {
        let db = HistoryDb::in_memory().await.unwrap();
        let repo = HistoryRepository::new(db.pool());

        repo.insert(1, "a").await.unwrap();
        repo.insert(1, "b").await.unwrap();
        repo.insert(2, "c").await.unwrap();

        assert_eq!(repo.count(1).await.unwrap(), 2);
        assert_eq!(repo.delete_user(1).await.unwrap(), 2);
        assert_eq!(repo.count(1).await.unwrap(), 0);
        assert_eq!(repo.count(2).await.unwrap(), 1);
    }
}
