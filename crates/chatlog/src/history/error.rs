//! History store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for history store operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors that can occur during history store operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The database could not be opened or its schema could not be ensured.
    #[error("history store unavailable at {location}: {message}")]
    StoreUnavailable {
        location: PathBuf,
        message: String,
        #[source]
        source: Option<sqlx::Error>,
    },

    /// `initialize` was called on a store that is already open.
    #[error("history store already open at {0}")]
    AlreadyInitialized(PathBuf),

    /// A data operation was attempted before `initialize` or after `shutdown`.
    #[error("history store is not initialized")]
    NotInitialized,

    /// An append or purge could not be completed.
    #[error("failed to {operation} history for user {user_id}: {source}")]
    WriteFailure {
        operation: &'static str,
        user_id: i64,
        #[source]
        source: sqlx::Error,
    },

    /// Stored history could not be read.
    #[error("failed to read history for user {user_id}: {source}")]
    ReadFailure {
        user_id: i64,
        #[source]
        source: sqlx::Error,
    },
}

impl HistoryError {
    pub(crate) fn unavailable(
        location: impl Into<PathBuf>,
        message: impl Into<String>,
        source: Option<sqlx::Error>,
    ) -> Self {
        Self::StoreUnavailable {
            location: location.into(),
            message: message.into(),
            source,
        }
    }

    pub(crate) fn write(operation: &'static str, user_id: i64, source: sqlx::Error) -> Self {
        Self::WriteFailure {
            operation,
            user_id,
            source,
        }
    }

    pub(crate) fn read(user_id: i64, source: sqlx::Error) -> Self {
        Self::ReadFailure { user_id, source }
    }

    /// Whether the error means the caller used the store outside its open state.
    pub fn is_lifecycle_error(&self) -> bool {
        matches!(self, Self::NotInitialized | Self::AlreadyInitialized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HistoryError::NotInitialized;
        assert_eq!(err.to_string(), "history store is not initialized");

        let err = HistoryError::unavailable("/tmp/x.db", "connecting to database", None);
        assert_eq!(
            err.to_string(),
            "history store unavailable at /tmp/x.db: connecting to database"
        );
    }

    #[test]
    fn test_write_failure_carries_user() {
        let err = HistoryError::write("purge", 42, sqlx::Error::PoolClosed);
        let text = err.to_string();
        assert!(text.contains("purge"));
        assert!(text.contains("42"));
        assert!(!err.is_lifecycle_error());
    }

    #[test]
    fn test_lifecycle_errors() {
        assert!(HistoryError::NotInitialized.is_lifecycle_error());
        assert!(HistoryError::AlreadyInitialized(PathBuf::from("a.db")).is_lifecycle_error());
    }
}
