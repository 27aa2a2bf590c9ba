//! Error types for the preference service and notification pipeline.

use axum::http::StatusCode;

/// Top-level error type for notify-prefs.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// No preference record exists for the requested user.
    #[error("no preferences for user {0}")]
    NotFound(i64),

    /// Path or payload failed to parse or typecheck.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Storage layer failure outside of SQLite itself (lock poisoning, paths).
    #[error("storage error: {0}")]
    Storage(String),

    /// SQLite statement or connection error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The notification queue is at capacity and the overflow policy rejects.
    #[error("notification queue is full (capacity {capacity})")]
    QueueFull {
        /// Configured queue capacity.
        capacity: usize,
    },

    /// The notification worker is gone; nothing will drain the queue.
    #[error("notification queue is closed")]
    QueueClosed,

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NotifyError {
    /// HTTP status used when this error reaches a caller.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::QueueFull { .. } | Self::QueueClosed => StatusCode::SERVICE_UNAVAILABLE,
            Self::Storage(_) | Self::Sqlite(_) | Self::Config(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, NotifyError>;
