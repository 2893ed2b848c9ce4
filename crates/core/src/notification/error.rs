//! Notification error types.

use thiserror::Error;

use postboard_shared::AppError;

/// Notification delivery errors.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Mail could not be built or sent.
    #[error("mail delivery failed: {0}")]
    Mail(String),

    /// Notification row could not be stored or read.
    #[error("database error: {0}")]
    Database(String),
}

impl NotificationError {
    /// Create a mail error.
    #[must_use]
    pub fn mail(msg: impl Into<String>) -> Self {
        Self::Mail(msg.into())
    }

    /// Create a database error.
    #[must_use]
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::Mail(msg) => Self::ExternalService(msg),
            NotificationError::Database(msg) => Self::Database(msg),
        }
    }
}
