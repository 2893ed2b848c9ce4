//! Reaction error types.

use thiserror::Error;
use uuid::Uuid;

use postboard_shared::AppError;

/// Reaction operation errors.
#[derive(Debug, Error)]
pub enum ReactionError {
    /// The post does not exist.
    #[error("post not found: {0}")]
    PostNotFound(Uuid),

    /// Unknown reaction type name.
    #[error("invalid reaction type: {0}")]
    InvalidType(String),

    /// A concurrent request already stored a reaction for this user and post.
    #[error("user {user_id} already reacted to post {post_id}")]
    AlreadyReacted {
        /// Post reacted to.
        post_id: Uuid,
        /// Reacting user.
        user_id: Uuid,
    },

    /// Repository operation failed.
    #[error("database error: {0}")]
    Database(String),
}

impl ReactionError {
    /// Create a database error.
    #[must_use]
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }
}

impl From<ReactionError> for AppError {
    fn from(err: ReactionError) -> Self {
        match err {
            ReactionError::PostNotFound(_) => Self::NotFound("Post not found".to_string()),
            ReactionError::InvalidType(_) => Self::Validation(err.to_string()),
            ReactionError::AlreadyReacted { .. } => Self::Conflict(err.to_string()),
            ReactionError::Database(msg) => Self::Database(msg),
        }
    }
}
