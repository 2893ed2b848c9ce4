//! Post error types.

use thiserror::Error;
use uuid::Uuid;

use postboard_shared::AppError;

use crate::storage::StorageError;

/// Post operation errors.
#[derive(Debug, Error)]
pub enum PostError {
    /// Post not found.
    #[error("post not found: {0}")]
    NotFound(Uuid),

    /// Attachment not found.
    #[error("attachment not found: {0}")]
    AttachmentNotFound(Uuid),

    /// The acting user does not own the post.
    #[error("user {actor_id} is not the owner of post {post_id}")]
    PermissionDenied {
        /// Post the action targeted.
        post_id: Uuid,
        /// User who attempted it.
        actor_id: Uuid,
    },

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("database error: {0}")]
    Database(String),
}

impl PostError {
    /// Create a database error.
    #[must_use]
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotFound(_) => Self::NotFound("Post not found".to_string()),
            PostError::AttachmentNotFound(_) => {
                Self::NotFound("Attachment not found".to_string())
            }
            PostError::PermissionDenied { .. } => Self::Forbidden(err.to_string()),
            PostError::Storage(e) if e.is_rejection() => Self::Validation(e.to_string()),
            PostError::Storage(e) => Self::ExternalService(e.to_string()),
            PostError::Database(msg) => Self::Database(msg),
        }
    }
}
