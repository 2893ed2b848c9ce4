//! Post and attachment types.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Blob-store prefix holding every file of a post.
#[must_use]
pub fn storage_prefix(post_id: Uuid) -> String {
    format!("attachments/{post_id}")
}

/// Post domain model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Unique identifier.
    pub id: Uuid,
    /// Owner.
    pub user_id: Uuid,
    /// Group the post was published in, if any.
    pub group_id: Option<Uuid>,
    /// Post text.
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Attachment domain model. Rows are only ever inserted or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Unique identifier.
    pub id: Uuid,
    /// Parent post.
    pub post_id: Uuid,
    /// Original client filename, used as the download name.
    pub name: String,
    /// Path in the blob store.
    pub path: String,
    /// MIME type.
    pub mime: String,
    /// File size in bytes.
    pub size: i64,
    /// User who uploaded the file.
    pub created_by: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct FilePayload {
    /// Original filename.
    pub filename: String,
    /// MIME type declared by the client. The stored type is detected from the bytes.
    pub content_type: String,
    /// File content.
    pub bytes: Bytes,
}

impl FilePayload {
    /// Create a payload.
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Size in bytes, saturating at `i64::MAX`.
    #[must_use]
    pub fn size(&self) -> i64 {
        i64::try_from(self.bytes.len()).unwrap_or(i64::MAX)
    }
}

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    /// Acting user, who becomes the owner.
    pub user_id: Uuid,
    /// Optional group.
    pub group_id: Option<Uuid>,
    /// Post text.
    pub body: String,
    /// Files to attach.
    pub attachments: Vec<FilePayload>,
}

/// Input for updating a post.
#[derive(Debug, Clone)]
pub struct UpdatePostInput {
    /// Post to update.
    pub post_id: Uuid,
    /// Acting user, recorded as creator of new attachments.
    pub actor_id: Uuid,
    /// New post text.
    pub body: String,
    /// Attachments to remove. Ids of other posts are ignored.
    pub deleted_attachment_ids: Vec<Uuid>,
    /// Files to attach.
    pub attachments: Vec<FilePayload>,
}

/// Row data for a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Owner.
    pub user_id: Uuid,
    /// Optional group.
    pub group_id: Option<Uuid>,
    /// Post text.
    pub body: String,
}

/// Row data for a new attachment.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    /// Parent post.
    pub post_id: Uuid,
    /// Original filename.
    pub name: String,
    /// Stored path.
    pub path: String,
    /// MIME type.
    pub mime: String,
    /// Size in bytes.
    pub size: i64,
    /// Uploader.
    pub created_by: Uuid,
}

/// Result of a create or update.
#[derive(Debug, Clone)]
pub struct SavedPost {
    /// The post as persisted.
    pub post: Post,
    /// Attachments added by this call.
    pub added: Vec<Attachment>,
    /// Attachments removed by this call.
    pub removed: Vec<Attachment>,
}

/// File content ready to send to the client.
#[derive(Debug, Clone)]
pub struct AttachmentDownload {
    /// Download filename.
    pub name: String,
    /// MIME type.
    pub mime: String,
    /// File content.
    pub content: Bytes,
}
