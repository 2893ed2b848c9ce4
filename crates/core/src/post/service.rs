//! Post service with transactional attachment handling.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::PostError;
use super::rollback::FileRollback;
use super::types::{
    Attachment, AttachmentDownload, CreatePostInput, FilePayload, NewAttachment, NewPost, Post,
    SavedPost, UpdatePostInput, storage_prefix,
};
use crate::storage::{BlobStore, StorageError, UploadRequest, detect_content_type};

/// Repository trait for post persistence.
pub trait PostRepository: Send + Sync {
    /// Unit of work used by create and update.
    type Transaction: PostTransaction;

    /// Start a transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Transaction, PostError>> + Send;

    /// Find a post by ID.
    fn find_by_id(&self, id: Uuid) -> impl Future<Output = Result<Option<Post>, PostError>> + Send;

    /// Find an attachment by ID.
    fn find_attachment(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Attachment>, PostError>> + Send;

    /// List the attachments of a post, newest first.
    fn list_attachments(
        &self,
        post_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Attachment>, PostError>> + Send;

    /// Delete a post. Attachment rows go with it.
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<bool, PostError>> + Send;
}

/// Writes performed inside one database transaction.
///
/// Dropping a transaction without calling [`PostTransaction::commit`]
/// discards its writes.
pub trait PostTransaction: Send + Sync {
    /// Insert a post.
    fn insert_post(&self, post: NewPost) -> impl Future<Output = Result<Post, PostError>> + Send;

    /// Replace the body of a post. Returns `None` when the post does not exist.
    fn update_body(
        &self,
        post_id: Uuid,
        body: String,
    ) -> impl Future<Output = Result<Option<Post>, PostError>> + Send;

    /// Load the attachments among `ids` that belong to `post_id`.
    fn attachments_in(
        &self,
        post_id: Uuid,
        ids: &[Uuid],
    ) -> impl Future<Output = Result<Vec<Attachment>, PostError>> + Send;

    /// Delete an attachment row.
    fn delete_attachment(&self, id: Uuid) -> impl Future<Output = Result<(), PostError>> + Send;

    /// Insert an attachment row.
    fn insert_attachment(
        &self,
        attachment: NewAttachment,
    ) -> impl Future<Output = Result<Attachment, PostError>> + Send;

    /// Make every write visible.
    fn commit(self) -> impl Future<Output = Result<(), PostError>> + Send;

    /// Discard every write.
    fn rollback(self) -> impl Future<Output = Result<(), PostError>> + Send;
}

/// Post service.
pub struct PostService<R: PostRepository, B: BlobStore> {
    repo: Arc<R>,
    blobs: Arc<B>,
}

impl<R: PostRepository, B: BlobStore> PostService<R, B> {
    /// Create a new post service.
    pub fn new(repo: Arc<R>, blobs: Arc<B>) -> Self {
        Self { repo, blobs }
    }

    /// Create a post and store its attachments.
    ///
    /// Either the post, every attachment row and every file exist afterwards,
    /// or none of them do.
    pub async fn create(&self, input: CreatePostInput) -> Result<SavedPost, PostError> {
        let tx = self.repo.begin().await?;
        let mut files = FileRollback::new(Arc::clone(&self.blobs));

        let result = self.create_rows(&tx, &mut files, input).await;
        let saved = self.finish(tx, files, result).await?;

        info!(
            post_id = %saved.post.id,
            user_id = %saved.post.user_id,
            attachments = saved.added.len(),
            "Post created"
        );
        Ok(saved)
    }

    /// Update a post body, delete the listed attachments and store new ones.
    ///
    /// Deleted ids that belong to another post are ignored. Files behind
    /// deleted rows are removed once the transaction commits.
    pub async fn update(&self, input: UpdatePostInput) -> Result<SavedPost, PostError> {
        let tx = self.repo.begin().await?;
        let mut files = FileRollback::new(Arc::clone(&self.blobs));

        let result = self.update_rows(&tx, &mut files, input).await;
        let saved = self.finish(tx, files, result).await?;

        for attachment in &saved.removed {
            if let Err(e) = self.blobs.delete(&attachment.path).await {
                warn!(
                    attachment_id = %attachment.id,
                    path = %attachment.path,
                    error = %e,
                    "Failed to remove file of deleted attachment"
                );
            }
        }

        info!(
            post_id = %saved.post.id,
            added = saved.added.len(),
            removed = saved.removed.len(),
            "Post updated"
        );
        Ok(saved)
    }

    /// Get a post by ID.
    pub async fn get(&self, post_id: Uuid) -> Result<Post, PostError> {
        self.repo
            .find_by_id(post_id)
            .await?
            .ok_or(PostError::NotFound(post_id))
    }

    /// List the attachments of an existing post.
    pub async fn list_attachments(&self, post_id: Uuid) -> Result<Vec<Attachment>, PostError> {
        self.get(post_id).await?;
        self.repo.list_attachments(post_id).await
    }

    /// Load an attachment's content for download.
    pub async fn download(&self, attachment_id: Uuid) -> Result<AttachmentDownload, PostError> {
        let attachment = self
            .repo
            .find_attachment(attachment_id)
            .await?
            .ok_or(PostError::AttachmentNotFound(attachment_id))?;

        let content = self
            .blobs
            .read(&attachment.path)
            .await
            .map_err(|e| match e {
                StorageError::NotFound { .. } => {
                    warn!(
                        attachment_id = %attachment_id,
                        path = %attachment.path,
                        "Attachment row has no file"
                    );
                    PostError::AttachmentNotFound(attachment_id)
                }
                other => PostError::Storage(other),
            })?;

        Ok(AttachmentDownload {
            name: attachment.name,
            mime: attachment.mime,
            content,
        })
    }

    /// Delete a post. Only its owner may do so.
    pub async fn delete(&self, post_id: Uuid, actor_id: Uuid) -> Result<(), PostError> {
        let post = self.get(post_id).await?;
        if post.user_id != actor_id {
            warn!(post_id = %post_id, actor_id = %actor_id, "Rejected post deletion by non-owner");
            return Err(PostError::PermissionDenied { post_id, actor_id });
        }

        if !self.repo.delete(post_id).await? {
            return Err(PostError::NotFound(post_id));
        }

        match self.blobs.delete_prefix(&storage_prefix(post_id)).await {
            Ok(count) => info!(post_id = %post_id, files = count, "Post deleted"),
            Err(e) => warn!(
                post_id = %post_id,
                error = %e,
                "Post deleted but its files could not be removed"
            ),
        }
        Ok(())
    }

    async fn create_rows(
        &self,
        tx: &R::Transaction,
        files: &mut FileRollback<B>,
        input: CreatePostInput,
    ) -> Result<SavedPost, PostError> {
        let post = tx
            .insert_post(NewPost {
                user_id: input.user_id,
                group_id: input.group_id,
                body: input.body,
            })
            .await?;

        let added = self
            .attach_files(tx, files, post.id, input.user_id, input.attachments)
            .await?;

        Ok(SavedPost {
            post,
            added,
            removed: Vec::new(),
        })
    }

    async fn update_rows(
        &self,
        tx: &R::Transaction,
        files: &mut FileRollback<B>,
        input: UpdatePostInput,
    ) -> Result<SavedPost, PostError> {
        let post = tx
            .update_body(input.post_id, input.body)
            .await?
            .ok_or(PostError::NotFound(input.post_id))?;

        let removed = if input.deleted_attachment_ids.is_empty() {
            Vec::new()
        } else {
            tx.attachments_in(post.id, &input.deleted_attachment_ids)
                .await?
        };
        for attachment in &removed {
            tx.delete_attachment(attachment.id).await?;
        }

        let added = self
            .attach_files(tx, files, post.id, input.actor_id, input.attachments)
            .await?;

        Ok(SavedPost {
            post,
            added,
            removed,
        })
    }

    async fn attach_files(
        &self,
        tx: &R::Transaction,
        files: &mut FileRollback<B>,
        post_id: Uuid,
        created_by: Uuid,
        payloads: Vec<FilePayload>,
    ) -> Result<Vec<Attachment>, PostError> {
        let prefix = storage_prefix(post_id);
        let mut added = Vec::with_capacity(payloads.len());

        for payload in payloads {
            let size = payload.size();
            let mime =
                detect_content_type(&payload.filename, &payload.bytes, &payload.content_type);
            if mime != payload.content_type {
                debug!(
                    filename = %payload.filename,
                    declared = %payload.content_type,
                    detected = %mime,
                    "Declared content type replaced"
                );
            }
            let request = UploadRequest {
                prefix: prefix.clone(),
                filename: payload.filename.clone(),
                content_type: mime.clone(),
                bytes: payload.bytes,
            };

            let path = self.blobs.store(&request).await?;
            files.track(path.clone());

            let attachment = tx
                .insert_attachment(NewAttachment {
                    post_id,
                    name: payload.filename,
                    path,
                    mime,
                    size,
                    created_by,
                })
                .await?;
            added.push(attachment);
        }

        Ok(added)
    }

    /// Commit on success. On failure remove the written files, then roll back.
    async fn finish<T>(
        &self,
        tx: R::Transaction,
        files: FileRollback<B>,
        result: Result<T, PostError>,
    ) -> Result<T, PostError> {
        match result {
            Ok(value) => match tx.commit().await {
                Ok(()) => {
                    files.disarm();
                    Ok(value)
                }
                Err(e) => {
                    files.unwind().await;
                    Err(e)
                }
            },
            Err(e) => {
                files.unwind().await;
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Transaction rollback failed");
                }
                Err(e)
            }
        }
    }
}
