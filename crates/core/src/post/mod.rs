//! Posts and their attachments.
//!
//! This module provides business logic for the post resource including:
//! - Creating a post together with its uploaded files
//! - Updating a post while deleting and adding attachments
//! - Attachment download
//! - Owner-only deletion
//!
//! Create and update run in one database transaction. Files written to the
//! blob store during a failed call are removed again before the error is
//! returned.

mod error;
mod rollback;
mod service;
mod types;


pub use error::PostError;
pub use service::{PostRepository, PostService, PostTransaction};
pub use types::{
    Attachment, AttachmentDownload, CreatePostInput, FilePayload, NewAttachment, NewPost, Post,
    SavedPost, UpdatePostInput, storage_prefix,
};
