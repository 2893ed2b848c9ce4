//! Blob storage for attachment files using Apache OpenDAL.
//!
//! This module provides vendor-agnostic object storage with support for:
//! - Local filesystem (the "public" disk, default)
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3, DigitalOcean Spaces
//! - In-memory (tests)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         BlobStore                                │
//! │        store / read / delete / delete_prefix by path             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                      Apache OpenDAL                              │
//! │ op.write("key", data)      │ op.list_with("dir/").recursive()    │
//! │ op.read("key")             │ op.delete("key")                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes are not transactional with the database. Callers that need
//! all-or-nothing semantics pair them with a compensating delete.

mod config;
mod error;
mod mime;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use mime::{OCTET_STREAM, detect_content_type};
pub use service::{BlobStore, StorageService, UploadRequest};
