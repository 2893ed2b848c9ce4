//! Core business logic for Postboard.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence and delivery are reached through traits implemented elsewhere.
//!
//! # Modules
//!
//! - `storage` - Blob storage for attachment files
//! - `post` - Post lifecycle with transactional attachment uploads
//! - `reaction` - Per-user reaction toggling
//! - `notification` - Mail and database notifications

pub mod notification;
pub mod post;
pub mod reaction;
pub mod storage;
