//! Shared errors, auth tokens, mail transport and configuration for Postboard.
//!
//! This crate provides common pieces used across all other crates:
//! - Application-wide error types
//! - JWT claims and token validation
//! - SMTP email transport
//! - Configuration management

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;

pub use auth::Claims;
pub use config::{AppConfig, EmailConfig, StorageSettings};
pub use email::{EmailError, EmailService};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
