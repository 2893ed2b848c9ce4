//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod notification;
pub mod post;
pub mod reaction;
pub mod user;

pub use notification::NotificationRepository;
pub use post::{PostRepository, PostTransaction};
pub use reaction::ReactionRepository;
pub use user::UserRepository;
