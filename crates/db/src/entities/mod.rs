//! `SeaORM` entities.

pub mod groups;
pub mod notifications;
pub mod post_attachments;
pub mod post_reactions;
pub mod posts;
pub mod sea_orm_active_enums;
pub mod users;

pub mod prelude {
    //! Entity re-exports.

    pub use super::groups::Entity as Groups;
    pub use super::notifications::Entity as Notifications;
    pub use super::post_attachments::Entity as PostAttachments;
    pub use super::post_reactions::Entity as PostReactions;
    pub use super::posts::Entity as Posts;
    pub use super::users::Entity as Users;
}
