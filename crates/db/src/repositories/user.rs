//! User and group lookups.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use uuid::Uuid;

use crate::entities::{groups, users};
use postboard_core::notification::{GroupRef, Recipient};

/// User repository.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, name: &str, email: &str) -> Result<users::Model, DbErr> {
        users::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
    }

    /// Loads a user as a notification recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_recipient(&self, id: Uuid) -> Result<Option<Recipient>, DbErr> {
        Ok(self.find_by_id(id).await?.map(|user| Recipient {
            id: user.id,
            email: user.email,
            name: user.name,
        }))
    }

    /// Creates a group owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_group(
        &self,
        name: &str,
        slug: &str,
        owner_id: Uuid,
    ) -> Result<groups::Model, DbErr> {
        groups::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            owner_id: Set(owner_id),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
    }

    /// Loads a group for use in notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_group_ref(&self, id: Uuid) -> Result<Option<GroupRef>, DbErr> {
        let group = groups::Entity::find_by_id(id).one(&self.db).await?;
        Ok(group.map(|g| GroupRef {
            name: g.name,
            slug: g.slug,
        }))
    }
}
