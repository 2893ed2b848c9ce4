//! Notification repository: the database delivery channel.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::notifications;
use postboard_core::notification::{
    DatabaseChannel, NewNotification, NotificationError, StoredNotification,
};

/// Notification repository implementation.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    db: DatabaseConnection,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// List a user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<StoredNotification>, NotificationError> {
        let models = notifications::Entity::find()
            .filter(notifications::Column::NotifiableId.eq(user_id))
            .order_by_desc(notifications::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| NotificationError::database(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }
}

impl DatabaseChannel for NotificationRepository {
    async fn store(
        &self,
        notification: NewNotification,
    ) -> Result<StoredNotification, NotificationError> {
        let model = notifications::ActiveModel {
            id: Set(Uuid::now_v7()),
            kind: Set(notification.kind),
            notifiable_id: Set(notification.notifiable_id),
            data: Set(notification.data),
            read_at: Set(None),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| NotificationError::database(e.to_string()))?;

        Ok(to_domain(model))
    }
}

fn to_domain(model: notifications::Model) -> StoredNotification {
    StoredNotification {
        id: model.id,
        notifiable_id: model.notifiable_id,
        kind: model.kind,
        data: model.data,
        read_at: model.read_at.map(|t| t.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
