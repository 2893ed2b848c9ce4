//! Post repository for database operations.
//!
//! Create and update run on a [`PostTransaction`] wrapping a `SeaORM`
//! `DatabaseTransaction`. Dropping it uncommitted rolls back.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{post_attachments, posts};
use postboard_core::post::{
    Attachment, NewAttachment, NewPost, Post, PostError, PostRepository as PostRepoTrait,
    PostTransaction as PostTxTrait,
};

/// Post repository implementation.
#[derive(Debug, Clone)]
pub struct PostRepository {
    db: DatabaseConnection,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl PostRepoTrait for PostRepository {
    type Transaction = PostTransaction;

    async fn begin(&self) -> Result<PostTransaction, PostError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PostError::database(e.to_string()))?;
        Ok(PostTransaction { txn })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, PostError> {
        let model = posts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PostError::database(e.to_string()))?;

        Ok(model.map(post_to_domain))
    }

    async fn find_attachment(&self, id: Uuid) -> Result<Option<Attachment>, PostError> {
        let model = post_attachments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PostError::database(e.to_string()))?;

        Ok(model.map(attachment_to_domain))
    }

    async fn list_attachments(&self, post_id: Uuid) -> Result<Vec<Attachment>, PostError> {
        let models = post_attachments::Entity::find()
            .filter(post_attachments::Column::PostId.eq(post_id))
            .order_by_desc(post_attachments::Column::CreatedAt)
            .order_by_desc(post_attachments::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| PostError::database(e.to_string()))?;

        Ok(models.into_iter().map(attachment_to_domain).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PostError> {
        // Attachment and reaction rows cascade
        let result = posts::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| PostError::database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Post writes inside one database transaction.
#[derive(Debug)]
pub struct PostTransaction {
    txn: DatabaseTransaction,
}

impl PostTxTrait for PostTransaction {
    async fn insert_post(&self, post: NewPost) -> Result<Post, PostError> {
        let now = Utc::now().into();
        let model = posts::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(post.user_id),
            group_id: Set(post.group_id),
            body: Set(post.body),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.txn)
        .await
        .map_err(|e| PostError::database(e.to_string()))?;

        Ok(post_to_domain(model))
    }

    async fn update_body(&self, post_id: Uuid, body: String) -> Result<Option<Post>, PostError> {
        let Some(model) = posts::Entity::find_by_id(post_id)
            .one(&self.txn)
            .await
            .map_err(|e| PostError::database(e.to_string()))?
        else {
            return Ok(None);
        };

        let mut active: posts::ActiveModel = model.into();
        active.body = Set(body);
        active.updated_at = Set(Utc::now().into());

        let model = active
            .update(&self.txn)
            .await
            .map_err(|e| PostError::database(e.to_string()))?;

        Ok(Some(post_to_domain(model)))
    }

    async fn attachments_in(
        &self,
        post_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Attachment>, PostError> {
        let models = post_attachments::Entity::find()
            .filter(post_attachments::Column::PostId.eq(post_id))
            .filter(post_attachments::Column::Id.is_in(ids.iter().copied()))
            .all(&self.txn)
            .await
            .map_err(|e| PostError::database(e.to_string()))?;

        Ok(models.into_iter().map(attachment_to_domain).collect())
    }

    async fn delete_attachment(&self, id: Uuid) -> Result<(), PostError> {
        post_attachments::Entity::delete_by_id(id)
            .exec(&self.txn)
            .await
            .map_err(|e| PostError::database(e.to_string()))?;

        Ok(())
    }

    async fn insert_attachment(&self, attachment: NewAttachment) -> Result<Attachment, PostError> {
        let model = post_attachments::ActiveModel {
            id: Set(Uuid::now_v7()),
            post_id: Set(attachment.post_id),
            name: Set(attachment.name),
            path: Set(attachment.path),
            mime: Set(attachment.mime),
            size: Set(attachment.size),
            created_by: Set(attachment.created_by),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.txn)
        .await
        .map_err(|e| PostError::database(e.to_string()))?;

        Ok(attachment_to_domain(model))
    }

    async fn commit(self) -> Result<(), PostError> {
        self.txn
            .commit()
            .await
            .map_err(|e| PostError::database(e.to_string()))
    }

    async fn rollback(self) -> Result<(), PostError> {
        self.txn
            .rollback()
            .await
            .map_err(|e| PostError::database(e.to_string()))
    }
}

/// Convert database model to domain model.
fn post_to_domain(model: posts::Model) -> Post {
    Post {
        id: model.id,
        user_id: model.user_id,
        group_id: model.group_id,
        body: model.body,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn attachment_to_domain(model: post_attachments::Model) -> Attachment {
    Attachment {
        id: model.id,
        post_id: model.post_id,
        name: model.name,
        path: model.path,
        mime: model.mime,
        size: model.size,
        created_by: model.created_by,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
