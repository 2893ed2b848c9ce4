//! Reaction repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

use crate::entities::{post_reactions, posts, sea_orm_active_enums::PostReactionType};
use postboard_core::reaction::{
    NewReaction, Reaction, ReactionError, ReactionRepository as ReactionRepoTrait, ReactionType,
};

/// Reaction repository implementation.
#[derive(Debug, Clone)]
pub struct ReactionRepository {
    db: DatabaseConnection,
}

impl ReactionRepository {
    /// Create a new reaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ReactionRepoTrait for ReactionRepository {
    async fn post_exists(&self, post_id: Uuid) -> Result<bool, ReactionError> {
        let count = posts::Entity::find_by_id(post_id)
            .count(&self.db)
            .await
            .map_err(|e| ReactionError::database(e.to_string()))?;

        Ok(count > 0)
    }

    async fn find_by_user_and_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<Option<Reaction>, ReactionError> {
        let model = post_reactions::Entity::find()
            .filter(post_reactions::Column::UserId.eq(user_id))
            .filter(post_reactions::Column::PostId.eq(post_id))
            .one(&self.db)
            .await
            .map_err(|e| ReactionError::database(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn create(&self, reaction: NewReaction) -> Result<Reaction, ReactionError> {
        let model = post_reactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            post_id: Set(reaction.post_id),
            user_id: Set(reaction.user_id),
            reaction_type: Set(to_db_reaction_type(reaction.reaction_type)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_insert_error(&e, &reaction))?;

        Ok(to_domain(model))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ReactionError> {
        let result = post_reactions::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| ReactionError::database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, ReactionError> {
        post_reactions::Entity::find()
            .filter(post_reactions::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(|e| ReactionError::database(e.to_string()))
    }
}

/// UNIQUE(post_id, user_id) violations mean a concurrent toggle won.
fn map_insert_error(err: &DbErr, reaction: &NewReaction) -> ReactionError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ReactionError::AlreadyReacted {
            post_id: reaction.post_id,
            user_id: reaction.user_id,
        },
        _ => ReactionError::database(err.to_string()),
    }
}

/// Convert domain reaction type to database enum.
fn to_db_reaction_type(t: ReactionType) -> PostReactionType {
    match t {
        ReactionType::Like => PostReactionType::Like,
        ReactionType::Love => PostReactionType::Love,
        ReactionType::Laugh => PostReactionType::Laugh,
        ReactionType::Wow => PostReactionType::Wow,
        ReactionType::Sad => PostReactionType::Sad,
        ReactionType::Angry => PostReactionType::Angry,
    }
}

/// Convert database reaction type to domain enum.
fn from_db_reaction_type(t: PostReactionType) -> ReactionType {
    match t {
        PostReactionType::Like => ReactionType::Like,
        PostReactionType::Love => ReactionType::Love,
        PostReactionType::Laugh => ReactionType::Laugh,
        PostReactionType::Wow => ReactionType::Wow,
        PostReactionType::Sad => ReactionType::Sad,
        PostReactionType::Angry => ReactionType::Angry,
    }
}

fn to_domain(model: post_reactions::Model) -> Reaction {
    Reaction {
        id: model.id,
        post_id: model.post_id,
        user_id: model.user_id,
        reaction_type: from_db_reaction_type(model.reaction_type),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_type_mapping_is_lossless() {
        for t in ReactionType::ALL {
            assert_eq!(from_db_reaction_type(to_db_reaction_type(t)), t);
        }
    }

    #[test]
    fn test_non_unique_errors_stay_database_errors() {
        let reaction = NewReaction {
            post_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            reaction_type: ReactionType::Like,
        };
        let err = DbErr::Custom("connection reset".to_string());

        assert!(matches!(
            map_insert_error(&err, &reaction),
            ReactionError::Database(_)
        ));
    }
}
