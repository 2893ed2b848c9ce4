//! Reaction toggle service.

use std::future::Future;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::error::ReactionError;
use super::types::{NewReaction, Reaction, ReactionType, ToggleOutcome};

/// Repository trait for reaction persistence.
pub trait ReactionRepository: Send + Sync {
    /// Whether a post exists.
    fn post_exists(&self, post_id: Uuid)
    -> impl Future<Output = Result<bool, ReactionError>> + Send;

    /// Find a user's reaction on a post.
    fn find_by_user_and_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> impl Future<Output = Result<Option<Reaction>, ReactionError>> + Send;

    /// Insert a reaction.
    ///
    /// Returns [`ReactionError::AlreadyReacted`] when the user already has one.
    fn create(
        &self,
        reaction: NewReaction,
    ) -> impl Future<Output = Result<Reaction, ReactionError>> + Send;

    /// Delete a reaction.
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<bool, ReactionError>> + Send;

    /// Count every reaction on a post.
    fn count_for_post(
        &self,
        post_id: Uuid,
    ) -> impl Future<Output = Result<u64, ReactionError>> + Send;
}

/// Reaction service.
pub struct ReactionService<R: ReactionRepository> {
    repo: Arc<R>,
}

impl<R: ReactionRepository> ReactionService<R> {
    /// Create a new reaction service.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Add the user's reaction, or remove it if one exists.
    ///
    /// An existing reaction is removed even when `reaction_type` differs.
    pub async fn toggle(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        reaction_type: ReactionType,
    ) -> Result<ToggleOutcome, ReactionError> {
        if !self.repo.post_exists(post_id).await? {
            return Err(ReactionError::PostNotFound(post_id));
        }

        let has_reaction = match self.repo.find_by_user_and_post(user_id, post_id).await? {
            Some(existing) => {
                self.repo.delete(existing.id).await?;
                info!(
                    post_id = %post_id,
                    user_id = %user_id,
                    reaction = %existing.reaction_type,
                    "Reaction removed"
                );
                false
            }
            None => {
                self.repo
                    .create(NewReaction {
                        post_id,
                        user_id,
                        reaction_type,
                    })
                    .await?;
                info!(
                    post_id = %post_id,
                    user_id = %user_id,
                    reaction = %reaction_type,
                    "Reaction added"
                );
                true
            }
        };

        Ok(ToggleOutcome {
            num_of_reactions: self.repo.count_for_post(post_id).await?,
            current_user_has_reaction: has_reaction,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    struct MockReactionRepository {
        posts: Mutex<HashSet<Uuid>>,
        reactions: Mutex<Vec<Reaction>>,
        /// Simulates a concurrent insert the lookup did not see.
        stale_reads: bool,
    }

    impl MockReactionRepository {
        fn with_post(post_id: Uuid) -> Self {
            let repo = Self::default();
            repo.posts.lock().unwrap().insert(post_id);
            repo
        }
    }

    impl ReactionRepository for MockReactionRepository {
        async fn post_exists(&self, post_id: Uuid) -> Result<bool, ReactionError> {
            Ok(self.posts.lock().unwrap().contains(&post_id))
        }

        async fn find_by_user_and_post(
            &self,
            user_id: Uuid,
            post_id: Uuid,
        ) -> Result<Option<Reaction>, ReactionError> {
            if self.stale_reads {
                return Ok(None);
            }
            Ok(self
                .reactions
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.user_id == user_id && r.post_id == post_id)
                .cloned())
        }

        async fn create(&self, reaction: NewReaction) -> Result<Reaction, ReactionError> {
            let mut reactions = self.reactions.lock().unwrap();
            if reactions
                .iter()
                .any(|r| r.user_id == reaction.user_id && r.post_id == reaction.post_id)
            {
                return Err(ReactionError::AlreadyReacted {
                    post_id: reaction.post_id,
                    user_id: reaction.user_id,
                });
            }
            let created = Reaction {
                id: Uuid::new_v4(),
                post_id: reaction.post_id,
                user_id: reaction.user_id,
                reaction_type: reaction.reaction_type,
                created_at: Utc::now(),
            };
            reactions.push(created.clone());
            Ok(created)
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ReactionError> {
            let mut reactions = self.reactions.lock().unwrap();
            let before = reactions.len();
            reactions.retain(|r| r.id != id);
            Ok(reactions.len() < before)
        }

        async fn count_for_post(&self, post_id: Uuid) -> Result<u64, ReactionError> {
            let reactions = self.reactions.lock().unwrap();
            Ok(reactions.iter().filter(|r| r.post_id == post_id).count() as u64)
        }
    }

    #[tokio::test]
    async fn test_toggle_adds_then_removes() {
        let post_id = Uuid::new_v4();
        let service = ReactionService::new(Arc::new(MockReactionRepository::with_post(post_id)));
        let user_id = Uuid::new_v4();

        let first = service
            .toggle(user_id, post_id, ReactionType::Like)
            .await
            .unwrap();
        assert_eq!(
            first,
            ToggleOutcome {
                num_of_reactions: 1,
                current_user_has_reaction: true
            }
        );

        let second = service
            .toggle(user_id, post_id, ReactionType::Like)
            .await
            .unwrap();
        assert_eq!(
            second,
            ToggleOutcome {
                num_of_reactions: 0,
                current_user_has_reaction: false
            }
        );
    }

    #[tokio::test]
    async fn test_toggle_with_different_type_removes() {
        let post_id = Uuid::new_v4();
        let service = ReactionService::new(Arc::new(MockReactionRepository::with_post(post_id)));
        let user_id = Uuid::new_v4();

        service
            .toggle(user_id, post_id, ReactionType::Like)
            .await
            .unwrap();
        let outcome = service
            .toggle(user_id, post_id, ReactionType::Angry)
            .await
            .unwrap();

        assert!(!outcome.current_user_has_reaction);
        assert_eq!(outcome.num_of_reactions, 0);
    }

    #[tokio::test]
    async fn test_count_includes_other_users() {
        let post_id = Uuid::new_v4();
        let service = ReactionService::new(Arc::new(MockReactionRepository::with_post(post_id)));

        service
            .toggle(Uuid::new_v4(), post_id, ReactionType::Love)
            .await
            .unwrap();
        let outcome = service
            .toggle(Uuid::new_v4(), post_id, ReactionType::Wow)
            .await
            .unwrap();

        assert_eq!(outcome.num_of_reactions, 2);
        assert!(outcome.current_user_has_reaction);
    }

    #[tokio::test]
    async fn test_toggle_on_unknown_post() {
        let service = ReactionService::new(Arc::new(MockReactionRepository::default()));
        let post_id = Uuid::new_v4();

        let err = service
            .toggle(Uuid::new_v4(), post_id, ReactionType::Like)
            .await
            .unwrap_err();
        assert!(matches!(err, ReactionError::PostNotFound(id) if id == post_id));
    }

    #[tokio::test]
    async fn test_concurrent_insert_surfaces_conflict() {
        let post_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let repo = MockReactionRepository {
            stale_reads: true,
            ..MockReactionRepository::with_post(post_id)
        };
        let service = ReactionService::new(Arc::new(repo));

        service
            .toggle(user_id, post_id, ReactionType::Like)
            .await
            .unwrap();
        let err = service
            .toggle(user_id, post_id, ReactionType::Like)
            .await
            .unwrap_err();

        assert!(matches!(err, ReactionError::AlreadyReacted { .. }));
        assert_eq!(postboard_shared::AppError::from(err).status_code(), 409);
    }
}

#[cfg(test)]
mod property_tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;
    use proptest::prelude::*;

    use super::*;

    #[derive(Default)]
    struct CountingRepository {
        reactions: Mutex<HashMap<Uuid, Reaction>>,
    }

    impl ReactionRepository for CountingRepository {
        async fn post_exists(&self, _post_id: Uuid) -> Result<bool, ReactionError> {
            Ok(true)
        }

        async fn find_by_user_and_post(
            &self,
            user_id: Uuid,
            post_id: Uuid,
        ) -> Result<Option<Reaction>, ReactionError> {
            Ok(self
                .reactions
                .lock()
                .unwrap()
                .values()
                .find(|r| r.user_id == user_id && r.post_id == post_id)
                .cloned())
        }

        async fn create(&self, reaction: NewReaction) -> Result<Reaction, ReactionError> {
            let created = Reaction {
                id: Uuid::new_v4(),
                post_id: reaction.post_id,
                user_id: reaction.user_id,
                reaction_type: reaction.reaction_type,
                created_at: Utc::now(),
            };
            self.reactions
                .lock()
                .unwrap()
                .insert(created.id, created.clone());
            Ok(created)
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ReactionError> {
            Ok(self.reactions.lock().unwrap().remove(&id).is_some())
        }

        async fn count_for_post(&self, post_id: Uuid) -> Result<u64, ReactionError> {
            let reactions = self.reactions.lock().unwrap();
            Ok(reactions.values().filter(|r| r.post_id == post_id).count() as u64)
        }
    }

    proptest! {
        /// After any toggle sequence, a user has a reaction iff they toggled an odd number of times.
        #[test]
        fn prop_toggle_parity(steps in prop::collection::vec((0usize..4, 0usize..6), 1..40)) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let users: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
            let post_id = Uuid::new_v4();
            let service = ReactionService::new(Arc::new(CountingRepository::default()));
            let mut toggles = [0usize; 4];

            for (user, kind) in steps {
                let outcome = runtime
                    .block_on(service.toggle(users[user], post_id, ReactionType::ALL[kind]))
                    .unwrap();
                toggles[user] += 1;

                let expected = toggles.iter().filter(|n| *n % 2 == 1).count() as u64;
                prop_assert_eq!(outcome.num_of_reactions, expected);
                prop_assert_eq!(outcome.current_user_has_reaction, toggles[user] % 2 == 1);
            }
        }
    }
}
