//! Vote reconciler
//!
//! Keeps at most one vote per (user, entity) and implements the toggle
//! state machine behind `change_vote`.

use std::sync::Arc;

use devwiki_common::db::{EntityRef, NewVote, Store, Vote, VoteCounts, VoteType};
use devwiki_common::{Error, Patch, Result};
use serde::Deserialize;

/// Outcome of [`VoteService::change_vote`]
#[derive(Debug, Clone, PartialEq)]
pub enum VoteChange {
    /// No prior vote; this one was inserted
    Created(Vote),
    /// Prior vote had the other direction; flipped in place (same id)
    Switched(Vote),
    /// Prior vote had the same direction; deleted
    Removed,
}

/// Partial update of a vote
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVote {
    #[serde(default)]
    pub vote_type: Patch<VoteType>,
}

fn vote_not_found() -> Error {
    Error::NotFound("vote not found".to_string())
}

#[derive(Clone)]
pub struct VoteService {
    store: Arc<dyn Store>,
}

impl VoteService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Strict create: fails with `AlreadyExists` if the user already voted.
    pub async fn create_vote(&self, vote: NewVote) -> Result<Vote> {
        if self.store.find_vote(vote.user_id, vote.entity).await?.is_some() {
            return Err(Error::AlreadyExists(
                "user already voted on this entity".to_string(),
            ));
        }
        // A concurrent insert between the check and here trips the unique
        // index and surfaces as the same AlreadyExists.
        self.store.create_vote(&vote).await
    }

    /// Cast, switch or retract a vote.
    ///
    /// * no vote yet: insert it
    /// * same direction as the existing vote: delete it
    /// * other direction: update the existing row in place
    pub async fn change_vote(
        &self,
        user_id: i64,
        entity: EntityRef,
        vote_type: VoteType,
    ) -> Result<VoteChange> {
        let existing = self.store.find_vote(user_id, entity).await?;

        match existing {
            None => {
                let vote = self
                    .store
                    .create_vote(&NewVote {
                        user_id,
                        entity,
                        vote_type,
                    })
                    .await?;
                Ok(VoteChange::Created(vote))
            }
            Some(vote) if vote.vote_type == vote_type => {
                self.store.delete_vote(vote.id).await?;
                Ok(VoteChange::Removed)
            }
            Some(vote) => {
                self.store.update_vote_type(vote.id, vote_type).await?;
                let updated = self.store.get_vote(vote.id).await?.ok_or_else(vote_not_found)?;
                Ok(VoteChange::Switched(updated))
            }
        }
    }

    /// Independent up and down tallies
    pub async fn vote_counts(&self, entity: EntityRef) -> Result<VoteCounts> {
        let upvotes = self.store.count_votes(entity, VoteType::Up).await?;
        let downvotes = self.store.count_votes(entity, VoteType::Down).await?;
        Ok(VoteCounts { upvotes, downvotes })
    }

    pub async fn find_all(&self) -> Result<Vec<Vote>> {
        self.store.list_votes().await
    }

    pub async fn find_one(&self, vote_id: i64) -> Result<Vote> {
        self.store.get_vote(vote_id).await?.ok_or_else(vote_not_found)
    }

    /// Apply a partial update. An absent `voteType` leaves the vote as is.
    pub async fn update(&self, vote_id: i64, changes: UpdateVote) -> Result<Vote> {
        let vote = self.find_one(vote_id).await?;

        match changes.vote_type {
            Patch::Absent => Ok(vote),
            Patch::Null => Err(Error::InvalidInput("voteType cannot be null".to_string())),
            Patch::Value(vote_type) if vote_type == vote.vote_type => Ok(vote),
            Patch::Value(vote_type) => {
                self.store.update_vote_type(vote_id, vote_type).await?;
                self.find_one(vote_id).await
            }
        }
    }

    pub async fn remove(&self, vote_id: i64) -> Result<()> {
        self.store.delete_vote(vote_id).await
    }

    pub async fn find_by_entity(&self, entity: EntityRef) -> Result<Vec<Vote>> {
        self.store.list_votes_by_entity(entity).await
    }

    pub async fn find_by_user(&self, user_id: i64) -> Result<Vec<Vote>> {
        self.store.list_votes_by_user(user_id).await
    }

    pub async fn find_user_vote_on_entity(
        &self,
        user_id: i64,
        entity: EntityRef,
    ) -> Result<Option<Vote>> {
        self.store.find_vote(user_id, entity).await
    }

    /// Delete the user's vote on an entity; `NotFound` if there is none.
    pub async fn remove_user_vote(&self, user_id: i64, entity: EntityRef) -> Result<()> {
        let vote = self
            .store
            .find_vote(user_id, entity)
            .await?
            .ok_or_else(vote_not_found)?;
        self.store.delete_vote(vote.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devwiki_common::db::SqliteStore;

    async fn service() -> (tempfile::TempDir, VoteService) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("devwiki.db")).await.unwrap();
        (dir, VoteService::new(Arc::new(store)))
    }

    #[test]
    fn test_update_vote_distinguishes_null_from_absent() {
        let absent: UpdateVote = serde_json::from_str("{}").unwrap();
        assert!(absent.vote_type.is_absent());

        let null: UpdateVote = serde_json::from_str(r#"{"voteType": null}"#).unwrap();
        assert_eq!(null.vote_type, Patch::Null);

        let value: UpdateVote = serde_json::from_str(r#"{"voteType": "down"}"#).unwrap();
        assert_eq!(value.vote_type, Patch::Value(VoteType::Down));
    }

    #[tokio::test]
    async fn test_update_with_null_vote_type_is_invalid() {
        let (_dir, votes) = service().await;
        let vote = votes
            .create_vote(NewVote {
                user_id: 1,
                entity: EntityRef::tutorial(1),
                vote_type: VoteType::Up,
            })
            .await
            .unwrap();

        let err = votes
            .update(vote.id, UpdateVote { vote_type: Patch::Null })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_remove_user_vote_without_vote_is_not_found() {
        let (_dir, votes) = service().await;
        let err = votes
            .remove_user_vote(1, EntityRef::product(2))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(ref m) if m == "vote not found"));
    }
}
