//! Vote repository.

use crate::db::models::{EntityRef, NewVote, Vote, VoteType};
use crate::Result;
use async_trait::async_trait;

/// Repository for vote rows.
#[async_trait]
pub trait VoteRepo: Send + Sync {
    /// Insert a vote. A second vote for the same (user, entity) fails with `AlreadyExists`.
    async fn create_vote(&self, vote: &NewVote) -> Result<Vote>;

    /// Get a vote by ID.
    async fn get_vote(&self, vote_id: i64) -> Result<Option<Vote>>;

    /// Get the vote a user cast on an entity.
    async fn find_vote(&self, user_id: i64, entity: EntityRef) -> Result<Option<Vote>>;

    /// List all votes, newest first.
    async fn list_votes(&self) -> Result<Vec<Vote>>;

    /// List votes on an entity, newest first.
    async fn list_votes_by_entity(&self, entity: EntityRef) -> Result<Vec<Vote>>;

    /// List votes cast by a user, newest first.
    async fn list_votes_by_user(&self, user_id: i64) -> Result<Vec<Vote>>;

    /// Change the direction of an existing vote. `NotFound` if the row is gone.
    async fn update_vote_type(&self, vote_id: i64, vote_type: VoteType) -> Result<()>;

    /// Delete a vote by ID. `NotFound` if the row is gone.
    async fn delete_vote(&self, vote_id: i64) -> Result<()>;

    /// Count votes of one direction on an entity.
    async fn count_votes(&self, entity: EntityRef, vote_type: VoteType) -> Result<i64>;
}
