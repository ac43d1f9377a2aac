//! Vote endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use devwiki_common::db::{EntityRef, EntityType, NewVote, Vote, VoteCounts, VoteType};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::error::{ApiError, ApiResult};
use super::extract::{parse_entity, parse_id};
use crate::services::{UpdateVote, VoteChange};
use crate::AppState;

/// Body of `POST /votes` and `POST /votes/change`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub user_id: i64,
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub vote_type: VoteType,
}

impl VoteRequest {
    fn into_new_vote(self) -> ApiResult<NewVote> {
        if self.user_id <= 0 {
            return Err(ApiError::bad_request("invalid user id"));
        }
        if self.entity_id <= 0 {
            return Err(ApiError::bad_request("invalid entity id"));
        }
        Ok(NewVote {
            user_id: self.user_id,
            entity: EntityRef::new(self.entity_type, self.entity_id),
            vote_type: self.vote_type,
        })
    }
}

/// Response of `POST /votes/change`: the standing vote, or `{"removed": true}`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChangeVoteResponse {
    Vote(Vote),
    Removed { removed: bool },
}

impl From<VoteChange> for ChangeVoteResponse {
    fn from(change: VoteChange) -> Self {
        match change {
            VoteChange::Created(vote) | VoteChange::Switched(vote) => ChangeVoteResponse::Vote(vote),
            VoteChange::Removed => ChangeVoteResponse::Removed { removed: true },
        }
    }
}

/// POST /votes
pub async fn create_vote(
    State(state): State<AppState>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vote>)> {
    let Json(request) = payload?;
    let vote = state.votes.create_vote(request.into_new_vote()?).await?;

    debug!("Vote {} created by user {} on {}", vote.id, vote.user_id, vote.entity());
    Ok((StatusCode::CREATED, Json(vote)))
}

/// POST /votes/change
pub async fn change_vote(
    State(state): State<AppState>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> ApiResult<Json<ChangeVoteResponse>> {
    let Json(request) = payload?;
    let vote = request.into_new_vote()?;

    let change = state
        .votes
        .change_vote(vote.user_id, vote.entity, vote.vote_type)
        .await?;

    debug!("User {} vote on {}: {:?}", vote.user_id, vote.entity, change);
    Ok(Json(change.into()))
}

/// GET /votes
pub async fn list_votes(State(state): State<AppState>) -> ApiResult<Json<Vec<Vote>>> {
    Ok(Json(state.votes.find_all().await?))
}

/// GET /votes/:id
pub async fn get_vote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vote>> {
    let id = parse_id(&id, "invalid id")?;
    Ok(Json(state.votes.find_one(id).await?))
}

/// PATCH /votes/:id
pub async fn update_vote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateVote>, JsonRejection>,
) -> ApiResult<Json<Vote>> {
    let id = parse_id(&id, "invalid id")?;
    let Json(changes) = payload?;
    Ok(Json(state.votes.update(id, changes).await?))
}

/// DELETE /votes/:id
pub async fn delete_vote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "invalid id")?;
    state.votes.remove(id).await?;
    Ok(Json(json!({ "deleted": true })))
}

/// GET /votes/entity/:entity_type/:entity_id
pub async fn votes_by_entity(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Vote>>> {
    let entity = parse_entity(&entity_type, &entity_id)?;
    Ok(Json(state.votes.find_by_entity(entity).await?))
}

/// GET /votes/entity/:entity_type/:entity_id/counts
pub async fn vote_counts(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> ApiResult<Json<VoteCounts>> {
    let entity = parse_entity(&entity_type, &entity_id)?;
    Ok(Json(state.votes.vote_counts(entity).await?))
}

/// GET /votes/user/:user_id
pub async fn votes_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Vote>>> {
    let user_id = parse_id(&user_id, "invalid user id")?;
    Ok(Json(state.votes.find_by_user(user_id).await?))
}

/// GET /votes/user/:user_id/entity/:entity_type/:entity_id
pub async fn user_vote_on_entity(
    State(state): State<AppState>,
    Path((user_id, entity_type, entity_id)): Path<(String, String, String)>,
) -> ApiResult<Json<Vote>> {
    let user_id = parse_id(&user_id, "invalid user id")?;
    let entity = parse_entity(&entity_type, &entity_id)?;

    state
        .votes
        .find_user_vote_on_entity(user_id, entity)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError(devwiki_common::Error::NotFound("vote not found".to_string())))
}

/// DELETE /votes/user/:user_id/entity/:entity_type/:entity_id
pub async fn remove_user_vote(
    State(state): State<AppState>,
    Path((user_id, entity_type, entity_id)): Path<(String, String, String)>,
) -> ApiResult<Json<Value>> {
    let user_id = parse_id(&user_id, "invalid user id")?;
    let entity = parse_entity(&entity_type, &entity_id)?;

    state.votes.remove_user_vote(user_id, entity).await?;
    Ok(Json(json!({ "deleted": true })))
}

/// Build vote routes
pub fn vote_routes() -> Router<AppState> {
    Router::new()
        .route("/votes", post(create_vote).get(list_votes))
        .route("/votes/change", post(change_vote))
        .route(
            "/votes/:id",
            get(get_vote).patch(update_vote).delete(delete_vote),
        )
        .route("/votes/entity/:entity_type/:entity_id", get(votes_by_entity))
        .route("/votes/entity/:entity_type/:entity_id/counts", get(vote_counts))
        .route("/votes/user/:user_id", get(votes_by_user))
        .route(
            "/votes/user/:user_id/entity/:entity_type/:entity_id",
            get(user_vote_on_entity).delete(remove_user_vote),
        )
}
