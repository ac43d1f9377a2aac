//! Tag endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use devwiki_common::db::{Tag, Video};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::error::ApiResult;
use super::extract::parse_id;
use crate::services::{CreateTag, TagSearchParams, TagSearchResult, UpdateTag};
use crate::AppState;

/// POST /tags
pub async fn create_tag(
    State(state): State<AppState>,
    payload: Result<Json<CreateTag>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    let Json(request) = payload?;
    let tag = state.tags.create(request).await?;

    info!("Created tag '{}' ({})", tag.name, tag.id);
    Ok((StatusCode::CREATED, Json(tag)))
}

/// GET /tags
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(state.tags.find_all().await?))
}

/// GET /tags/search?q=&limit=&cursor=&minChars=
pub async fn search_tags(
    State(state): State<AppState>,
    query: Result<Query<TagSearchParams>, QueryRejection>,
) -> ApiResult<Json<TagSearchResult>> {
    let Query(params) = query?;
    debug!("Tag search: {:?}", params);
    Ok(Json(state.tags.search(params).await?))
}

/// GET /tags/name/:name
pub async fn get_tag_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Tag>> {
    Ok(Json(state.tags.find_by_name(&name).await?))
}

/// GET /tags/:id
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Tag>> {
    let id = parse_id(&id, "invalid id")?;
    Ok(Json(state.tags.find_one(id).await?))
}

/// PATCH /tags/:id
pub async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTag>, JsonRejection>,
) -> ApiResult<Json<Tag>> {
    let id = parse_id(&id, "invalid id")?;
    let Json(changes) = payload?;
    Ok(Json(state.tags.update(id, changes).await?))
}

/// DELETE /tags/:id
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "invalid id")?;
    state.tags.remove(id).await?;

    info!("Deleted tag {}", id);
    Ok(Json(json!({ "deleted": true })))
}

/// GET /tags/:id/videos
pub async fn videos_for_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Video>>> {
    let id = parse_id(&id, "invalid tag id")?;
    Ok(Json(state.video_tags.find_videos_by_tag(id).await?))
}

/// GET /tags/name/:name/videos
pub async fn videos_for_tag_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<Video>>> {
    Ok(Json(state.video_tags.find_videos_by_tag_name(&name).await?))
}

/// Build tag routes
pub fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/search", get(search_tags))
        .route("/tags/name/:name", get(get_tag_by_name))
        .route("/tags/name/:name/videos", get(videos_for_tag_name))
        .route(
            "/tags/:id",
            get(get_tag).patch(update_tag).delete(delete_tag),
        )
        .route("/tags/:id/videos", get(videos_for_tag))
}
