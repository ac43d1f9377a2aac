//! Single video-tag pair endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use devwiki_common::db::VideoTag;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::error::ApiResult;
use super::extract::{parse_id, Actor};
use crate::AppState;

/// Body of `POST /video-tags`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachTagRequest {
    pub video_id: i64,
    pub tag_id: i64,
}

/// POST /video-tags
pub async fn attach_tag(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<AttachTagRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<VideoTag>)> {
    let Json(request) = payload?;

    let row = state
        .video_tags
        .attach_one(request.video_id, request.tag_id, actor)
        .await?;

    debug!("Attached tag {} to video {}", row.tag_id, row.video_id);
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /video-tags/:video_id/:tag_id
pub async fn detach_tag(
    State(state): State<AppState>,
    Path((video_id, tag_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let video_id = parse_id(&video_id, "invalid video id")?;
    let tag_id = parse_id(&tag_id, "invalid tag id")?;

    state.video_tags.detach_one(video_id, tag_id).await?;
    Ok(Json(json!({ "deleted": true })))
}

/// Build video-tag routes
pub fn video_tag_routes() -> Router<AppState> {
    Router::new()
        .route("/video-tags", post(attach_tag))
        .route("/video-tags/:video_id/:tag_id", delete(detach_tag))
}
