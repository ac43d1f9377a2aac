//! Video endpoints, including a video's tag set

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use devwiki_common::db::{NewVideo, Tag, Video};
use serde::Deserialize;
use tracing::info;

use super::error::ApiResult;
use super::extract::{parse_id, Actor};
use crate::AppState;

/// Body of `PATCH /videos/:id/tags`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertVideoTagsRequest {
    pub tag_ids: Vec<i64>,
}

/// POST /videos
pub async fn create_video(
    State(state): State<AppState>,
    payload: Result<Json<NewVideo>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Video>)> {
    let Json(request) = payload?;
    let video = state.videos.create(request).await?;

    info!("Registered video {} ({})", video.id, video.youtube_id);
    Ok((StatusCode::CREATED, Json(video)))
}

/// GET /videos
pub async fn list_videos(State(state): State<AppState>) -> ApiResult<Json<Vec<Video>>> {
    Ok(Json(state.videos.find_all().await?))
}

/// GET /videos/:id
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Video>> {
    let id = parse_id(&id, "invalid video id")?;
    Ok(Json(state.videos.find_one(id).await?))
}

/// GET /videos/:id/tags
pub async fn tags_for_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Tag>>> {
    let id = parse_id(&id, "invalid video id")?;
    Ok(Json(state.video_tags.find_tags_by_video(id).await?))
}

/// PATCH /videos/:id/tags
///
/// Replaces the whole tag set of the video; returns the resulting tags.
pub async fn upsert_video_tags(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Actor(actor): Actor,
    payload: Result<Json<UpsertVideoTagsRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<Tag>>> {
    let id = parse_id(&id, "invalid video id")?;
    let Json(request) = payload?;

    let tags = state
        .video_tags
        .upsert_for_video(id, &request.tag_ids, actor)
        .await?;

    info!("Video {} now has {} tag(s)", id, tags.len());
    Ok(Json(tags))
}

/// Build video routes
pub fn video_routes() -> Router<AppState> {
    Router::new()
        .route("/videos", get(list_videos).post(create_video))
        .route("/videos/:id", get(get_video))
        .route(
            "/videos/:id/tags",
            get(tags_for_video).patch(upsert_video_tags),
        )
}
