//! Video repository.

use crate::db::models::{NewVideo, Video};
use crate::Result;
use async_trait::async_trait;

/// Repository for video rows.
#[async_trait]
pub trait VideoRepo: Send + Sync {
    /// Register a video. A duplicate YouTube ID fails with `AlreadyExists`.
    async fn create_video(&self, video: &NewVideo) -> Result<Video>;

    /// Get a video by ID.
    async fn get_video(&self, video_id: i64) -> Result<Option<Video>>;

    /// List all videos, newest first.
    async fn list_videos(&self) -> Result<Vec<Video>>;
}
