//! Minimal video registry

use std::sync::Arc;

use devwiki_common::db::{NewVideo, Store, Video};
use devwiki_common::{Error, Result};

#[derive(Clone)]
pub struct VideoService {
    store: Arc<dyn Store>,
}

impl VideoService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Register a video. `youtube_id` is unique across the registry.
    pub async fn create(&self, mut video: NewVideo) -> Result<Video> {
        video.youtube_id = video.youtube_id.trim().to_string();
        if video.youtube_id.is_empty() {
            return Err(Error::InvalidInput("youtubeId is required".to_string()));
        }
        if video.title.trim().is_empty() {
            return Err(Error::InvalidInput("title is required".to_string()));
        }

        self.store.create_video(&video).await
    }

    pub async fn find_one(&self, video_id: i64) -> Result<Video> {
        self.store
            .get_video(video_id)
            .await?
            .ok_or_else(|| Error::NotFound("video not found".to_string()))
    }

    pub async fn find_all(&self) -> Result<Vec<Video>> {
        self.store.list_videos().await
    }
}
