//! Video/tag junction repository.

use crate::db::models::{NewVideoTag, Tag, Video, VideoTag};
use crate::Result;
use async_trait::async_trait;

/// Repository for the video/tag association.
#[async_trait]
pub trait VideoTagRepo: Send + Sync {
    /// Insert one pair. An existing pair fails with `AlreadyExists`.
    async fn create_video_tag(&self, video_tag: &NewVideoTag) -> Result<VideoTag>;

    /// Get one pair.
    async fn get_video_tag(&self, video_id: i64, tag_id: i64) -> Result<Option<VideoTag>>;

    /// Delete one pair. Returns whether a row was removed; absence is not an error.
    async fn delete_video_tag(&self, video_id: i64, tag_id: i64) -> Result<bool>;

    /// Insert many pairs in one transaction, skipping pairs that already exist.
    /// Returns the number of rows inserted.
    async fn bulk_create_video_tags(&self, video_tags: &[NewVideoTag]) -> Result<u64>;

    /// Junction rows for a video.
    async fn list_video_tags(&self, video_id: i64) -> Result<Vec<VideoTag>>;

    /// Tags attached to a video, ordered by name.
    async fn list_tags_for_video(&self, video_id: i64) -> Result<Vec<Tag>>;

    /// Videos carrying a tag, most recently tagged first.
    async fn list_videos_for_tag(&self, tag_id: i64) -> Result<Vec<Video>>;
}
