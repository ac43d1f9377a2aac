//! Video-tag set reconciler
//!
//! `upsert_for_video` makes the stored tag set of a video equal to the
//! requested one by set difference, so repeating a request is a no-op.

use std::collections::BTreeSet;
use std::sync::Arc;

use devwiki_common::db::{NewVideoTag, Store, Tag, Video, VideoTag};
use devwiki_common::{Error, Result};

use super::tags::fold_tag_name;

/// Pairs to insert and delete to move `current` to `desired`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    pub to_add: Vec<i64>,
    pub to_remove: Vec<i64>,
}

impl TagDiff {
    pub fn between(current: &BTreeSet<i64>, desired: &BTreeSet<i64>) -> Self {
        Self {
            to_add: desired.difference(current).copied().collect(),
            to_remove: current.difference(desired).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

#[derive(Clone)]
pub struct VideoTagService {
    store: Arc<dyn Store>,
}

impl VideoTagService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn require_video(&self, video_id: i64) -> Result<Video> {
        self.store
            .get_video(video_id)
            .await?
            .ok_or_else(|| Error::NotFound("video not found".to_string()))
    }

    /// Replace the tag set of a video and return the resulting tags.
    ///
    /// Every requested tag is checked before anything is written; duplicate
    /// ids in `tag_ids` collapse.
    pub async fn upsert_for_video(
        &self,
        video_id: i64,
        tag_ids: &[i64],
        actor: Option<i64>,
    ) -> Result<Vec<Tag>> {
        self.require_video(video_id).await?;

        let desired: BTreeSet<i64> = tag_ids.iter().copied().collect();
        for &tag_id in &desired {
            if self.store.get_tag(tag_id).await?.is_none() {
                return Err(Error::NotFound("one or more tags not found".to_string()));
            }
        }

        let current: BTreeSet<i64> = self
            .store
            .list_video_tags(video_id)
            .await?
            .into_iter()
            .map(|row| row.tag_id)
            .collect();

        let diff = TagDiff::between(&current, &desired);
        if diff.is_empty() {
            return self.store.list_tags_for_video(video_id).await;
        }

        for &tag_id in &diff.to_remove {
            self.store.delete_video_tag(video_id, tag_id).await?;
        }

        if !diff.to_add.is_empty() {
            let rows: Vec<NewVideoTag> = diff
                .to_add
                .iter()
                .map(|&tag_id| NewVideoTag {
                    video_id,
                    tag_id,
                    created_by: actor,
                })
                .collect();
            self.store.bulk_create_video_tags(&rows).await?;
        }

        self.store.list_tags_for_video(video_id).await
    }

    /// Attach one tag; `AlreadyExists` if the pair is already present.
    pub async fn attach_one(
        &self,
        video_id: i64,
        tag_id: i64,
        actor: Option<i64>,
    ) -> Result<VideoTag> {
        self.require_video(video_id).await?;
        if self.store.get_tag(tag_id).await?.is_none() {
            return Err(Error::NotFound("tag not found".to_string()));
        }
        if self.store.get_video_tag(video_id, tag_id).await?.is_some() {
            return Err(Error::AlreadyExists("mapping already exists".to_string()));
        }

        self.store
            .create_video_tag(&NewVideoTag {
                video_id,
                tag_id,
                created_by: actor,
            })
            .await
    }

    /// Detach one tag. Detaching a pair that is not there succeeds.
    pub async fn detach_one(&self, video_id: i64, tag_id: i64) -> Result<()> {
        self.store.delete_video_tag(video_id, tag_id).await?;
        Ok(())
    }

    pub async fn find_tags_by_video(&self, video_id: i64) -> Result<Vec<Tag>> {
        self.store.list_tags_for_video(video_id).await
    }

    pub async fn find_videos_by_tag(&self, tag_id: i64) -> Result<Vec<Video>> {
        self.store.list_videos_for_tag(tag_id).await
    }

    /// Videos carrying the named tag; an unknown name yields an empty list.
    pub async fn find_videos_by_tag_name(&self, name: &str) -> Result<Vec<Video>> {
        let name = fold_tag_name(name);
        match self.store.get_tag_by_name(&name).await? {
            Some(tag) => self.find_videos_by_tag(tag.id).await,
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[i64]) -> BTreeSet<i64> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_diff_adds_and_removes() {
        let diff = TagDiff::between(&set(&[1, 2, 3]), &set(&[2, 3, 4]));
        assert_eq!(diff.to_add, vec![4]);
        assert_eq!(diff.to_remove, vec![1]);
    }

    #[test]
    fn test_diff_of_equal_sets_is_empty() {
        assert!(TagDiff::between(&set(&[5, 6]), &set(&[6, 5])).is_empty());
    }

    #[test]
    fn test_diff_to_empty_removes_everything() {
        let diff = TagDiff::between(&set(&[1, 2]), &set(&[]));
        assert!(diff.to_add.is_empty());
        assert_eq!(diff.to_remove, vec![1, 2]);
    }
}
