//! SQLite implementation of the repository traits.

use crate::db::init::init_database;
use crate::db::models::*;
use crate::patch::Patch;
use crate::repos::{TagRepo, VideoRepo, VideoTagRepo, VoteRepo};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;

/// Rows per INSERT statement in bulk writes (SQLite caps bound parameters).
const BULK_INSERT_CHUNK: usize = 500;

const VOTE_COLUMNS: &str = "id, user_id, entity_type, entity_id, vote_type, created_at, updated_at";
const TAG_COLUMNS: &str = "id, name, description, created_at, updated_at";
const VIDEO_COLUMNS: &str = "id, youtube_id, title, description, thumbnail_url, duration_secs, \
                             uploader_id, channel_title, created_at";
const VIDEO_TAG_COLUMNS: &str = "id, video_id, tag_id, created_at, created_by";

/// Combined store trait.
#[async_trait]
pub trait Store: VoteRepo + TagRepo + VideoRepo + VideoTagRepo + Send + Sync {
    /// Check database connectivity.
    async fn health_check(&self) -> Result<()>;
}

/// SQLite-backed store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database file and migrate it.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = init_database(db_path).await?;
        Ok(Self { pool })
    }
}

/// Escape LIKE wildcards so user input only ever matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl Store for SqliteStore {
    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl VoteRepo for SqliteStore {
    async fn create_vote(&self, vote: &NewVote) -> Result<Vote> {
        let now = Utc::now();
        sqlx::query_as::<_, Vote>(&format!(
            "INSERT INTO votes (user_id, entity_type, entity_id, vote_type, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {VOTE_COLUMNS}"
        ))
        .bind(vote.user_id)
        .bind(vote.entity.kind)
        .bind(vote.entity.id)
        .bind(vote.vote_type)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::from_insert(e, "user already voted on this entity"))
    }

    async fn get_vote(&self, vote_id: i64) -> Result<Option<Vote>> {
        let vote = sqlx::query_as::<_, Vote>(&format!("SELECT {VOTE_COLUMNS} FROM votes WHERE id = ?"))
            .bind(vote_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vote)
    }

    async fn find_vote(&self, user_id: i64, entity: EntityRef) -> Result<Option<Vote>> {
        let vote = sqlx::query_as::<_, Vote>(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes
             WHERE user_id = ? AND entity_type = ? AND entity_id = ?"
        ))
        .bind(user_id)
        .bind(entity.kind)
        .bind(entity.id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(vote)
    }

    async fn list_votes(&self) -> Result<Vec<Vote>> {
        let votes = sqlx::query_as::<_, Vote>(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(votes)
    }

    async fn list_votes_by_entity(&self, entity: EntityRef) -> Result<Vec<Vote>> {
        let votes = sqlx::query_as::<_, Vote>(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes
             WHERE entity_type = ? AND entity_id = ?
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(entity.kind)
        .bind(entity.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(votes)
    }

    async fn list_votes_by_user(&self, user_id: i64) -> Result<Vec<Vote>> {
        let votes = sqlx::query_as::<_, Vote>(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes
             WHERE user_id = ?
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(votes)
    }

    async fn update_vote_type(&self, vote_id: i64, vote_type: VoteType) -> Result<()> {
        let result = sqlx::query("UPDATE votes SET vote_type = ?, updated_at = ? WHERE id = ?")
            .bind(vote_type)
            .bind(Utc::now())
            .bind(vote_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("vote not found".to_string()));
        }
        Ok(())
    }

    async fn delete_vote(&self, vote_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM votes WHERE id = ?")
            .bind(vote_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("vote not found".to_string()));
        }
        Ok(())
    }

    async fn count_votes(&self, entity: EntityRef, vote_type: VoteType) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM votes
             WHERE entity_type = ? AND entity_id = ? AND vote_type = ?",
        )
        .bind(entity.kind)
        .bind(entity.id)
        .bind(vote_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl TagRepo for SqliteStore {
    async fn create_tag(&self, tag: &NewTag) -> Result<Tag> {
        let now = Utc::now();
        sqlx::query_as::<_, Tag>(&format!(
            "INSERT INTO tags (name, description, created_at, updated_at)
             VALUES (?, ?, ?, ?)
             RETURNING {TAG_COLUMNS}"
        ))
        .bind(&tag.name)
        .bind(&tag.description)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::from_insert(e, "tag with this name already exists"))
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(&format!("SELECT {TAG_COLUMNS} FROM tags ORDER BY name ASC"))
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    async fn get_tag(&self, tag_id: i64) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>(&format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ?"))
            .bind(tag_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn get_tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>(&format!("SELECT {TAG_COLUMNS} FROM tags WHERE name = ?"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn update_tag(&self, tag_id: i64, changes: &TagChanges) -> Result<()> {
        let mut query = QueryBuilder::<Sqlite>::new("UPDATE tags SET updated_at = ");
        query.push_bind(Utc::now());

        if let Some(name) = &changes.name {
            query.push(", name = ");
            query.push_bind(name.clone());
        }

        match &changes.description {
            Patch::Absent => {}
            Patch::Null => {
                query.push(", description = NULL");
            }
            Patch::Value(description) => {
                query.push(", description = ");
                query.push_bind(description.clone());
            }
        }

        query.push(" WHERE id = ");
        query.push_bind(tag_id);

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| Error::from_insert(e, "tag with this name already exists"))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("tag not found".to_string()));
        }
        Ok(())
    }

    async fn delete_tag(&self, tag_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(tag_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("tag not found".to_string()));
        }
        Ok(())
    }

    async fn search_tags_by_prefix(
        &self,
        prefix: &str,
        after: Option<&str>,
        fetch: i64,
    ) -> Result<Vec<Tag>> {
        let pattern = format!("{}%", escape_like(&prefix.to_lowercase()));

        let tags = sqlx::query_as::<_, Tag>(&format!(
            r"SELECT {TAG_COLUMNS} FROM tags
              WHERE LOWER(name) LIKE ? ESCAPE '\'
                AND (? IS NULL OR name > ?)
              ORDER BY name ASC
              LIMIT ?"
        ))
        .bind(pattern)
        .bind(after)
        .bind(after)
        .bind(fetch)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }
}

#[async_trait]
impl VideoRepo for SqliteStore {
    async fn create_video(&self, video: &NewVideo) -> Result<Video> {
        sqlx::query_as::<_, Video>(&format!(
            "INSERT INTO videos (youtube_id, title, description, thumbnail_url, duration_secs,
                                 uploader_id, channel_title, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {VIDEO_COLUMNS}"
        ))
        .bind(&video.youtube_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(video.duration_secs)
        .bind(video.uploader_id)
        .bind(&video.channel_title)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::from_insert(e, "video with this youtube id already exists"))
    }

    async fn get_video(&self, video_id: i64) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = ?"))
            .bind(video_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(video)
    }

    async fn list_videos(&self) -> Result<Vec<Video>> {
        let videos = sqlx::query_as::<_, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(videos)
    }
}

#[async_trait]
impl VideoTagRepo for SqliteStore {
    async fn create_video_tag(&self, video_tag: &NewVideoTag) -> Result<VideoTag> {
        sqlx::query_as::<_, VideoTag>(&format!(
            "INSERT INTO video_tags (video_id, tag_id, created_at, created_by)
             VALUES (?, ?, ?, ?)
             RETURNING {VIDEO_TAG_COLUMNS}"
        ))
        .bind(video_tag.video_id)
        .bind(video_tag.tag_id)
        .bind(Utc::now())
        .bind(video_tag.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::from_insert(e, "mapping already exists"))
    }

    async fn get_video_tag(&self, video_id: i64, tag_id: i64) -> Result<Option<VideoTag>> {
        let row = sqlx::query_as::<_, VideoTag>(&format!(
            "SELECT {VIDEO_TAG_COLUMNS} FROM video_tags WHERE video_id = ? AND tag_id = ?"
        ))
        .bind(video_id)
        .bind(tag_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_video_tag(&self, video_id: i64, tag_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM video_tags WHERE video_id = ? AND tag_id = ?")
            .bind(video_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn bulk_create_video_tags(&self, video_tags: &[NewVideoTag]) -> Result<u64> {
        if video_tags.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut inserted = 0;
        let mut tx = self.pool.begin().await?;

        for chunk in video_tags.chunks(BULK_INSERT_CHUNK) {
            let mut query = QueryBuilder::<Sqlite>::new(
                "INSERT INTO video_tags (video_id, tag_id, created_at, created_by) ",
            );
            query.push_values(chunk, |mut row, vt| {
                row.push_bind(vt.video_id)
                    .push_bind(vt.tag_id)
                    .push_bind(now)
                    .push_bind(vt.created_by);
            });
            // A concurrent attach may have landed the same pair already.
            query.push(" ON CONFLICT (video_id, tag_id) DO NOTHING");

            inserted += query.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn list_video_tags(&self, video_id: i64) -> Result<Vec<VideoTag>> {
        let rows = sqlx::query_as::<_, VideoTag>(&format!(
            "SELECT {VIDEO_TAG_COLUMNS} FROM video_tags WHERE video_id = ? ORDER BY id ASC"
        ))
        .bind(video_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_tags_for_video(&self, video_id: i64) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT t.id, t.name, t.description, t.created_at, t.updated_at
             FROM tags t
             JOIN video_tags vt ON vt.tag_id = t.id
             WHERE vt.video_id = ?
             ORDER BY t.name ASC",
        )
        .bind(video_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn list_videos_for_tag(&self, tag_id: i64) -> Result<Vec<Video>> {
        let videos = sqlx::query_as::<_, Video>(
            "SELECT v.id, v.youtube_id, v.title, v.description, v.thumbnail_url, v.duration_secs,
                    v.uploader_id, v.channel_title, v.created_at
             FROM videos v
             JOIN video_tags vt ON vt.video_id = v.id
             WHERE vt.tag_id = ?
             ORDER BY vt.created_at DESC, vt.id DESC",
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(videos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_escapes_wildcards() {
        assert_eq!(escape_like("c++"), "c++");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
