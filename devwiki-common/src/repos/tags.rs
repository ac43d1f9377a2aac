//! Tag repository.

use crate::db::models::{NewTag, Tag, TagChanges};
use crate::Result;
use async_trait::async_trait;

/// Repository for tag operations.
#[async_trait]
pub trait TagRepo: Send + Sync {
    /// Create a tag. Duplicate names fail with `AlreadyExists`.
    async fn create_tag(&self, tag: &NewTag) -> Result<Tag>;

    /// List all tags ordered by name.
    async fn list_tags(&self) -> Result<Vec<Tag>>;

    /// Get a tag by ID.
    async fn get_tag(&self, tag_id: i64) -> Result<Option<Tag>>;

    /// Get a tag by its exact (already normalized) name.
    async fn get_tag_by_name(&self, name: &str) -> Result<Option<Tag>>;

    /// Apply column changes to a tag. `NotFound` if the row is gone.
    async fn update_tag(&self, tag_id: i64, changes: &TagChanges) -> Result<()>;

    /// Delete a tag by ID. `NotFound` if the row is gone.
    async fn delete_tag(&self, tag_id: i64) -> Result<()>;

    /// Tags whose lower-cased name starts with `prefix`, ordered by name,
    /// strictly after `after` when given, at most `fetch` rows.
    async fn search_tags_by_prefix(
        &self,
        prefix: &str,
        after: Option<&str>,
        fetch: i64,
    ) -> Result<Vec<Tag>>;
}
