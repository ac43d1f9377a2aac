//! Tag service: CRUD over the shared tag namespace plus prefix search

use std::sync::Arc;

use devwiki_common::db::{NewTag, Store, Tag, TagChanges};
use devwiki_common::{Error, Patch, Result};
use serde::Deserialize;

use crate::pagination::{clamp_limit, empty_as_none, normalize_cursor, split_page, KeysetPage};

/// Longest tag name accepted, in characters, after normalization
pub const MAX_TAG_NAME_CHARS: usize = 50;

/// Shortest query, in bytes, that reaches the database when the caller gives no minimum
pub const DEFAULT_MIN_CHARS: usize = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTag {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTag {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
}

/// Query string of `GET /tags/search`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<i64>,
    pub cursor: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_chars: Option<i64>,
}

pub type TagSearchResult = KeysetPage<Tag>;

/// Canonical spelling of a tag name: trimmed and lower-cased.
pub fn fold_tag_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Fold a tag name and enforce the length bounds.
pub fn normalize_tag_name(name: &str) -> Result<String> {
    let normalized = fold_tag_name(name);
    let chars = normalized.chars().count();
    if chars == 0 || chars > MAX_TAG_NAME_CHARS {
        return Err(Error::InvalidInput(format!(
            "tag name must be between 1 and {} characters",
            MAX_TAG_NAME_CHARS
        )));
    }
    Ok(normalized)
}

fn tag_not_found() -> Error {
    Error::NotFound("tag not found".to_string())
}

fn duplicate_name() -> Error {
    Error::AlreadyExists("tag with this name already exists".to_string())
}

#[derive(Clone)]
pub struct TagService {
    store: Arc<dyn Store>,
}

impl TagService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, tag: CreateTag) -> Result<Tag> {
        let name = normalize_tag_name(&tag.name)?;

        if self.store.get_tag_by_name(&name).await?.is_some() {
            return Err(duplicate_name());
        }

        self.store
            .create_tag(&NewTag {
                name,
                description: tag.description,
            })
            .await
    }

    pub async fn find_all(&self) -> Result<Vec<Tag>> {
        self.store.list_tags().await
    }

    pub async fn find_one(&self, tag_id: i64) -> Result<Tag> {
        self.store.get_tag(tag_id).await?.ok_or_else(tag_not_found)
    }

    /// Look a tag up by name; the name is normalized first.
    pub async fn find_by_name(&self, name: &str) -> Result<Tag> {
        let name = fold_tag_name(name);
        self.store.get_tag_by_name(&name).await?.ok_or_else(tag_not_found)
    }

    /// Rename and/or change the description of a tag.
    ///
    /// An explicit null description clears it; a null name is rejected.
    /// An empty patch writes nothing.
    pub async fn update(&self, tag_id: i64, changes: UpdateTag) -> Result<Tag> {
        let existing = self.find_one(tag_id).await?;

        let name = match changes.name {
            Patch::Absent => None,
            Patch::Null => {
                return Err(Error::InvalidInput("tag name cannot be null".to_string()));
            }
            Patch::Value(name) => {
                let name = normalize_tag_name(&name)?;
                if name != existing.name && self.store.get_tag_by_name(&name).await?.is_some() {
                    return Err(duplicate_name());
                }
                Some(name)
            }
        };

        if name.is_none() && changes.description.is_absent() {
            return Ok(existing);
        }

        self.store
            .update_tag(
                tag_id,
                &TagChanges {
                    name,
                    description: changes.description,
                },
            )
            .await?;

        self.find_one(tag_id).await
    }

    pub async fn remove(&self, tag_id: i64) -> Result<()> {
        self.store.delete_tag(tag_id).await
    }

    /// Case-insensitive prefix search with keyset pagination by name.
    ///
    /// Queries shorter than `min_chars` bytes (after trimming) return an
    /// empty page without touching the store.
    pub async fn search(&self, params: TagSearchParams) -> Result<TagSearchResult> {
        let min_chars = match params.min_chars {
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
            _ => DEFAULT_MIN_CHARS,
        };

        let term = params.q.trim();
        if term.len() < min_chars {
            return Ok(KeysetPage::empty());
        }

        let limit = clamp_limit(params.limit);
        let cursor = normalize_cursor(params.cursor.as_deref());

        let rows = self
            .store
            .search_tags_by_prefix(&fold_tag_name(term), cursor, limit + 1)
            .await?;

        Ok(split_page(rows, limit, |tag| tag.name.clone()))
    }
}
