//! Database schema migrations
//!
//! Versioned, idempotent schema changes applied on top of the base tables
//! created in [`crate::db::init`]. The applied version is tracked in the
//! `schema_version` table.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - databases in the field already ran them
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Stay idempotent** - use `IF NOT EXISTS` and check before rewriting data

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("Migration v2 completed");
    }

    Ok(())
}

/// Migration v1: unique indexes for one vote per (user, entity) and one row per (video, tag)
///
/// Older databases may already hold duplicates written by racing requests.
/// Those are collapsed onto the oldest row before the index is created.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: unique vote and video-tag indexes");

    let mut tx = pool.begin().await?;

    let dropped_votes = sqlx::query(
        r#"
        DELETE FROM votes
        WHERE id NOT IN (
            SELECT MIN(id) FROM votes GROUP BY user_id, entity_type, entity_id
        )
        "#,
    )
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if dropped_votes > 0 {
        warn!("  Removed {} duplicate votes", dropped_votes);
    }

    let dropped_pairs = sqlx::query(
        r#"
        DELETE FROM video_tags
        WHERE id NOT IN (
            SELECT MIN(id) FROM video_tags GROUP BY video_id, tag_id
        )
        "#,
    )
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if dropped_pairs > 0 {
        warn!("  Removed {} duplicate video-tag rows", dropped_pairs);
    }

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_votes_user_entity
         ON votes (user_id, entity_type, entity_id)",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_video_tags_pair
         ON video_tags (video_id, tag_id)",
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Migration v2: lookup indexes for vote tallies and tag → video listings
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: lookup indexes");

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_votes_entity
         ON votes (entity_type, entity_id, vote_type)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_votes_user ON votes (user_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_video_tags_tag ON video_tags (tag_id)")
        .execute(pool)
        .await?;

    Ok(())
}
