//! Request extractors and path parsing helpers

use std::convert::Infallible;

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use devwiki_common::db::{EntityRef, EntityType};

use super::error::ApiError;

/// Header naming the acting user until token auth lands
pub const USER_ID_HEADER: &str = "x-user-id";

/// Optional acting user taken from `X-User-ID`.
///
/// A missing or unparsable header yields `Actor(None)`; it never rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub Option<i64>);

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|id| *id > 0);

        Ok(Actor(user_id))
    }
}

/// Parse a positive integer id from a path segment.
pub fn parse_id(raw: &str, message: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request(message))
}

/// Parse the `:entity_type/:entity_id` pair of vote routes.
pub fn parse_entity(entity_type: &str, entity_id: &str) -> Result<EntityRef, ApiError> {
    let kind: EntityType = entity_type.parse()?;
    let id = parse_id(entity_id, "invalid entity id")?;
    Ok(EntityRef::new(kind, id))
}
