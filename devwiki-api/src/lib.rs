//! devwiki-api library
//!
//! REST backend for votes, tags and the video/tag association of the
//! devwiki knowledge-sharing platform.

use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use devwiki_common::config::DEFAULT_ALLOWED_ORIGIN;
use devwiki_common::db::Store;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod api;
pub mod pagination;
pub mod services;

use services::{TagService, VideoService, VideoTagService, VoteService};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub votes: VoteService,
    pub tags: TagService,
    pub videos: VideoService,
    pub video_tags: VideoTagService,
    /// Origins allowed by the CORS layer
    pub allowed_origins: Vec<String>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            votes: VoteService::new(store.clone()),
            tags: TagService::new(store.clone()),
            videos: VideoService::new(store.clone()),
            video_tags: VideoTagService::new(store.clone()),
            store,
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
        }
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }
}

/// CORS layer for the configured origins; unparsable entries are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(api::USER_ID_HEADER),
        ])
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        .merge(api::health_routes())
        .merge(api::vote_routes())
        .merge(api::tag_routes())
        .merge(api::video_routes())
        .merge(api::video_tag_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
