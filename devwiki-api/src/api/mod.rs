//! HTTP API handlers for devwiki-api

pub mod error;
pub mod extract;
pub mod health;
pub mod tags;
pub mod video_tags;
pub mod videos;
pub mod votes;

pub use error::{ApiError, ApiResult};
pub use extract::{Actor, USER_ID_HEADER};
pub use health::health_routes;
pub use tags::tag_routes;
pub use video_tags::video_tag_routes;
pub use videos::video_routes;
pub use votes::vote_routes;
