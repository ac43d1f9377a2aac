//! Domain services over the store
//!
//! Services hold the rules (toggle state machine, tag set diffing, name
//! normalization, search bounds). They return `devwiki_common::Error` and do
//! no logging; the HTTP layer decides what to report.

pub mod tags;
pub mod video_tags;
pub mod videos;
pub mod votes;

pub use tags::{CreateTag, TagSearchParams, TagSearchResult, TagService, UpdateTag};
pub use video_tags::VideoTagService;
pub use videos::VideoService;
pub use votes::{UpdateVote, VoteChange, VoteService};
