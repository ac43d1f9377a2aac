//! Repository traits for persistence operations.

pub mod tags;
pub mod video_tags;
pub mod videos;
pub mod votes;

pub use tags::TagRepo;
pub use video_tags::VideoTagRepo;
pub use videos::VideoRepo;
pub use votes::VoteRepo;
