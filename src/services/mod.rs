pub mod api;
pub mod mention;
pub mod reply;
pub mod snapshot;

pub use api::{ApiCommand, ApiEvent, ForumApi};
pub use mention::MentionService;
pub use reply::ReplyService;
pub use snapshot::SnapshotService;
