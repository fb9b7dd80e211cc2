pub mod date;
pub mod diagnostic;
pub mod feed;
pub mod timeline;

pub use diagnostic::{DebugMessage, Severity};
pub use feed::{new_post_block, Feed, Post};
pub use timeline::{FollowError, TimelinePost, TimelineResult};
