pub mod session;
pub mod story;

pub use session::Session;
pub use story::{sort_newest_first, RemoteStory, Story, StoryRecord};
