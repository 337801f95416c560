use std::sync::Arc;

use crate::domain::{Story, StoryRecord};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Bookmarked,
    Unbookmarked,
    /// Unknown story with no data to store, or the store failed. The
    /// caller should tell the user the action did not go through.
    Failed,
}

impl ToggleOutcome {
    /// The new flag, or `None` when nothing changed.
    pub fn new_state(self) -> Option<bool> {
        match self {
            Self::Bookmarked => Some(true),
            Self::Unbookmarked => Some(false),
            Self::Failed => None,
        }
    }
}

pub struct BookmarkService {
    store: Arc<dyn Store + Send + Sync>,
}

impl BookmarkService {
    pub fn new(store: Arc<dyn Store + Send + Sync>) -> Self {
        Self { store }
    }

    /// Flip the bookmark flag of `story_id`.
    ///
    /// A stored story has its flag flipped; unbookmarking keeps the record
    /// so bookmarking it again needs no refetch. A story not yet stored is
    /// inserted from `fallback` with the flag forced on. Without fallback
    /// data there is nothing to store and the toggle fails.
    pub fn toggle(&self, story_id: &str, fallback: Option<&Story>) -> ToggleOutcome {
        let mut fallback = fallback.cloned();

        let result = self.store.update_with(story_id, &mut |existing| match existing {
            Some(record) => Some(record.toggled()),
            None => fallback.take().map(|mut story| {
                story.id = story_id.to_string();
                StoryRecord::new(story, true)
            }),
        });

        match result {
            Ok(Some(record)) if record.is_bookmarked => {
                tracing::info!("Bookmarked story {}", story_id);
                ToggleOutcome::Bookmarked
            }
            Ok(Some(_)) => {
                tracing::info!("Unbookmarked story {}", story_id);
                ToggleOutcome::Unbookmarked
            }
            Ok(None) => {
                tracing::warn!(
                    "Cannot bookmark story {} without story data; it is not stored locally",
                    story_id
                );
                ToggleOutcome::Failed
            }
            Err(e) => {
                tracing::error!("Failed to toggle bookmark for story {}: {}", story_id, e);
                ToggleOutcome::Failed
            }
        }
    }

    pub fn is_bookmarked(&self, story_id: &str) -> bool {
        match self.store.get(story_id) {
            Ok(record) => record.is_some_and(|r| r.is_bookmarked),
            Err(e) => {
                tracing::error!("Failed to read bookmark for story {}: {}", story_id, e);
                false
            }
        }
    }
}
