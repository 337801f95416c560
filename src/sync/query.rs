use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::app::{Result, StorylineError};
use crate::domain::{sort_newest_first, RemoteStory, StoryRecord};
use crate::gateway::{ListQuery, StoryGateway};
use crate::store::LocalStore;
use crate::sync::Reconciler;

pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedMode {
    Online,
    /// The API was unreachable; only locally bookmarked stories are shown.
    OfflineBookmarks { reason: String },
}

#[derive(Debug, Clone)]
pub struct StoryFeed {
    /// Newest first.
    pub entries: Vec<StoryRecord>,
    pub mode: FeedMode,
}

impl StoryFeed {
    pub fn is_offline(&self) -> bool {
        matches!(self.mode, FeedMode::OfflineBookmarks { .. })
    }
}

#[derive(Debug, Clone)]
pub enum DetailOutcome {
    /// Fresh from the API, flag attached from the local store.
    Online(StoryRecord),
    /// API unreachable; served from the local copy.
    Offline(StoryRecord),
    /// Neither the API nor the local store has it.
    NotFound { reason: String },
}

/// Assembles what each view needs from the API and the local store.
pub struct StoryQuery {
    gateway: Arc<dyn StoryGateway + Send + Sync>,
    store: LocalStore,
    reconciler: Reconciler,
    network_timeout: Duration,
}

impl StoryQuery {
    pub fn new(gateway: Arc<dyn StoryGateway + Send + Sync>, store: LocalStore) -> Self {
        Self::with_timeout(gateway, store, DEFAULT_NETWORK_TIMEOUT)
    }

    pub fn with_timeout(
        gateway: Arc<dyn StoryGateway + Send + Sync>,
        store: LocalStore,
        network_timeout: Duration,
    ) -> Self {
        let reconciler = Reconciler::new(store.inner().clone());
        Self {
            gateway,
            store,
            reconciler,
            network_timeout,
        }
    }

    /// The main list. Online: the fetched page with local flags attached,
    /// after refreshing local copies. Offline: bookmarked stories only.
    pub async fn all_stories(&self, query: &ListQuery) -> StoryFeed {
        match self.remote(self.gateway.list_stories(query)).await {
            Ok(remote) => {
                self.reconciler.reconcile(&remote);
                let mut entries: Vec<StoryRecord> = remote
                    .into_iter()
                    .map(|story| self.with_local_flag(story))
                    .collect();
                sort_newest_first(&mut entries);

                StoryFeed {
                    entries,
                    mode: FeedMode::Online,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch stories from API, falling back to bookmarks: {}",
                    e
                );
                StoryFeed {
                    entries: self.bookmarked_stories(),
                    mode: FeedMode::OfflineBookmarks {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    pub async fn story_detail(&self, id: &str) -> DetailOutcome {
        match self.remote(self.gateway.get_story(id)).await {
            Ok(story) => {
                self.reconciler.reconcile(std::slice::from_ref(&story));
                DetailOutcome::Online(self.with_local_flag(story))
            }
            Err(e) => {
                tracing::warn!("Failed to fetch story {} from API: {}", id, e);
                match self.store.get(id) {
                    Some(record) => DetailOutcome::Offline(record),
                    None => DetailOutcome::NotFound {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    /// Local store only, newest first.
    pub fn bookmarked_stories(&self) -> Vec<StoryRecord> {
        let mut entries = self.store.get_all_bookmarked();
        sort_newest_first(&mut entries);
        entries
    }

    /// Maintenance: drop records whose flag is off.
    pub fn sweep(&self) -> usize {
        self.store.clear_non_bookmarked()
    }

    /// Stored stories are shown merged over their local copy, so a sparse
    /// payload still displays every known field.
    fn with_local_flag(&self, remote: RemoteStory) -> StoryRecord {
        match self.store.get(&remote.id) {
            Some(local) => local.merge_remote(&remote),
            None => StoryRecord::new(remote.into_story(), false),
        }
    }

    /// Bound a remote call by the network timeout; a timeout is a
    /// transport failure like any other.
    async fn remote<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.network_timeout, call)
            .await
            .map_err(|_| {
                StorylineError::transport(format!(
                    "Request timed out after {}s",
                    self.network_timeout.as_secs_f32()
                ))
            })?
    }
}
