pub mod sqlite;

use std::sync::Arc;

use crate::app::Result;
use crate::domain::StoryRecord;

pub use sqlite::SqliteStore;

/// Read-modify-write callback for [`Store::update_with`]. Receives the
/// current record (if any) and returns the record to write, or `None`
/// to leave the store untouched.
pub type RecordUpdate<'a> = dyn FnMut(Option<StoryRecord>) -> Option<StoryRecord> + 'a;

pub trait Store {
    fn get(&self, id: &str) -> Result<Option<StoryRecord>>;
    /// Upsert by id, overwriting every column.
    fn put(&self, record: &StoryRecord) -> Result<()>;
    /// Every record in enumeration order; callers sort.
    fn get_all(&self) -> Result<Vec<StoryRecord>>;
    fn get_all_bookmarked(&self) -> Result<Vec<StoryRecord>>;
    fn count(&self) -> Result<usize>;
    fn clear(&self) -> Result<()>;
    /// Deletes every record whose flag is off. Returns how many went.
    fn clear_non_bookmarked(&self) -> Result<usize>;
    /// Atomic per-record read-modify-write. No other writer can touch the
    /// record between the read handed to `update` and the write.
    fn update_with(&self, id: &str, update: &mut RecordUpdate<'_>) -> Result<Option<StoryRecord>>;
}

/// Best-effort face of the store for view code.
///
/// Storage failures are logged here and degrade to "no data": reads
/// return `None`/empty, writes return `false`. Nothing propagates.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<dyn Store + Send + Sync>,
}

impl LocalStore {
    pub fn new(inner: Arc<dyn Store + Send + Sync>) -> Self {
        Self { inner }
    }

    /// The fallible store underneath, for callers that must tell a
    /// storage failure apart from an empty result.
    pub fn inner(&self) -> &Arc<dyn Store + Send + Sync> {
        &self.inner
    }

    pub fn get(&self, id: &str) -> Option<StoryRecord> {
        self.inner.get(id).unwrap_or_else(|e| {
            tracing::error!("Failed to read story {} from local store: {}", id, e);
            None
        })
    }

    pub fn put(&self, record: &StoryRecord) -> bool {
        match self.inner.put(record) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to write story {} to local store: {}", record.id(), e);
                false
            }
        }
    }

    pub fn get_all(&self) -> Vec<StoryRecord> {
        self.inner.get_all().unwrap_or_else(|e| {
            tracing::error!("Failed to read stories from local store: {}", e);
            Vec::new()
        })
    }

    pub fn get_all_bookmarked(&self) -> Vec<StoryRecord> {
        self.inner.get_all_bookmarked().unwrap_or_else(|e| {
            tracing::error!("Failed to read bookmarked stories from local store: {}", e);
            Vec::new()
        })
    }

    pub fn count(&self) -> usize {
        self.inner.count().unwrap_or_else(|e| {
            tracing::error!("Failed to count local stories: {}", e);
            0
        })
    }

    pub fn clear(&self) -> bool {
        match self.inner.clear() {
            Ok(()) => {
                tracing::info!("Cleared all stories from local store");
                true
            }
            Err(e) => {
                tracing::error!("Failed to clear local store: {}", e);
                false
            }
        }
    }

    pub fn clear_non_bookmarked(&self) -> usize {
        match self.inner.clear_non_bookmarked() {
            Ok(deleted) => {
                tracing::info!("Cleared {} non-bookmarked stories", deleted);
                deleted
            }
            Err(e) => {
                tracing::error!("Failed to clear non-bookmarked stories: {}", e);
                0
            }
        }
    }
}
