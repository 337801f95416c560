use std::sync::Arc;

use crate::domain::RemoteStory;
use crate::store::Store;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Local copies refreshed with remote fields.
    pub updated: usize,
    /// Remote stories with no local copy; left alone.
    pub ignored: usize,
    /// Remote stories without a usable id.
    pub skipped: usize,
    /// Storage failures.
    pub failed: usize,
}

pub struct Reconciler {
    store: Arc<dyn Store + Send + Sync>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn Store + Send + Sync>) -> Self {
        Self { store }
    }

    /// Apply freshly fetched stories to the local store.
    ///
    /// Only stories that already have a local record are written. Fields
    /// the payload carried overwrite the local ones; everything else, and
    /// the bookmark flag, is carried over.
    /// Each record is merged inside one store transaction, so a bookmark
    /// toggle can never be overwritten by a stale read. A bad record is
    /// logged and skipped without aborting the batch.
    pub fn reconcile(&self, remote: &[RemoteStory]) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for story in remote {
            if story.id.trim().is_empty() {
                tracing::warn!("Skipping remote story without id: {:?}", story);
                report.skipped += 1;
                continue;
            }

            let result = self.store.update_with(&story.id, &mut |existing| {
                existing.map(|local| local.merge_remote(story))
            });

            match result {
                Ok(Some(_)) => report.updated += 1,
                Ok(None) => report.ignored += 1,
                Err(e) => {
                    tracing::error!("Failed to refresh local copy of story {}: {}", story.id, e);
                    report.failed += 1;
                }
            }
        }

        tracing::debug!(
            "Reconciled {} remote stories: {} updated, {} ignored, {} skipped, {} failed",
            remote.len(),
            report.updated,
            report.ignored,
            report.skipped,
            report.failed
        );
        report
    }
}
