//! Keeps the local bookmark store and the remote story API consistent.
//!
//! - [`Reconciler`]: refreshes local copies from fetched data, never
//!   creating records and never touching the bookmark flag
//! - [`BookmarkService`]: the only writer of the bookmark flag and the
//!   only path that inserts new records
//! - [`StoryQuery`]: what each view asks for, with offline fallback

pub mod bookmark;
pub mod query;
pub mod reconcile;

pub use bookmark::{BookmarkService, ToggleOutcome};
pub use query::{DetailOutcome, FeedMode, StoryFeed, StoryQuery};
pub use reconcile::{ReconcileReport, Reconciler};
