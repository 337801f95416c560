//! # Storyline
//!
//! A client for a short-story sharing API that keeps bookmarked stories
//! available offline.
//!
//! ## Architecture
//!
//! ```text
//! Gateway → Reconciler → Store
//!    ↘                    ↙
//!       StoryQuery → CLI
//! ```
//!
//! - [`gateway`]: HTTP client for the story API, normalizing its loose JSON
//! - [`store`]: SQLite persistence of bookmarked stories
//! - [`sync`]: reconciliation, bookmark toggling and offline-aware queries
//! - [`cli`]: command-line front end
//!
//! ## Quick Start
//!
//! ```bash
//! storyline login ann@example.com secret
//! storyline stories
//! storyline bookmark story-abc123
//! storyline bookmarks   # works offline
//! ```
//!
//! The local store only ever holds stories the user bookmarked. Browsing
//! never caches; fetching only refreshes stories that are already stored.

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// store, gateway, session, query layer.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/storyline/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Story`](domain::Story): a story as the API describes it
/// - [`StoryRecord`](domain::StoryRecord): a story plus its local bookmark flag
/// - [`Session`](domain::Session): the logged-in user
pub mod domain;

/// Remote story API.
///
/// - [`StoryGateway`](gateway::StoryGateway): async trait for the API
/// - [`HttpGateway`](gateway::HttpGateway): reqwest-based implementation
pub mod gateway;

/// Saved login session.
pub mod session;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
/// - [`LocalStore`](store::LocalStore): best-effort wrapper that never fails
pub mod store;

/// Keeping local bookmarks and remote stories consistent.
pub mod sync;
