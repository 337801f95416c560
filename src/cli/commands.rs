use std::path::Path;

use chrono::{DateTime, Utc};

use crate::app::{AppContext, Result, StorylineError};
use crate::domain::StoryRecord;
use crate::gateway::{ListQuery, NewStory, Photo};
use crate::sync::{DetailOutcome, FeedMode, ToggleOutcome};

const SNIPPET_CHARS: usize = 80;

pub async fn login(ctx: &mut AppContext, email: &str, password: &str) -> Result<()> {
    let session = ctx.gateway.login(email, password).await?;
    ctx.sessions.save(&session)?;
    println!("Logged in as {}", session.name);
    ctx.session = Some(session);
    Ok(())
}

pub async fn register(ctx: &AppContext, name: &str, email: &str, password: &str) -> Result<()> {
    let message = ctx.gateway.register(name, email, password).await?;
    println!("{}", message);
    println!("Registration successful! Please login.");
    Ok(())
}

pub fn logout(ctx: &mut AppContext) -> Result<()> {
    ctx.sessions.clear()?;
    ctx.session = None;
    println!("Logged out");
    Ok(())
}

pub async fn list_stories(ctx: &AppContext, query: &ListQuery) -> Result<()> {
    ctx.require_session()?;
    let feed = ctx.query.all_stories(query).await;
    let now = Utc::now();

    if let FeedMode::OfflineBookmarks { reason } = &feed.mode {
        println!("Offline ({}). Showing bookmarked stories from offline cache.", reason);
        if feed.entries.is_empty() {
            println!("No bookmarked stories available offline");
            return Ok(());
        }
    } else if feed.entries.is_empty() {
        println!("No stories");
        return Ok(());
    }

    for entry in &feed.entries {
        println!("{}", format_entry(entry, now));
    }
    Ok(())
}

pub async fn show_story(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.require_session()?;
    let now = Utc::now();

    match ctx.query.story_detail(id).await {
        DetailOutcome::Online(record) => println!("{}", format_detail(&record, now)),
        DetailOutcome::Offline(record) => {
            println!("(offline copy)");
            println!("{}", format_detail(&record, now));
        }
        DetailOutcome::NotFound { reason } => {
            tracing::debug!("Story {} not found: {}", id, reason);
            return Err(StorylineError::StoryNotFound(id.to_string()));
        }
    }
    Ok(())
}

/// Toggle a bookmark. A story not yet stored locally is looked up first
/// so there is something to store.
pub async fn toggle_bookmark(ctx: &AppContext, id: &str) -> Result<ToggleOutcome> {
    let fallback = match ctx.store.get(id) {
        Some(_) => None,
        None => match ctx.query.story_detail(id).await {
            DetailOutcome::Online(record) | DetailOutcome::Offline(record) => Some(record.story),
            DetailOutcome::NotFound { .. } => None,
        },
    };

    let outcome = ctx.bookmarks.toggle(id, fallback.as_ref());
    match outcome {
        ToggleOutcome::Bookmarked => {
            println!("Bookmarked {}. It is saved for offline viewing.", id)
        }
        ToggleOutcome::Unbookmarked => println!("Removed {} from bookmarks", id),
        ToggleOutcome::Failed => eprintln!("Could not update bookmark status. Try again."),
    }
    Ok(outcome)
}

pub fn list_bookmarks(ctx: &AppContext) -> Result<()> {
    let entries = ctx.query.bookmarked_stories();
    if entries.is_empty() {
        println!("You have no bookmarked stories yet");
        return Ok(());
    }

    let now = Utc::now();
    for entry in &entries {
        println!("{}", format_entry(entry, now));
    }
    Ok(())
}

pub async fn post_story(
    ctx: &AppContext,
    photo_path: &Path,
    description: &str,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<()> {
    ctx.require_session()?;

    let bytes = std::fs::read(photo_path)?;
    let file_name = photo_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());

    let story = NewStory {
        photo: Photo::from_file_name(file_name, bytes),
        description: description.to_string(),
        lat,
        lon,
    };
    story.validate()?;

    ctx.gateway.create_story(story).await?;
    println!("Your story has been added!");
    Ok(())
}

pub fn sweep(ctx: &AppContext) -> Result<()> {
    let deleted = ctx.query.sweep();
    println!("Removed {} unbookmarked stories", deleted);
    Ok(())
}

pub fn clear(ctx: &AppContext) -> Result<()> {
    if !ctx.store.clear() {
        return Err(StorylineError::Other("Failed to clear local store".into()));
    }
    println!("Local store cleared");
    Ok(())
}

/// One list line plus a description snippet.
pub fn format_entry(record: &StoryRecord, now: DateTime<Utc>) -> String {
    let story = &record.story;
    let marker = if record.is_bookmarked { "★" } else { " " };
    format!(
        "{} {}  {} · {}\n    {}",
        marker,
        story.id,
        story.display_author(),
        story.time_ago(now),
        snippet(&story.description, SNIPPET_CHARS)
    )
}

pub fn format_detail(record: &StoryRecord, now: DateTime<Utc>) -> String {
    let story = &record.story;
    let location = story
        .location()
        .map(|(lat, lon)| format!("{:.5}, {:.5}", lat, lon))
        .unwrap_or_else(|| "No location data provided".to_string());

    format!(
        "{}\nBy: {}\nPosted: {}\nPhoto: {}\nLocation: {}\nBookmarked: {}\n\n{}",
        story.id,
        story.display_author(),
        story.time_ago(now),
        story.photo_url.as_deref().unwrap_or("No image provided"),
        location,
        if record.is_bookmarked { "yes" } else { "no" },
        story.description
    )
}

fn snippet(text: &str, max_chars: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() <= max_chars && !text.contains('\n') {
        return line.to_string();
    }
    let cut: String = line.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::app::context::testing::context;
    use crate::domain::{Session, Story};
    use crate::gateway::testing::FakeGateway;
    use chrono::TimeZone;

    fn story(id: &str) -> Story {
        let mut story = Story::new(id);
        story.name = "Ann".into();
        story.description = "At the beach".into();
        story.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).single();
        story
    }

    fn session() -> Option<Session> {
        Some(Session::new("user-1".into(), "Ann".into(), "token".into()))
    }

    #[test]
    fn test_format_entry() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap();
        let line = format_entry(&StoryRecord::new(story("a"), true), now);
        assert_eq!(line, "★ a  Ann · 3 hours ago\n    At the beach");
    }

    #[test]
    fn test_format_detail_without_location() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap();
        let detail = format_detail(&StoryRecord::new(story("a"), false), now);
        assert!(detail.contains("Location: No location data provided"));
        assert!(detail.contains("Photo: No image provided"));
        assert!(detail.contains("Bookmarked: no"));
    }

    #[test]
    fn test_snippet() {
        assert_eq!(snippet("short", 10), "short");
        assert_eq!(snippet("first line\nsecond", 80), "first line...");
        assert_eq!(snippet("abcdefghij klm", 10), "abcdefghij...");
    }

    #[tokio::test]
    async fn test_toggle_bookmark_fetches_unknown_story() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(FakeGateway::new(vec![story("a")]));
        let ctx = context(dir.path(), gateway, session());

        assert_eq!(
            toggle_bookmark(&ctx, "a").await.unwrap(),
            ToggleOutcome::Bookmarked
        );
        let record = ctx.store.get("a").unwrap();
        assert!(record.is_bookmarked);
        assert_eq!(record.story.description, "At the beach");

        assert_eq!(
            toggle_bookmark(&ctx, "a").await.unwrap(),
            ToggleOutcome::Unbookmarked
        );
    }

    #[tokio::test]
    async fn test_toggle_bookmark_unknown_offline_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), Arc::new(FakeGateway::offline()), session());

        assert_eq!(
            toggle_bookmark(&ctx, "a").await.unwrap(),
            ToggleOutcome::Failed
        );
        assert_eq!(ctx.store.count(), 0);
    }

    #[tokio::test]
    async fn test_login_saves_and_logout_clears_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path(), Arc::new(FakeGateway::new(vec![])), None);

        login(&mut ctx, "ann@example.com", "password").await.unwrap();
        assert!(ctx.session.is_some());
        assert_eq!(ctx.sessions.load().unwrap().name, "Ann");

        logout(&mut ctx).unwrap();
        assert!(ctx.session.is_none());
        assert!(ctx.sessions.load().is_none());
    }

    #[tokio::test]
    async fn test_list_stories_requires_session() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), Arc::new(FakeGateway::new(vec![])), None);

        assert!(matches!(
            list_stories(&ctx, &ListQuery::default()).await,
            Err(StorylineError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_show_story_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), Arc::new(FakeGateway::offline()), session());

        assert!(matches!(
            show_story(&ctx, "missing").await,
            Err(StorylineError::StoryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_post_story_rejects_invalid_photo() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("cat.gif");
        std::fs::write(&photo, b"GIF89a").unwrap();
        let ctx = context(dir.path(), Arc::new(FakeGateway::new(vec![])), session());

        assert!(matches!(
            post_story(&ctx, &photo, "A cat", None, None).await,
            Err(StorylineError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_post_story_offline_fails() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("cat.jpg");
        std::fs::write(&photo, [0xFFu8, 0xD8, 0xFF]).unwrap();
        let ctx = context(dir.path(), Arc::new(FakeGateway::offline()), session());

        let err = post_story(&ctx, &photo, "A cat", None, None)
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
