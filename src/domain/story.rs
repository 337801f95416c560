use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A story as the remote API knows it. Carries no local-only state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub name: String,
    pub description: String,
    pub photo_url: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Story {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: String::new(),
            photo_url: None,
            lat: None,
            lon: None,
            created_at: None,
        }
    }

    pub fn display_author(&self) -> &str {
        if self.name.trim().is_empty() {
            "Anonymous"
        } else {
            &self.name
        }
    }

    /// Coordinates, only when both are present and finite.
    pub fn location(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }

    /// Relative age of the story, e.g. "3 hours ago".
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        let Some(created_at) = self.created_at else {
            return "some time ago".to_string();
        };

        let elapsed = now.signed_duration_since(created_at);
        let (count, unit) = if elapsed.num_minutes() < 1 {
            return "just now".to_string();
        } else if elapsed.num_hours() < 1 {
            (elapsed.num_minutes(), "minute")
        } else if elapsed.num_days() < 1 {
            (elapsed.num_hours(), "hour")
        } else if elapsed.num_days() < 30 {
            (elapsed.num_days(), "day")
        } else if elapsed.num_days() < 365 {
            (elapsed.num_days() / 30, "month")
        } else {
            (elapsed.num_days() / 365, "year")
        };

        if count == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", count, unit)
        }
    }
}

/// A story as fetched, remembering which fields the payload carried.
///
/// The outer `None` means the field was absent. Nullable fields nest a
/// second `Option` so an explicit `null` still clears the local value.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteStory {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub photo_url: Option<Option<String>>,
    pub lat: Option<Option<f64>>,
    pub lon: Option<Option<f64>>,
    pub created_at: Option<Option<DateTime<Utc>>>,
}

impl RemoteStory {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            photo_url: None,
            lat: None,
            lon: None,
            created_at: None,
        }
    }

    /// Overwrite the fields of `story` that the payload carried.
    pub fn apply_to(&self, story: &mut Story) {
        story.id.clone_from(&self.id);
        if let Some(name) = &self.name {
            story.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            story.description.clone_from(description);
        }
        if let Some(photo_url) = &self.photo_url {
            story.photo_url.clone_from(photo_url);
        }
        if let Some(lat) = self.lat {
            story.lat = lat;
        }
        if let Some(lon) = self.lon {
            story.lon = lon;
        }
        if let Some(created_at) = self.created_at {
            story.created_at = created_at;
        }
    }

    /// The story as sent, with absent fields left empty.
    pub fn into_story(self) -> Story {
        Story {
            id: self.id,
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            photo_url: self.photo_url.flatten(),
            lat: self.lat.flatten(),
            lon: self.lon.flatten(),
            created_at: self.created_at.flatten(),
        }
    }
}

impl From<Story> for RemoteStory {
    fn from(story: Story) -> Self {
        Self {
            id: story.id,
            name: Some(story.name),
            description: Some(story.description),
            photo_url: Some(story.photo_url),
            lat: Some(story.lat),
            lon: Some(story.lon),
            created_at: Some(story.created_at),
        }
    }
}

/// A story paired with its local bookmark flag.
///
/// This is both the Local Store entity and what every view receives.
/// `is_bookmarked` never crosses the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub story: Story,
    pub is_bookmarked: bool,
}

impl StoryRecord {
    pub fn new(story: Story, is_bookmarked: bool) -> Self {
        Self {
            story,
            is_bookmarked,
        }
    }

    pub fn id(&self) -> &str {
        &self.story.id
    }

    /// Overwrite the fields `remote` carried, keeping everything else
    /// and the local flag.
    pub fn merge_remote(mut self, remote: &RemoteStory) -> Self {
        remote.apply_to(&mut self.story);
        self
    }

    pub fn toggled(mut self) -> Self {
        self.is_bookmarked = !self.is_bookmarked;
        self
    }
}

/// Stable sort, newest `created_at` first. Ties keep their source order
/// and records without a timestamp go last.
pub fn sort_newest_first(records: &mut [StoryRecord]) {
    records.sort_by(|a, b| b.story.created_at.cmp(&a.story.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(secs, 0).single()
    }

    fn record(id: &str, created_at: Option<DateTime<Utc>>) -> StoryRecord {
        let mut story = Story::new(id);
        story.created_at = created_at;
        StoryRecord::new(story, false)
    }

    #[test]
    fn test_display_author_falls_back_to_anonymous() {
        let mut story = Story::new("s1");
        assert_eq!(story.display_author(), "Anonymous");
        story.name = "Ann".into();
        assert_eq!(story.display_author(), "Ann");
    }

    #[test]
    fn test_location_requires_both_finite_coordinates() {
        let mut story = Story::new("s1");
        story.lat = Some(-6.2);
        assert_eq!(story.location(), None);
        story.lon = Some(f64::NAN);
        assert_eq!(story.location(), None);
        story.lon = Some(106.8);
        assert_eq!(story.location(), Some((-6.2, 106.8)));
    }

    #[test]
    fn test_time_ago() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let mut story = Story::new("s1");
        assert_eq!(story.time_ago(now), "some time ago");

        story.created_at = Some(now - Duration::seconds(20));
        assert_eq!(story.time_ago(now), "just now");

        story.created_at = Some(now - Duration::minutes(1));
        assert_eq!(story.time_ago(now), "1 minute ago");

        story.created_at = Some(now - Duration::hours(5));
        assert_eq!(story.time_ago(now), "5 hours ago");

        story.created_at = Some(now - Duration::days(3));
        assert_eq!(story.time_ago(now), "3 days ago");

        story.created_at = Some(now - Duration::days(400));
        assert_eq!(story.time_ago(now), "1 year ago");
    }

    #[test]
    fn test_merge_remote_keeps_flag() {
        let mut local = Story::new("a");
        local.description = "old".into();
        let existing = StoryRecord::new(local, true);

        let mut remote = Story::new("a");
        remote.description = "new".into();
        remote.photo_url = Some("https://example.com/a.jpg".into());

        let merged = existing.merge_remote(&RemoteStory::from(remote.clone()));
        assert!(merged.is_bookmarked);
        assert_eq!(merged.story, remote);
    }

    #[test]
    fn test_merge_remote_only_overwrites_sent_fields() {
        let mut local = Story::new("a");
        local.name = "Ann".into();
        local.description = "old".into();
        local.photo_url = Some("https://example.com/a.jpg".into());
        local.lat = Some(-6.2);
        local.lon = Some(106.8);
        local.created_at = at(100);
        let existing = StoryRecord::new(local.clone(), true);

        let mut remote = RemoteStory::new("a");
        remote.description = Some("new".into());
        remote.lon = Some(None);

        let merged = existing.merge_remote(&remote);
        assert!(merged.is_bookmarked);
        assert_eq!(merged.story.description, "new");
        assert_eq!(merged.story.lon, None);
        assert_eq!(merged.story.name, "Ann");
        assert_eq!(merged.story.photo_url, local.photo_url);
        assert_eq!(merged.story.lat, Some(-6.2));
        assert_eq!(merged.story.created_at, at(100));
    }

    #[test]
    fn test_remote_story_into_story_fills_defaults() {
        let mut remote = RemoteStory::new("a");
        remote.name = Some("Ann".into());
        remote.created_at = Some(None);

        let story = remote.into_story();
        assert_eq!(story.name, "Ann");
        assert_eq!(story.description, "");
        assert_eq!(story.created_at, None);
        assert_eq!(RemoteStory::from(story.clone()).into_story(), story);
    }

    #[test]
    fn test_toggled_flips_flag() {
        let record = record("a", None);
        assert!(record.clone().toggled().is_bookmarked);
        assert!(!record.toggled().toggled().is_bookmarked);
    }

    #[test]
    fn test_sort_newest_first_is_stable_and_puts_missing_last() {
        let mut records = vec![
            record("old", at(100)),
            record("none", None),
            record("tie-1", at(200)),
            record("new", at(300)),
            record("tie-2", at(200)),
        ];
        sort_newest_first(&mut records);

        let ids: Vec<&str> = records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["new", "tie-1", "tie-2", "old", "none"]);
    }
}
