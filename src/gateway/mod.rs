pub mod http;
pub mod wire;

use async_trait::async_trait;

use crate::app::{Result, StorylineError};
use crate::domain::{RemoteStory, Session};

pub use http::HttpGateway;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Largest photo the API accepts.
pub const MAX_PHOTO_BYTES: usize = 1024 * 1024;
const MIN_DESCRIPTION_CHARS: usize = 3;
const ALLOWED_PHOTO_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub size: u32,
    /// Only stories that carry coordinates.
    pub location: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
            location: false,
        }
    }
}

impl ListQuery {
    pub fn with_size(size: u32) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("size", self.size.to_string())];
        if self.location {
            pairs.push(("location", "1".to_string()));
        }
        pairs
    }
}

/// A photo to upload with a new story.
#[derive(Debug, Clone)]
pub struct Photo {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Photo {
    /// Guess the mime type from the file extension.
    pub fn from_file_name(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let lower = file_name.to_ascii_lowercase();
        let mime_type = if lower.ends_with(".png") {
            "image/png"
        } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            "image/jpeg"
        } else {
            "application/octet-stream"
        };

        Self {
            file_name,
            mime_type: mime_type.to_string(),
            bytes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewStory {
    pub photo: Photo,
    pub description: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl NewStory {
    /// Checks the same limits the API enforces, before any upload starts.
    pub fn validate(&self) -> Result<()> {
        if self.photo.bytes.is_empty() {
            return Err(StorylineError::InvalidInput(
                "Please select a photo for your story".into(),
            ));
        }
        if !ALLOWED_PHOTO_TYPES.contains(&self.photo.mime_type.as_str()) {
            return Err(StorylineError::InvalidInput(
                "Invalid file type. Please select a JPG or PNG image".into(),
            ));
        }
        if self.photo.bytes.len() > MAX_PHOTO_BYTES {
            return Err(StorylineError::InvalidInput(
                "Photo size must be less than 1MB".into(),
            ));
        }
        if self.description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(StorylineError::InvalidInput(
                "Description must be at least 3 characters long".into(),
            ));
        }
        Ok(())
    }

    /// Coordinates are only sent as a pair.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Remote story API. Every failure comes back as
/// [`StorylineError::Transport`].
#[async_trait]
pub trait StoryGateway {
    async fn list_stories(&self, query: &ListQuery) -> Result<Vec<RemoteStory>>;
    async fn get_story(&self, id: &str) -> Result<RemoteStory>;
    async fn create_story(&self, story: NewStory) -> Result<()>;
    async fn login(&self, email: &str, password: &str) -> Result<Session>;
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<String>;
}
