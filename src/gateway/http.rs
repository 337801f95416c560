use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use url::Url;

use crate::app::{Result, StorylineError};
use crate::config::ApiConfig;
use crate::domain::{RemoteStory, Session};
use crate::gateway::wire::{self, Envelope};
use crate::gateway::{ListQuery, NewStory, StoryGateway};

pub const DEFAULT_BASE_URL: &str = "https://story-api.dicoding.dev/v1";
pub const DEFAULT_USER_AGENT: &str = concat!("storyline/", env!("CARGO_PKG_VERSION"));
/// Client-level limit, covering uploads too. List and detail reads are
/// bounded more tightly by the query layer.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpGateway {
    client: Client,
    base_url: Url,
    session: Option<Session>,
}

impl HttpGateway {
    pub fn from_config(api: &ApiConfig, session: Option<Session>) -> Result<Self> {
        Self::with_options(&api.base_url, &api.user_agent, REQUEST_TIMEOUT, session)
    }

    pub fn with_options(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
        session: Option<Session>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(user_agent)
            .build()
            .map_err(|e| StorylineError::Other(format!("Failed to build HTTP client: {}", e)))?;

        // Trailing slash so `join` appends instead of replacing the last segment.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session {
            Some(session) => request.header(AUTHORIZATION, session.bearer()),
            None => request,
        }
    }

    /// Send and decode. Network failures, bad statuses and bad bodies all
    /// come back as one `Transport` error.
    async fn send(&self, request: RequestBuilder) -> Result<Envelope> {
        let response = request
            .send()
            .await
            .map_err(|e| StorylineError::transport(format!("Network error: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| StorylineError::transport(format!("Failed to read response: {}", e)))?;

        wire::decode_response(status.as_u16(), status.canonical_reason(), &body)
    }
}

#[async_trait]
impl StoryGateway for HttpGateway {
    async fn list_stories(&self, query: &ListQuery) -> Result<Vec<RemoteStory>> {
        let url = self.endpoint("stories")?;
        let request = self
            .authorized(self.client.get(url))
            .query(&query.to_query_pairs());

        let envelope = self.send(request).await?;
        let list = envelope.list_story.ok_or_else(|| {
            StorylineError::transport(
                envelope
                    .message
                    .unwrap_or_else(|| "Could not load stories from API".into()),
            )
        })?;

        let stories = wire::normalize_list(list);
        tracing::debug!("Fetched {} stories (page {})", stories.len(), query.page);
        Ok(stories)
    }

    async fn get_story(&self, id: &str) -> Result<RemoteStory> {
        let mut url = self.endpoint("stories")?;
        url.path_segments_mut()
            .map_err(|_| StorylineError::Other("Base URL cannot have path segments".into()))?
            .push(id);

        let envelope = self.send(self.authorized(self.client.get(url))).await?;
        let message = envelope.message;
        envelope
            .story
            .and_then(wire::normalize_story)
            .ok_or_else(|| {
                StorylineError::transport(
                    message.unwrap_or_else(|| "Story not found via API".into()),
                )
            })
    }

    async fn create_story(&self, story: NewStory) -> Result<()> {
        story.validate()?;
        let url = self.endpoint("stories")?;
        let coordinates = story.coordinates();
        let NewStory {
            photo, description, ..
        } = story;

        let photo = Part::bytes(photo.bytes)
            .file_name(photo.file_name)
            .mime_str(&photo.mime_type)
            .map_err(|e| StorylineError::InvalidInput(format!("Invalid photo type: {}", e)))?;

        let mut form = Form::new()
            .part("photo", photo)
            .text("description", description.trim().to_string());
        if let Some((lat, lon)) = coordinates {
            form = form.text("lat", lat.to_string()).text("lon", lon.to_string());
        }

        let request = self.authorized(self.client.post(url)).multipart(form);
        let envelope = self.send(request).await?;
        tracing::info!(
            "Story created: {}",
            envelope.message.as_deref().unwrap_or("success")
        );
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let url = self.endpoint("login")?;
        let body = serde_json::json!({ "email": email, "password": password });

        let envelope = self.send(self.client.post(url).json(&body)).await?;
        let result = envelope.login_result.ok_or_else(|| {
            StorylineError::transport(envelope.message.unwrap_or_else(|| "Login failed".into()))
        })?;
        wire::normalize_login(result)
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<String> {
        let url = self.endpoint("register")?;
        let body = serde_json::json!({ "name": name, "email": email, "password": password });

        let envelope = self.send(self.client.post(url).json(&body)).await?;
        Ok(envelope
            .message
            .unwrap_or_else(|| "Registration successful".into()))
    }
}
