//! Wire schema of the story API and its normalization into domain types.
//!
//! The API is loose about which fields it sends and how. Everything here
//! is optional on the way in; past this module the rest of the crate only
//! sees fully-typed [`RemoteStory`] values that still know which fields
//! were sent.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::app::{Result, StorylineError};
use crate::domain::{RemoteStory, Session};

/// Common response envelope: `{ error, message, ...payload }`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default)]
    pub error: bool,
    pub message: Option<String>,
    /// Kept as raw values so one bad entry cannot fail the whole list.
    pub list_story: Option<Vec<Value>>,
    pub story: Option<Value>,
    pub login_result: Option<WireLoginResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStory {
    pub id: Option<Value>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub photo_url: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub lat: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub lon: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub created_at: Option<Value>,
}

/// A present key becomes `Some`, even when its value is `null`.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLoginResult {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub token: Option<String>,
}

/// Turn a raw HTTP response into an envelope, or the one transport error.
///
/// The message comes from the body when it has one, then the status
/// text, then a generic `HTTP error! status: N`.
pub fn decode_response(status: u16, status_text: Option<&str>, body: &[u8]) -> Result<Envelope> {
    let ok = (200..300).contains(&status);

    let envelope = match serde_json::from_slice::<Envelope>(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!("Response body is not valid JSON (status {}): {}", status, e);
            let message = status_text
                .filter(|s| !s.is_empty())
                .map(String::from)
                .unwrap_or_else(|| format!("HTTP {} - Failed to parse JSON response", status));
            return Err(StorylineError::transport(message));
        }
    };

    if !ok {
        let message = envelope
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP error! status: {}", status));
        return Err(StorylineError::transport(message));
    }

    if envelope.error {
        let message = envelope
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Request failed".to_string());
        return Err(StorylineError::transport(message));
    }

    Ok(envelope)
}

/// Normalize one raw story. `None` when it has no usable id.
pub fn normalize_story(value: Value) -> Option<RemoteStory> {
    let wire: WireStory = match serde_json::from_value(value) {
        Ok(wire) => wire,
        Err(e) => {
            tracing::warn!("Skipping malformed story from API: {}", e);
            return None;
        }
    };

    let id = match wire.id {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            tracing::warn!("Skipping story from API without id");
            return None;
        }
    };

    Some(RemoteStory {
        id,
        name: wire.name,
        description: wire.description,
        photo_url: wire.photo_url.as_ref().map(parse_photo_url),
        lat: wire.lat.as_ref().map(parse_coordinate),
        lon: wire.lon.as_ref().map(parse_coordinate),
        created_at: wire.created_at.as_ref().map(parse_timestamp),
    })
}

pub fn normalize_list(values: Vec<Value>) -> Vec<RemoteStory> {
    let total = values.len();
    let stories: Vec<RemoteStory> = values.into_iter().filter_map(normalize_story).collect();
    if stories.len() < total {
        tracing::warn!(
            "Dropped {} of {} stories from API response",
            total - stories.len(),
            total
        );
    }
    stories
}

pub fn normalize_login(result: WireLoginResult) -> Result<Session> {
    match (result.user_id, result.name, result.token) {
        (Some(user_id), Some(name), Some(token)) if !token.is_empty() => {
            Ok(Session::new(user_id, name, token))
        }
        _ => Err(StorylineError::transport("Login response is missing credentials")),
    }
}

fn parse_photo_url(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn parse_coordinate(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// ISO-8601 text or epoch milliseconds, integral or not.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            }),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_full_story() {
        let story = normalize_story(json!({
            "id": "story-1",
            "name": "Ann",
            "description": "At the beach",
            "photoUrl": "https://example.com/1.jpg",
            "createdAt": "2024-05-01T08:30:00.000Z",
            "lat": -8.65,
            "lon": 115.2
        }))
        .unwrap()
        .into_story();

        assert_eq!(story.id, "story-1");
        assert_eq!(story.name, "Ann");
        assert_eq!(story.photo_url.as_deref(), Some("https://example.com/1.jpg"));
        assert_eq!(story.location(), Some((-8.65, 115.2)));
        assert_eq!(
            story.created_at.unwrap().to_rfc3339(),
            "2024-05-01T08:30:00+00:00"
        );
    }

    #[test]
    fn test_normalize_sparse_story_keeps_field_presence() {
        let story = normalize_story(json!({
            "id": "s",
            "description": "new",
            "lat": null,
            "lon": "abc"
        }))
        .unwrap();

        assert_eq!(story.description.as_deref(), Some("new"));
        assert_eq!(story.name, None);
        assert_eq!(story.photo_url, None);
        assert_eq!(story.created_at, None);
        // Sent but unusable: present, and clears the local value.
        assert_eq!(story.lat, Some(None));
        assert_eq!(story.lon, Some(None));
    }

    #[test]
    fn test_normalize_epoch_millis_timestamp() {
        let story = normalize_story(json!({ "id": "s", "createdAt": 1_714_552_200_000i64 })).unwrap();
        assert_eq!(
            story.created_at.flatten().unwrap().to_rfc3339(),
            "2024-05-01T08:30:00+00:00"
        );
    }

    #[test]
    fn test_normalize_fractional_epoch_timestamp() {
        let story = normalize_story(json!({ "id": "s", "createdAt": 1.7145522e12 })).unwrap();
        assert_eq!(
            story.created_at.flatten().unwrap().to_rfc3339(),
            "2024-05-01T08:30:00+00:00"
        );

        let story = normalize_story(json!({ "id": "s", "createdAt": 1_714_552_200_000.9 })).unwrap();
        assert_eq!(
            story.created_at.flatten().unwrap().timestamp_millis(),
            1_714_552_200_000
        );
    }

    #[test]
    fn test_normalize_rejects_missing_or_blank_id() {
        assert!(normalize_story(json!({ "name": "Ann" })).is_none());
        assert!(normalize_story(json!({ "id": "  " })).is_none());
        assert!(normalize_story(json!("not an object")).is_none());
    }

    #[test]
    fn test_normalize_list_skips_bad_entries() {
        let stories = normalize_list(vec![
            json!({ "id": "a" }),
            json!({ "name": "no id" }),
            json!(42),
            json!({ "id": "b" }),
        ]);
        let ids: Vec<&str> = stories.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_decode_success() {
        let body = br#"{"error":false,"message":"Stories fetched successfully","listStory":[{"id":"a"}]}"#;
        let envelope = decode_response(200, Some("OK"), body).unwrap();
        assert_eq!(envelope.list_story.unwrap().len(), 1);
    }

    #[test]
    fn test_decode_non_2xx_uses_body_message() {
        let body = br#"{"error":true,"message":"Missing authentication"}"#;
        let err = decode_response(401, Some("Unauthorized"), body).unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "Missing authentication");
    }

    #[test]
    fn test_decode_non_2xx_without_message() {
        let err = decode_response(500, Some("Internal Server Error"), b"{}").unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[test]
    fn test_decode_malformed_body_falls_back_to_status_text() {
        let err = decode_response(502, Some("Bad Gateway"), b"<html>").unwrap_err();
        assert_eq!(err.to_string(), "Bad Gateway");

        let err = decode_response(200, None, b"<html>").unwrap_err();
        assert_eq!(err.to_string(), "HTTP 200 - Failed to parse JSON response");
    }

    #[test]
    fn test_decode_error_flag_on_2xx() {
        let body = br#"{"error":true,"message":"Story not found"}"#;
        let err = decode_response(200, Some("OK"), body).unwrap_err();
        assert_eq!(err.to_string(), "Story not found");
    }

    #[test]
    fn test_normalize_login() {
        let session = normalize_login(WireLoginResult {
            user_id: Some("user-1".into()),
            name: Some("Ann".into()),
            token: Some("tok".into()),
        })
        .unwrap();
        assert_eq!(session.bearer(), "Bearer tok");

        assert!(normalize_login(WireLoginResult::default()).is_err());
    }
}
