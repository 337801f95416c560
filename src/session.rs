//! Persisted login session.
//!
//! Read once at startup, written on login, removed on logout. The loaded
//! [`Session`] is passed explicitly to whatever needs it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::app::{Result, StorylineError};
use crate::domain::Session;

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `<data_dir>/storyline/session.json`
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| StorylineError::Config("Could not find data directory".into()))?;
        Ok(data_dir.join("storyline").join("session.json"))
    }

    /// The saved session, if a complete one exists. An unreadable or
    /// partial file is removed so the app starts cleanly logged out.
    pub fn load(&self) -> Option<Session> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Session>(&content) {
            Ok(session) if session.is_complete() => Some(session),
            Ok(_) => {
                tracing::warn!("Incomplete session file, logging out");
                self.discard();
                None
            }
            Err(e) => {
                tracing::warn!("Corrupt session file, logging out: {}", e);
                self.discard();
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if !session.is_complete() {
            return Err(StorylineError::Session(
                "Refusing to save an incomplete session".into(),
            ));
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn discard(&self) {
        if let Err(e) = self.clear() {
            tracing::warn!("Failed to remove session file: {}", e);
        }
    }
}
