use serde::{Deserialize, Serialize};

/// The logged-in user. Built at login, persisted, and handed to whatever
/// needs to talk to the API on the user's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub token: String,
}

impl Session {
    pub fn new(user_id: String, name: String, token: String) -> Self {
        Self {
            user_id,
            name,
            token,
        }
    }

    /// A session missing any field is treated as logged out.
    pub fn is_complete(&self) -> bool {
        !self.user_id.is_empty() && !self.name.is_empty() && !self.token.is_empty()
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
