use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gateway::http::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use crate::gateway::DEFAULT_PAGE_SIZE;

/// Remote story API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the story API
    pub base_url: String,

    /// Stories per page on the main list (default: 20)
    pub page_size: u32,

    /// Seconds to wait for the API before showing offline data (default: 10)
    pub network_timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            network_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_secs.max(1))
    }
}
