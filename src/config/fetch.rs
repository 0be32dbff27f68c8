//! HTTP fetching configuration

use serde::{Deserialize, Serialize};

use super::DEFAULT_USER_AGENT;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User agent string sent with every request
    pub user_agent: String,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Maximum response size (bytes)
    pub max_content_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
            max_content_size: 10 * 1024 * 1024, // 10 MB
        }
    }
}
