//! Filter installation configuration
//!
//! Each knob maps onto one bundled filter; empty lists and false flags
//! install nothing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Hosts locators may point at; empty installs no host filter
    pub allowed_hosts: Vec<String>,
    /// Treat subdomains of allowed hosts as allowed
    pub allow_subdomains: bool,
    /// Schemes locators may use; empty installs no scheme filter
    pub allowed_schemes: Vec<String>,
    /// Ports locators may use; empty installs no port filter
    pub allowed_ports: Vec<u16>,
    /// Only follow locators under the seed URL
    pub restrict_to_seed: bool,
    /// Drop locators carrying a fragment
    pub skip_fragments: bool,
    /// Drop locators carrying a query string
    pub skip_queries: bool,
    /// Reject fetched resources last modified more than this many seconds
    /// ago; unset keeps everything
    pub max_age_secs: Option<u64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: Vec::new(),
            allow_subdomains: false,
            allowed_schemes: vec!["http".to_string(), "https".to_string()],
            allowed_ports: Vec::new(),
            restrict_to_seed: false,
            skip_fragments: false,
            skip_queries: false,
            max_age_secs: None,
        }
    }
}
