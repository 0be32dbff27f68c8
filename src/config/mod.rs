//! Configuration for the crawl engine

mod crawl;
mod fetch;
mod filter;
mod store;

pub use crawl::{CrawlConfig, PolitenessConfig};
pub use fetch::FetchConfig;
pub use filter::FilterConfig;
pub use store::{StoreBackend, StoreConfig};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default user agent for all HTTP requests
pub const DEFAULT_USER_AGENT: &str = "trawl/0.1 (+https://github.com/trawl)";

/// Main configuration for a crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Crawl behavior
    #[serde(default)]
    pub crawl: CrawlConfig,
    /// HTTP fetching
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Filter installation
    #[serde(default)]
    pub filter: FilterConfig,
    /// Request pacing
    #[serde(default)]
    pub politeness: PolitenessConfig,
    /// Persistence
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawl: CrawlConfig::default(),
            fetch: FetchConfig::default(),
            filter: FilterConfig::default(),
            politeness: PolitenessConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass rather than playing whack-a-mole.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Crawl validation
        if self.crawl.seed.trim().is_empty() {
            errors.push("crawl.seed must be set".to_string());
        } else if let Err(e) = url::Url::parse(self.crawl.seed.trim()) {
            errors.push(format!("crawl.seed is not a valid absolute URL: {}", e));
        }
        if scraper::Selector::parse(&self.crawl.link_selector).is_err() {
            errors.push(format!(
                "crawl.link_selector `{}` is not a valid CSS selector",
                self.crawl.link_selector
            ));
        }

        // Fetch validation
        if self.fetch.user_agent.trim().is_empty() {
            errors.push("fetch.user_agent must not be empty".to_string());
        }
        if self.fetch.timeout_secs == 0 {
            errors.push("fetch.timeout_secs must be positive".to_string());
        }
        if self.fetch.connect_timeout_secs == 0 {
            errors.push("fetch.connect_timeout_secs must be positive".to_string());
        }
        if self.fetch.max_content_size == 0 {
            errors.push("fetch.max_content_size must be positive".to_string());
        }

        // Filter validation
        if self.filter.max_age_secs == Some(0) {
            errors.push("filter.max_age_secs must be positive when set".to_string());
        }

        // Store validation
        if self.store.backend == StoreBackend::File && self.store.root.as_os_str().is_empty() {
            errors.push("store.root must not be empty for the file backend".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}
