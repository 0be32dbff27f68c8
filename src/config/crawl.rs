//! Crawl behavior and politeness configuration

use serde::{Deserialize, Serialize};

use crate::discovery::SelectorDiscoverer;
use crate::queue::TraversalOrder;

/// Crawl engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Seed URL the crawl starts from
    pub seed: String,
    /// Depth at which discovery stops. Units at this depth are still
    /// fetched; they yield no children
    pub max_depth: u32,
    /// Locators ever admitted to the queue (0 = unbounded)
    pub max_queue_size: usize,
    /// Resources persisted before the crawl stops (0 = unbounded)
    pub max_downloads: usize,
    /// Traversal order
    pub traversal: TraversalOrder,
    /// CSS selector used for link discovery
    pub link_selector: String,
    /// Run identifier; derived from the seed host and start time when unset
    pub run_id: Option<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed: String::new(),
            max_depth: 3,
            max_queue_size: 0,
            max_downloads: 0,
            traversal: TraversalOrder::DepthFirst,
            link_selector: SelectorDiscoverer::DEFAULT_SELECTOR.to_string(),
            run_id: None,
        }
    }
}

/// Politeness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolitenessConfig {
    /// Delay between requests in milliseconds (0 disables pacing)
    pub delay_ms: u64,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self { delay_ms: 500 }
    }
}
