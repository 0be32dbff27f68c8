//! Trawl: Configurable Web-Crawling Engine
//!
//! A single-process crawling engine with pluggable seams, featuring:
//! - Depth-first or breadth-first traversal over one shared queue
//! - CSS-selector link discovery with per-parent depth stamping
//! - Pre-fetch URI filters and post-fetch resource filters
//! - Blocking HTTP fetching via reqwest with size and redirect limits
//! - Pluggable persistence (in-memory or one JSON file per resource)
//! - A synchronous event bus for progress observation and politeness pacing
//!
//! The visible lifecycle of one locator: discovered, normalized, deduplicated,
//! filtered, fetched, filtered again, persisted. Every event in between is
//! published on the bus, and the final [`spider::CrawlReport`] says where each
//! visited locator ended up.

pub mod config;
pub mod discovery;
pub mod events;
pub mod fetch;
pub mod filter;
pub mod listeners;
pub mod queue;
pub mod spider;
pub mod store;
pub mod uri;

pub use config::Config;
pub use discovery::{
    Discoverer, DiscovererSet, DiscoveryOutcome, SelectorDiscoverer, SelectorError,
};
pub use events::{CrawlEvent, CrawlListener, EventBus};
pub use fetch::{DownloadOutcome, Downloader, FetchError, HttpFetcher, RequestHandler, Resource};
pub use filter::{PostfetchFilter, PrefetchFilter};
pub use listeners::{LogListener, PolitenessListener};
pub use queue::{QueueError, TraversalOrder, TraversalQueue};
pub use spider::{CancelToken, CrawlReport, Spider, SpiderError};
pub use store::{FileStore, MemoryStore, PersistenceHandler, StoreError, StoredResource};
pub use uri::{normalize, DiscoveredUri};
