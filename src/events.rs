//! Crawl lifecycle events and the listener bus
//!
//! Every announcement the engine makes is a variant of one enum, delivered
//! synchronously to listeners in subscription order on the crawling thread.
//! Listeners may block; a politeness listener that sleeps before requests
//! throttles the whole crawl, which is the intended lever.

use url::Url;

use crate::uri::DiscoveredUri;

/// Events emitted while a crawl runs.
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    /// The seed is queued and the crawl loop is about to start.
    CrawlStarted { seed: Url, run_id: String },

    /// A locator was admitted to the traversal queue.
    UriQueued { uri: DiscoveredUri },

    /// A discovered locator was dropped by the named pre-fetch filter,
    /// before any fetch.
    UriSkipped { uri: DiscoveredUri, filter: String },

    /// A fetch is about to be attempted for this locator.
    RequestStarted { uri: DiscoveredUri },

    /// The fetch attempt errored.
    RequestFailed { uri: DiscoveredUri, error: String },

    /// The fetch attempt finished, successfully or not. Always follows
    /// `RequestStarted`, on both outcomes.
    RequestFinished { uri: DiscoveredUri },

    /// A fetched resource was rejected by the named post-fetch filter.
    ResourceFiltered { uri: DiscoveredUri, filter: String },

    /// A fetched resource was handed to the persistence handler.
    ResourcePersisted { uri: DiscoveredUri },

    /// The persistence handler rejected a resource that had already been
    /// fetched and had passed the filters.
    PersistFailed { uri: DiscoveredUri, error: String },

    /// The cancel token stopped the crawl at a loop boundary.
    CrawlCancelled,

    /// The crawl loop ended; counts mirror the final report buckets.
    CrawlFinished {
        persisted: usize,
        filtered: usize,
        failed: usize,
    },
}

impl CrawlEvent {
    /// Stable name for log labels.
    pub fn event_name(&self) -> &'static str {
        match self {
            CrawlEvent::CrawlStarted { .. } => "crawl_started",
            CrawlEvent::UriQueued { .. } => "uri_queued",
            CrawlEvent::UriSkipped { .. } => "uri_skipped",
            CrawlEvent::RequestStarted { .. } => "request_started",
            CrawlEvent::RequestFailed { .. } => "request_failed",
            CrawlEvent::RequestFinished { .. } => "request_finished",
            CrawlEvent::ResourceFiltered { .. } => "resource_filtered",
            CrawlEvent::ResourcePersisted { .. } => "resource_persisted",
            CrawlEvent::PersistFailed { .. } => "persist_failed",
            CrawlEvent::CrawlCancelled => "crawl_cancelled",
            CrawlEvent::CrawlFinished { .. } => "crawl_finished",
        }
    }
}

/// Receives every crawl event, on the crawling thread.
pub trait CrawlListener {
    fn on_crawl_event(&mut self, event: &CrawlEvent);
}

/// Ordered, synchronous fan-out to subscribed listeners.
///
/// Owned by the engine instance; there is no global registry. Delivery
/// happens inline at the announcement site, in subscription order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn CrawlListener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn CrawlListener>) {
        self.listeners.push(listener);
    }

    pub fn publish(&mut self, event: &CrawlEvent) {
        for listener in &mut self.listeners {
            listener.on_crawl_event(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
