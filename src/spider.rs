//! The crawl engine
//!
//! `Spider` wires the queue, the discoverer set, the downloader, and the
//! event bus into one sequential crawl loop. All state is instance state;
//! two spiders in one process share nothing. A spider runs one crawl, which
//! consumes it.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::config::{Config, CrawlConfig, FetchConfig, StoreBackend};
use crate::discovery::{Discoverer, DiscovererSet, SelectorDiscoverer};
use crate::events::{CrawlEvent, CrawlListener, EventBus};
use crate::fetch::{DownloadOutcome, Downloader, HttpFetcher, RequestHandler};
use crate::filter::{
    AllowedHosts, AllowedPorts, AllowedSchemes, MustBeFresh, PostfetchFilter, PrefetchFilter,
    RestrictToBase, UriWithHash, UriWithQuery,
};
use crate::listeners::PolitenessListener;
use crate::queue::{QueueError, TraversalOrder, TraversalQueue};
use crate::store::{FileStore, MemoryStore, PersistenceHandler};
use crate::uri::DiscoveredUri;

#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("invalid seed URL `{seed}`: {reason}")]
    InvalidSeed { seed: String, reason: String },
    #[error("configuration error: {0}")]
    Config(String),
}

/// Cloneable cancellation flag, checked once per loop iteration.
///
/// Wiring it to an OS signal is the embedding application's business; the
/// engine only reads the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Where every visited locator ended up.
pub struct CrawlReport {
    /// Locators fetched and persisted, with their depth
    pub persisted: Vec<(Url, u32)>,
    /// Locators rejected by a filter, with the rejecting filter's name
    pub filtered: Vec<(Url, String)>,
    /// Locators whose fetch or persist failed, with the error message
    pub failed: Vec<(Url, String)>,
    store: Box<dyn PersistenceHandler>,
}

impl CrawlReport {
    pub fn persisted_count(&self) -> usize {
        self.persisted.len()
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// The handler the crawl persisted through. `PersistenceHandler::stored`
    /// reads the documents back in persistence order.
    pub fn store(&self) -> &dyn PersistenceHandler {
        self.store.as_ref()
    }

    /// Take ownership of the handler.
    pub fn into_store(self) -> Box<dyn PersistenceHandler> {
        self.store
    }
}

impl fmt::Debug for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlReport")
            .field("persisted", &self.persisted)
            .field("filtered", &self.filtered)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

pub struct Spider {
    seed: DiscoveredUri,
    run_id: String,
    queue: TraversalQueue,
    discoverers: DiscovererSet,
    downloader: Downloader,
    bus: EventBus,
    cancel: CancelToken,
}

impl Spider {
    /// Build a spider for the given seed.
    ///
    /// The seed is validated here: an empty or unparsable value is a
    /// construction error, reported before anything is fetched. Defaults
    /// are depth-first traversal, depth ceiling 3, unbounded queue and
    /// downloads, an in-memory store, and no discoverers, filters, or
    /// listeners.
    pub fn new(seed: &str) -> Result<Self, SpiderError> {
        let trimmed = seed.trim();
        if trimmed.is_empty() {
            return Err(SpiderError::InvalidSeed {
                seed: seed.to_string(),
                reason: "seed is empty".to_string(),
            });
        }
        let url = Url::parse(trimmed).map_err(|e| SpiderError::InvalidSeed {
            seed: seed.to_string(),
            reason: e.to_string(),
        })?;

        let fetcher = HttpFetcher::new(&FetchConfig::default())
            .map_err(|e| SpiderError::Config(e.to_string()))?;
        let defaults = CrawlConfig::default();

        Ok(Self {
            run_id: derive_run_id(&url),
            seed: DiscoveredUri::new(url, 0),
            queue: TraversalQueue::new(defaults.traversal),
            discoverers: DiscovererSet::new(defaults.max_depth),
            downloader: Downloader::new(Box::new(fetcher), Box::new(MemoryStore::new())),
            bus: EventBus::new(),
            cancel: CancelToken::new(),
        })
    }

    /// Build a fully wired spider from configuration: the configured link
    /// discoverer, filters, store, and politeness pacing are installed.
    pub fn from_config(config: &Config) -> Result<Self, SpiderError> {
        let mut spider = Self::new(&config.crawl.seed)?;

        spider.set_traversal_order(config.crawl.traversal);
        spider.set_max_depth(config.crawl.max_depth);
        spider.set_queue_capacity(config.crawl.max_queue_size);
        spider.set_download_limit(config.crawl.max_downloads);
        if let Some(run_id) = &config.crawl.run_id {
            spider.set_run_id(run_id);
        }

        let fetcher =
            HttpFetcher::new(&config.fetch).map_err(|e| SpiderError::Config(e.to_string()))?;
        spider.set_request_handler(Box::new(fetcher));

        let discoverer = SelectorDiscoverer::new(&config.crawl.link_selector)
            .map_err(|e| SpiderError::Config(e.to_string()))?;
        spider.add_discoverer(Box::new(discoverer));

        let filters = &config.filter;
        if !filters.allowed_schemes.is_empty() {
            spider.add_prefetch_filter(Box::new(AllowedSchemes::new(
                filters.allowed_schemes.clone(),
            )));
        }
        if !filters.allowed_hosts.is_empty() {
            spider.add_prefetch_filter(Box::new(AllowedHosts::new(
                filters.allowed_hosts.clone(),
                filters.allow_subdomains,
            )));
        }
        if !filters.allowed_ports.is_empty() {
            spider.add_prefetch_filter(Box::new(AllowedPorts::new(filters.allowed_ports.clone())));
        }
        if filters.restrict_to_seed {
            let base = spider.seed.url().clone();
            spider.add_prefetch_filter(Box::new(RestrictToBase::new(&base)));
        }
        if filters.skip_fragments {
            spider.add_prefetch_filter(Box::new(UriWithHash));
        }
        if filters.skip_queries {
            spider.add_prefetch_filter(Box::new(UriWithQuery));
        }
        if let Some(max_age_secs) = filters.max_age_secs {
            spider.add_postfetch_filter(Box::new(MustBeFresh::from_secs(max_age_secs as i64)));
        }

        if config.politeness.delay_ms > 0 {
            spider.subscribe(Box::new(PolitenessListener::from_millis(
                config.politeness.delay_ms,
            )));
        }

        match config.store.backend {
            StoreBackend::Memory => {}
            StoreBackend::File => {
                spider.set_persistence_handler(Box::new(FileStore::new(&config.store.root)));
            }
        }

        Ok(spider)
    }

    pub fn add_discoverer(&mut self, discoverer: Box<dyn Discoverer>) {
        self.discoverers.add_discoverer(discoverer);
    }

    pub fn add_prefetch_filter(&mut self, filter: Box<dyn PrefetchFilter>) {
        self.discoverers.add_prefetch_filter(filter);
    }

    pub fn add_postfetch_filter(&mut self, filter: Box<dyn PostfetchFilter>) {
        self.downloader.add_postfetch_filter(filter);
    }

    pub fn subscribe(&mut self, listener: Box<dyn CrawlListener>) {
        self.bus.subscribe(listener);
    }

    pub fn set_traversal_order(&mut self, order: TraversalOrder) {
        self.queue.set_order(order);
    }

    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.discoverers.set_max_depth(max_depth);
    }

    pub fn set_queue_capacity(&mut self, capacity: usize) {
        self.queue.set_capacity(capacity);
    }

    pub fn set_download_limit(&mut self, max_downloads: usize) {
        self.downloader.set_download_limit(max_downloads);
    }

    pub fn set_request_handler(&mut self, handler: Box<dyn RequestHandler>) {
        self.downloader.set_request_handler(handler);
    }

    pub fn set_persistence_handler(&mut self, store: Box<dyn PersistenceHandler>) {
        self.downloader.set_persistence_handler(store);
    }

    pub fn set_run_id(&mut self, run_id: &str) {
        self.run_id = run_id.to_string();
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn seed_url(&self) -> &Url {
        self.seed.url()
    }

    /// A handle for stopping the crawl from another thread or a listener.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the crawl to completion and report where every visited locator
    /// ended up.
    ///
    /// The loop stops when the queue is exhausted, the cancel token is set,
    /// or the download ceiling reports exceeded. A full queue mid-discovery
    /// drops the rest of that unit's children without stopping the crawl.
    /// The report carries the persistence handler out of the finished crawl.
    pub fn crawl(mut self) -> CrawlReport {
        let mut persisted: Vec<(Url, u32)> = Vec::new();
        let mut filtered: Vec<(Url, String)> = Vec::new();
        let mut failed: Vec<(Url, String)> = Vec::new();

        // A rejected seed produces an empty crawl with the rejection on
        // record
        if let Err(err) = self.queue.enqueue(self.seed.clone()) {
            failed.push((self.seed.url().clone(), err.to_string()));
            return CrawlReport {
                persisted,
                filtered,
                failed,
                store: self.downloader.into_store(),
            };
        }

        self.downloader.set_run_id(&self.run_id);
        self.bus.publish(&CrawlEvent::CrawlStarted {
            seed: self.seed.url().clone(),
            run_id: self.run_id.clone(),
        });
        self.bus.publish(&CrawlEvent::UriQueued {
            uri: self.seed.clone(),
        });
        info!("crawl {} starting from {}", self.run_id, self.seed);

        while let Some(uri) = self.queue.dequeue() {
            if self.cancel.is_cancelled() {
                info!("crawl {} cancelled", self.run_id);
                self.bus.publish(&CrawlEvent::CrawlCancelled);
                break;
            }
            if self.downloader.is_download_limit_exceeded() {
                debug!("download ceiling reached, stopping");
                break;
            }

            let resource = match self.downloader.download(&uri, &mut self.bus) {
                DownloadOutcome::Fetched(resource) => {
                    persisted.push((uri.url().clone(), uri.depth()));
                    resource
                }
                DownloadOutcome::Filtered { filter } => {
                    filtered.push((uri.url().clone(), filter));
                    continue;
                }
                DownloadOutcome::Failed { error } => {
                    failed.push((uri.url().clone(), error));
                    continue;
                }
            };

            let discovery = self.discoverers.discover(&resource);
            for (child, filter) in discovery.rejected {
                filtered.push((child.url().clone(), filter.clone()));
                self.bus
                    .publish(&CrawlEvent::UriSkipped { uri: child, filter });
            }
            for child in discovery.admitted {
                match self.queue.enqueue(child.clone()) {
                    Ok(()) => self.bus.publish(&CrawlEvent::UriQueued { uri: child }),
                    Err(QueueError::CapacityReached { max }) => {
                        // The rest of this unit's children are dropped; the
                        // crawl keeps draining what was already admitted
                        debug!(
                            "queue capacity {} reached, dropping remaining discoveries from {}",
                            max, uri
                        );
                        break;
                    }
                }
            }
        }

        self.bus.publish(&CrawlEvent::CrawlFinished {
            persisted: persisted.len(),
            filtered: filtered.len(),
            failed: failed.len(),
        });
        info!(
            "crawl {} finished: {} persisted, {} filtered, {} failed",
            self.run_id,
            persisted.len(),
            filtered.len(),
            failed.len()
        );

        CrawlReport {
            persisted,
            filtered,
            failed,
            store: self.downloader.into_store(),
        }
    }
}

fn derive_run_id(seed: &Url) -> String {
    let host = seed.host_str().unwrap_or("crawl");
    format!("{}-{}", host, Utc::now().format("%Y%m%d%H%M%S"))
}
