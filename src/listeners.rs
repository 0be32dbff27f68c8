//! Bundled crawl listeners

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::events::{CrawlEvent, CrawlListener};

/// Paces requests by sleeping before each fetch.
///
/// Event delivery is synchronous, so the sleep happens on the crawling
/// thread; that is the lever this listener pulls to throttle the crawl.
pub struct PolitenessListener {
    delay: Duration,
    last_request: Option<Instant>,
}

impl PolitenessListener {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: None,
        }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }
}

impl CrawlListener for PolitenessListener {
    fn on_crawl_event(&mut self, event: &CrawlEvent) {
        if let CrawlEvent::RequestStarted { uri } = event {
            if let Some(last) = self.last_request {
                let elapsed = last.elapsed();
                if elapsed < self.delay {
                    let wait = self.delay - elapsed;
                    debug!("waiting {:?} before fetching {}", wait, uri);
                    thread::sleep(wait);
                }
            }
            self.last_request = Some(Instant::now());
        }
    }
}

/// Emits one log line per crawl event.
#[derive(Debug, Default)]
pub struct LogListener;

impl CrawlListener for LogListener {
    fn on_crawl_event(&mut self, event: &CrawlEvent) {
        match event {
            CrawlEvent::CrawlStarted { seed, run_id } => {
                info!("crawl {} started from {}", run_id, seed);
            }
            CrawlEvent::UriQueued { uri } => {
                trace!("queued {} (depth {})", uri, uri.depth());
            }
            CrawlEvent::UriSkipped { uri, filter } => {
                debug!("{} dropped by {}", uri, filter);
            }
            CrawlEvent::RequestStarted { uri } => {
                debug!("fetching {} (depth {})", uri, uri.depth());
            }
            CrawlEvent::RequestFailed { uri, error } => {
                warn!("request for {} failed: {}", uri, error);
            }
            CrawlEvent::RequestFinished { uri } => {
                trace!("request for {} finished", uri);
            }
            CrawlEvent::ResourceFiltered { uri, filter } => {
                debug!("{} rejected by {}", uri, filter);
            }
            CrawlEvent::ResourcePersisted { uri } => {
                info!("persisted {} (depth {})", uri, uri.depth());
            }
            CrawlEvent::PersistFailed { uri, error } => {
                warn!("failed to persist {}: {}", uri, error);
            }
            CrawlEvent::CrawlCancelled => {
                info!("crawl cancelled");
            }
            CrawlEvent::CrawlFinished {
                persisted,
                filtered,
                failed,
            } => {
                info!(
                    "crawl finished: {} persisted, {} filtered, {} failed",
                    persisted, filtered, failed
                );
            }
        }
    }
}
