//! Download pipeline
//!
//! One `download` call takes a locator through announcement, fetch,
//! post-fetch filtering, and persistence. The finished announcement fires
//! after every fetch attempt, on the success and the failure path alike, so
//! listeners can pair it with the started announcement.

use tracing::{debug, warn};

use crate::events::{CrawlEvent, EventBus};
use crate::fetch::client::RequestHandler;
use crate::fetch::resource::Resource;
use crate::filter::PostfetchFilter;
use crate::store::PersistenceHandler;
use crate::uri::DiscoveredUri;

/// What became of one locator.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// Fetched, passed the filters, persisted.
    Fetched(Resource),
    /// Fetched but rejected by the named post-fetch filter.
    Filtered { filter: String },
    /// The fetch or the persist failed.
    Failed { error: String },
}

pub struct Downloader {
    handler: Box<dyn RequestHandler>,
    postfetch_filters: Vec<Box<dyn PostfetchFilter>>,
    store: Box<dyn PersistenceHandler>,
    /// Persisted-resource ceiling; 0 means unbounded.
    max_downloads: usize,
}

impl Downloader {
    pub fn new(handler: Box<dyn RequestHandler>, store: Box<dyn PersistenceHandler>) -> Self {
        Self {
            handler,
            postfetch_filters: Vec::new(),
            store,
            max_downloads: 0,
        }
    }

    pub fn set_download_limit(&mut self, max_downloads: usize) {
        self.max_downloads = max_downloads;
    }

    pub fn set_request_handler(&mut self, handler: Box<dyn RequestHandler>) {
        self.handler = handler;
    }

    pub fn set_persistence_handler(&mut self, store: Box<dyn PersistenceHandler>) {
        self.store = store;
    }

    /// Release the handler, and with it everything persisted this run.
    pub fn into_store(self) -> Box<dyn PersistenceHandler> {
        self.store
    }

    pub fn add_postfetch_filter(&mut self, filter: Box<dyn PostfetchFilter>) {
        self.postfetch_filters.push(filter);
    }

    pub fn set_run_id(&mut self, run_id: &str) {
        self.store.set_run_id(run_id);
    }

    /// Resources persisted so far.
    pub fn download_count(&self) -> usize {
        self.store.count()
    }

    /// Advisory ceiling test. The crawl loop consults this between units;
    /// nothing inside `download` stops at the ceiling.
    pub fn is_download_limit_exceeded(&self) -> bool {
        self.max_downloads != 0 && self.store.count() >= self.max_downloads
    }

    pub fn download(&mut self, uri: &DiscoveredUri, bus: &mut EventBus) -> DownloadOutcome {
        bus.publish(&CrawlEvent::RequestStarted { uri: uri.clone() });

        let fetched = self.handler.fetch(uri);
        if let Err(err) = &fetched {
            bus.publish(&CrawlEvent::RequestFailed {
                uri: uri.clone(),
                error: err.to_string(),
            });
        }
        // Finished is announced whatever the attempt produced
        bus.publish(&CrawlEvent::RequestFinished { uri: uri.clone() });

        let resource = match fetched {
            Ok(resource) => resource,
            Err(err) => {
                warn!("fetch failed for {}: {}", uri, err);
                return DownloadOutcome::Failed {
                    error: err.to_string(),
                };
            }
        };

        for filter in &self.postfetch_filters {
            if filter.matches(&resource) {
                debug!("{} rejected by {}", uri, filter.name());
                bus.publish(&CrawlEvent::ResourceFiltered {
                    uri: uri.clone(),
                    filter: filter.name().to_string(),
                });
                return DownloadOutcome::Filtered {
                    filter: filter.name().to_string(),
                };
            }
        }

        if let Err(err) = self.store.persist(&resource) {
            warn!("failed to persist {}: {}", uri, err);
            bus.publish(&CrawlEvent::PersistFailed {
                uri: uri.clone(),
                error: err.to_string(),
            });
            return DownloadOutcome::Failed {
                error: err.to_string(),
            };
        }
        bus.publish(&CrawlEvent::ResourcePersisted { uri: uri.clone() });

        DownloadOutcome::Fetched(resource)
    }
}
