//! Persistence of fetched resources
//!
//! The engine persists through one trait. The bundled handlers keep
//! documents in memory or write one JSON file per resource under a per-run
//! directory; embedding applications supply their own handler for anything
//! else.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::fetch::Resource;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Sink for fetched resources. One handler serves one run at a time.
pub trait PersistenceHandler {
    /// Called once per crawl, before the first persist.
    fn set_run_id(&mut self, run_id: &str);

    fn persist(&mut self, resource: &Resource) -> Result<(), StoreError>;

    /// Resources persisted this run; drives the download ceiling.
    fn count(&self) -> usize;

    /// All documents persisted this run, in persistence order.
    fn stored(&self) -> Result<Vec<StoredResource>, StoreError>;
}

/// Serialized form of a persisted resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResource {
    pub url: Url,
    pub final_url: Url,
    pub depth: u32,
    pub status: u16,
    pub content_type: Option<String>,
    pub fetched_at: DateTime<Utc>,
    pub body: String,
}

impl From<&Resource> for StoredResource {
    fn from(resource: &Resource) -> Self {
        Self {
            url: resource.uri.url().clone(),
            final_url: resource.final_url.clone(),
            depth: resource.uri.depth(),
            status: resource.status,
            content_type: resource.content_type.clone(),
            fetched_at: resource.fetched_at,
            body: resource.body.clone(),
        }
    }
}
