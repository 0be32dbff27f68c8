//! Persistence configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which bundled persistence handler to install
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Keep results in memory; dropped with the engine
    #[default]
    Memory,
    /// One JSON document per resource under `root/<run id>/`
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Root directory for the file backend
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            root: PathBuf::from("crawls"),
        }
    }
}
