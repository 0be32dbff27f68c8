//! Filesystem persistence
//!
//! Writes one pretty-printed JSON document per resource, numbered in
//! persist order under `<root>/<run id>/`.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use super::{PersistenceHandler, StoreError, StoredResource};
use crate::fetch::Resource;

pub struct FileStore {
    root: PathBuf,
    run_id: String,
    count: usize,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            run_id: "default".to_string(),
            count: 0,
        }
    }

    /// Directory the current run writes into.
    pub fn run_dir(&self) -> PathBuf {
        self.root.join(&self.run_id)
    }

    fn file_name(&self, resource: &Resource) -> String {
        let host = resource.uri.url().host_str().unwrap_or("unknown");
        let slug: String = host
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        format!("{:05}-{}.json", self.count + 1, slug)
    }
}

impl PersistenceHandler for FileStore {
    fn set_run_id(&mut self, run_id: &str) {
        self.run_id = run_id.to_string();
        // Numbering restarts with the new run directory
        self.count = 0;
    }

    fn persist(&mut self, resource: &Resource) -> Result<(), StoreError> {
        let dir = self.run_dir();
        fs::create_dir_all(&dir)?;

        let path = dir.join(self.file_name(resource));
        let doc = StoredResource::from(resource);
        fs::write(&path, serde_json::to_string_pretty(&doc)?)?;

        self.count += 1;
        debug!("persisted {} to {}", resource.uri, path.display());
        Ok(())
    }

    fn count(&self) -> usize {
        self.count
    }

    fn stored(&self) -> Result<Vec<StoredResource>, StoreError> {
        let dir = self.run_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        // Zero-padded numbering makes name order persistence order
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            documents.push(serde_json::from_str(&fs::read_to_string(path)?)?);
        }
        Ok(documents)
    }
}
