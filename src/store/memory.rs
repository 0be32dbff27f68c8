//! In-memory persistence

use super::{PersistenceHandler, StoreError, StoredResource};
use crate::fetch::Resource;

/// Keeps persisted documents in memory. The default handler; everything is
/// dropped with the engine.
#[derive(Debug, Default)]
pub struct MemoryStore {
    run_id: Option<String>,
    resources: Vec<StoredResource>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }
}

impl PersistenceHandler for MemoryStore {
    fn set_run_id(&mut self, run_id: &str) {
        self.run_id = Some(run_id.to_string());
    }

    fn persist(&mut self, resource: &Resource) -> Result<(), StoreError> {
        self.resources.push(StoredResource::from(resource));
        Ok(())
    }

    fn count(&self) -> usize {
        self.resources.len()
    }

    fn stored(&self) -> Result<Vec<StoredResource>, StoreError> {
        Ok(self.resources.clone())
    }
}
