use std::sync::RwLock;

use dcp_types::TransparencyLogEntry;

use crate::error::{LogError, Result};
use crate::traits::LogStore;

/// In-memory store for tests, demos and embedding.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    entries: RwLock<Vec<TransparencyLogEntry>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogStore for MemoryLogStore {
    fn append(&self, entry: &TransparencyLogEntry) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| LogError::poisoned("memory store write"))?;
        entries.push(entry.clone());
        Ok(())
    }

    fn get(&self, index: u64) -> Result<Option<TransparencyLogEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| LogError::poisoned("memory store read"))?;
        Ok(usize::try_from(index).ok().and_then(|i| entries.get(i)).cloned())
    }

    fn len(&self) -> Result<u64> {
        let entries = self
            .entries
            .read()
            .map_err(|_| LogError::poisoned("memory store read"))?;
        Ok(entries.len() as u64)
    }

    fn read_all(&self) -> Result<Vec<TransparencyLogEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| LogError::poisoned("memory store read"))?;
        Ok(entries.clone())
    }
}
