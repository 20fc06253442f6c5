//! In-memory HSN source implementation for testing

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::hsn::HsnEntry;
use crate::traits::HsnSource;
use crate::types::EinvoiceResult;

/// In-memory HSN reference-data source for testing and development
#[derive(Debug, Clone)]
pub struct MemoryHsnSource {
    entries: Arc<RwLock<Vec<HsnEntry>>>,
}

impl MemoryHsnSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a source pre-populated with entries
    pub fn with_entries(entries: Vec<HsnEntry>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Add an entry to the source
    pub fn push(&self, entry: HsnEntry) {
        self.entries.write().unwrap().push(entry);
    }

    /// Clear all entries (useful for testing)
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }
}

impl Default for MemoryHsnSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HsnSource for MemoryHsnSource {
    async fn load_entries(&self) -> EinvoiceResult<Vec<HsnEntry>> {
        Ok(self.entries.read().unwrap().clone())
    }
}
