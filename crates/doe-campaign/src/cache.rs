//! Single-slot memoization of the most recent recommendation batch.

use doe_core::DataTable;
use serde::{Deserialize, Serialize};

/// Cached batch together with the key it was produced under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedBatch {
    /// Requested batch size the entry was produced for.
    pub batch_quantity: u64,
    /// Store epoch at production time.
    pub fingerprint: u64,
    /// The recommended configurations.
    pub batch: DataTable,
}

/// Holds at most the most recent (batch_quantity, fingerprint) entry.
///
/// Storing a new entry silently evicts the previous one; a lookup with a
/// different quantity or fingerprint is a miss, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RecommendationCache {
    entry: Option<CachedBatch>,
}

impl RecommendationCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the cached batch if both key components match.
    pub fn lookup(&self, batch_quantity: u64, fingerprint: u64) -> Option<DataTable> {
        self.entry
            .as_ref()
            .filter(|e| e.batch_quantity == batch_quantity && e.fingerprint == fingerprint)
            .map(|e| e.batch.clone())
    }

    /// Stores an entry, evicting whatever was cached before.
    pub fn store(&mut self, entry: CachedBatch) {
        self.entry = Some(entry);
    }

    /// Drops the cached entry.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Returns the live entry, if any.
    pub fn entry(&self) -> Option<&CachedBatch> {
        self.entry.as_ref()
    }
}
