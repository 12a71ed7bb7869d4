//! Read-through cache of projected ledgers.

use dashmap::DashMap;
use log::debug;
use std::sync::Arc;

use super::projector::BalanceSeries;
use crate::errors::Result;

/// Projected ledgers keyed by account id.
///
/// Entries are only ever produced by the projector and are dropped whenever a
/// movement is appended to their account. The cache never answers for an
/// account it has not loaded; a miss always goes back to the fold.
#[derive(Default)]
pub struct BalanceCache {
    entries: DashMap<String, Arc<BalanceSeries>>,
}

impl BalanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached series for `account_id`, computing it with `load` on a miss.
    ///
    /// The entry's shard stays locked while `load` runs, so an invalidation
    /// racing with a load waits and then removes the freshly loaded value.
    pub fn get_or_load<F>(&self, account_id: &str, load: F) -> Result<Arc<BalanceSeries>>
    where
        F: FnOnce() -> Result<BalanceSeries>,
    {
        if let Some(hit) = self.entries.get(account_id) {
            return Ok(hit.value().clone());
        }

        let entry = self
            .entries
            .entry(account_id.to_string())
            .or_try_insert_with(|| {
                debug!("Balance cache miss for account {}", account_id);
                load().map(Arc::new)
            })?;
        Ok(entry.value().clone())
    }

    /// Drops the cached series of one account.
    pub fn invalidate(&self, account_id: &str) {
        if self.entries.remove(account_id).is_some() {
            debug!("Invalidated balance cache for account {}", account_id);
        }
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn contains(&self, account_id: &str) -> bool {
        self.entries.contains_key(account_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
