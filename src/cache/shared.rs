//! Shared Cache Container
//!
//! Holds the current [`CacheState`] behind an `Arc` so readers get immutable
//! snapshots while writers swap in a new version.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::cache::lock::{rw_read, rw_write};
use crate::cache::resolve::{get_query_data, QueryData};
use crate::cache::store::{store_query, CacheState};
use crate::cache::{CacheStats, IdentifierSet};
use crate::config::Config;
use crate::error::Result;
use crate::models::{Query, SourceDefinition};

// == Cache ==
/// Thread-safe owner of the cache state.
///
/// Writes are atomic per call: a failed normalization leaves the current
/// state as it was. Snapshots taken before a write never observe it.
#[derive(Debug)]
pub struct Cache {
    state: RwLock<Arc<CacheState>>,
    config: Config,
}

impl Cache {
    // == Constructor ==
    pub fn new(config: Config) -> Self {
        Self {
            state: RwLock::new(Arc::new(CacheState::new())),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // == Snapshot ==
    /// Returns the current state. Later writes do not affect it.
    pub fn snapshot(&self) -> Arc<CacheState> {
        Arc::clone(&rw_read(&self.state, "snapshot"))
    }

    // == Store Query ==
    /// Normalizes and stores a response, or applies a delete query.
    ///
    /// See [`store_query`] for the write rules.
    pub fn store_query(
        &self,
        query: &Query,
        source: &SourceDefinition,
        response: &Value,
        now: DateTime<Utc>,
    ) -> Result<IdentifierSet> {
        let mut guard = rw_write(&self.state, "store_query");
        let state = Arc::make_mut(&mut guard);
        store_query(state, query, source, response, now, self.config.delete_mode)
    }

    // == Get Query Data ==
    /// Resolves a query against the current snapshot.
    pub fn get_query_data(&self, query: &Query, now: DateTime<Utc>) -> QueryData {
        get_query_data(query, &self.snapshot(), now)
    }

    // == Purge Expired ==
    /// Removes expired records and tombstones. Returns the number removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut guard = rw_write(&self.state, "purge_expired");
        // Skip the copy-on-write clone when a snapshot is out and nothing is stale.
        if !guard.has_stale(now) {
            return 0;
        }
        Arc::make_mut(&mut guard).purge_expired(now)
    }

    // == Stats ==
    pub fn stats(&self, now: DateTime<Utc>) -> CacheStats {
        self.snapshot().stats(now)
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
