//! Cache Store Module
//!
//! The normalized state container and the writer that persists query
//! responses into it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::normalize::{indexed_ids, merge_shards, normalize_shards, NormalizedResponse};
use crate::cache::{CacheStats, IdentifierSet, Record, RecordMap};
use crate::config::DeleteMode;
use crate::error::{CacheError, Result};
use crate::models::{Query, SourceDefinition};

// == Cache State ==
/// Normalized records plus the query-to-identifier index.
///
/// Cheap to snapshot behind an `Arc`; writers clone on write.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheState {
    /// model name -> identifier -> record
    records: HashMap<String, HashMap<String, Record>>,
    /// query fingerprint -> identifiers of its last successful write
    query_ids: HashMap<String, IdentifierSet>,
}

impl CacheState {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Reads ==
    /// Returns the record stored for `(model, id)`, tombstones included.
    pub fn record(&self, model: &str, id: &str) -> Option<&Record> {
        self.records.get(model).and_then(|records| records.get(id))
    }

    /// Returns the identifiers indexed for a query fingerprint.
    ///
    /// `None` means the query was never stored; an empty set means it was
    /// stored and returned nothing.
    pub fn query_ids(&self, fingerprint: &str) -> Option<&IdentifierSet> {
        self.query_ids.get(fingerprint)
    }

    // == Writes ==
    /// Merges records into a model's mapping, overwriting by identifier.
    pub fn merge_records(&mut self, model: &str, records: RecordMap) {
        let stored = self.records.entry(model.to_string()).or_default();
        for (id, record) in records.into_records() {
            stored.insert(id, record);
        }
    }

    /// Replaces the index entry for a fingerprint.
    pub fn set_query_ids(&mut self, fingerprint: &str, ids: IdentifierSet) {
        self.query_ids.insert(fingerprint.to_string(), ids);
    }

    /// Removes a record outright. Returns true if it existed.
    pub fn remove_record(&mut self, model: &str, id: &str) -> bool {
        let Some(records) = self.records.get_mut(model) else {
            return false;
        };
        let removed = records.remove(id).is_some();
        if records.is_empty() {
            self.records.remove(model);
        }
        removed
    }

    /// Marks a record deleted. Returns true if it existed.
    pub fn tombstone_record(&mut self, model: &str, id: &str) -> bool {
        match self.records.get_mut(model).and_then(|records| records.get_mut(id)) {
            Some(record) => {
                record.tombstone();
                true
            }
            None => false,
        }
    }

    /// Merges a whole normalized response.
    pub fn apply(&mut self, normalized: NormalizedResponse) {
        for (model, records) in normalized {
            self.merge_records(&model, records);
        }
    }

    // == Purge Expired ==
    /// Drops expired records and tombstones.
    ///
    /// Both already read as absent, so query results are unchanged. Returns
    /// the number of records removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        for records in self.records.values_mut() {
            let before = records.len();
            records.retain(|_, record| record.is_live(now));
            removed += before - records.len();
        }
        self.records.retain(|_, records| !records.is_empty());
        removed
    }

    /// True if some record is deleted or expired at `now`.
    pub fn has_stale(&self, now: DateTime<Utc>) -> bool {
        self.records
            .values()
            .flat_map(|records| records.values())
            .any(|record| !record.is_live(now))
    }

    // == Stats ==
    /// Returns a summary of the state as seen at `now`.
    pub fn stats(&self, now: DateTime<Utc>) -> CacheStats {
        let mut stats = CacheStats::new();
        stats.set_indexed_queries(self.query_ids.len());
        stats.set_models(self.records.len());
        for record in self.records.values().flat_map(|records| records.values()) {
            stats.record(record, now);
        }
        stats
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.query_ids.is_empty()
    }
}

// == Store Query ==
/// Persists the result of a query into `state`.
///
/// Delete queries remove (or tombstone) `query.model_id` and replace the
/// delete query's own index entry with the empty set. Other queries' index
/// entries keep the identifier, so their next read reports the gap.
///
/// Any other query is normalized first, then every record is merged and the
/// query's index entry is replaced by the identifiers of the providers that
/// match the query's model and cardinality (or, when no provider matches the
/// cardinality, of every provider of its model). A normalization failure
/// returns before `state` is touched.
///
/// # Returns
/// The identifiers written to the query's index entry, for the caller's
/// own `returnedIds` bookkeeping.
pub fn store_query(
    state: &mut CacheState,
    query: &Query,
    source: &SourceDefinition,
    response: &Value,
    now: DateTime<Utc>,
    delete_mode: DeleteMode,
) -> Result<IdentifierSet> {
    let fingerprint = query.fingerprint();

    if query.is_delete() {
        let id = query
            .model_id
            .as_deref()
            .ok_or_else(|| CacheError::MissingModelId {
                model: query.model.name.clone(),
            })?;
        let existed = match delete_mode {
            DeleteMode::Tombstone => state.tombstone_record(&query.model.name, id),
            DeleteMode::Remove => state.remove_record(&query.model.name, id),
        };
        state.set_query_ids(&fingerprint, IdentifierSet::new());
        if existed {
            info!("Deleted {} {} ({:?})", query.model.name, id, delete_mode);
        } else {
            debug!("Delete of uncached {} {} ignored", query.model.name, id);
        }
        return Ok(IdentifierSet::new());
    }

    if source.returns.is_none() {
        debug!(
            "Source for {:?} {} query returns nothing to cache",
            query.query_type, query.model.name
        );
        return Ok(IdentifierSet::new());
    }

    let shards = normalize_shards(query, source, response, now)?;
    let indexed = indexed_ids(query, &shards);
    let normalized = merge_shards(shards);

    let total: usize = normalized.values().map(RecordMap::len).sum();
    state.apply(normalized);
    state.set_query_ids(&fingerprint, indexed.clone());

    debug!(
        "Stored {} record(s) for {} query {}, indexed {} id(s)",
        total,
        query.model.name,
        fingerprint,
        indexed.len()
    );
    Ok(indexed)
}
