//! Normalization Module
//!
//! Turns raw API responses into per-model, identifier-keyed records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::cache::expiry::compute_expiry;
use crate::cache::{IdentifierSet, Record, RecordMap};
use crate::error::{CacheError, Result};
use crate::models::{Cardinality, Model, Provider, Query, Returns, SourceDefinition};

/// Normalized records of one response, keyed by model name.
pub type NormalizedResponse = BTreeMap<String, RecordMap>;

const ITEM_MUST_BE_OBJECT: &str = "data for returning an item must be an object";
const LIST_MUST_BE_ARRAY: &str = "data for returning a list must be an array";
const LIST_ELEMENTS_MUST_BE_OBJECTS: &str = "list elements must be objects";

// == Provider Normalizer ==
/// Normalizes one payload shard into identifier-keyed records.
///
/// The shard must match `provider.cardinality` exactly: an object for an
/// item, an array of objects for a list. Nothing is wrapped or unwrapped.
///
/// # Arguments
/// * `query` - The query that triggered the fetch
/// * `provider` - Shard description
/// * `model` - Model supplying the identifier field
/// * `shard` - The payload shard
/// * `expires` - Expiry stamped on every record
pub fn normalize_provider(
    query: &Query,
    provider: &Provider,
    model: &Model,
    shard: &Value,
    expires: Option<DateTime<Utc>>,
) -> Result<RecordMap> {
    let mut records = RecordMap::new();

    match provider.cardinality {
        Cardinality::Item => {
            let object = shard
                .as_object()
                .ok_or_else(|| CacheError::shape_mismatch(&model.name, ITEM_MUST_BE_OBJECT))?;
            insert_object(&mut records, model, object, expires)?;
        }
        Cardinality::List => {
            let items = shard
                .as_array()
                .ok_or_else(|| CacheError::shape_mismatch(&model.name, LIST_MUST_BE_ARRAY))?;
            for item in items {
                let object = item.as_object().ok_or_else(|| {
                    CacheError::shape_mismatch(&model.name, LIST_ELEMENTS_MUST_BE_OBJECTS)
                })?;
                insert_object(&mut records, model, object, expires)?;
            }
        }
    }

    debug!(
        "Normalized {} {} record(s) for query {}",
        records.len(),
        model.name,
        query.model.name
    );
    Ok(records)
}

fn insert_object(
    records: &mut RecordMap,
    model: &Model,
    object: &Map<String, Value>,
    expires: Option<DateTime<Utc>>,
) -> Result<()> {
    let id = model.identifier_of(object)?;
    records.insert(id, Record::new(Value::Object(object.clone()), expires));
    Ok(())
}

// == Normalized Shard ==
/// Records produced by one provider, kept apart from the other providers of
/// the same response so the index can tell their shapes apart.
#[derive(Debug)]
pub(crate) struct NormalizedShard<'a> {
    pub(crate) provider: &'a Provider,
    pub(crate) records: RecordMap,
}

/// Runs every provider of `source` against its shard of `response`.
///
/// All records share the expiry computed at `now`. Shape mismatches from a
/// keyed source carry the response key that failed.
pub(crate) fn normalize_shards<'a>(
    query: &Query,
    source: &'a SourceDefinition,
    response: &Value,
    now: DateTime<Utc>,
) -> Result<Vec<NormalizedShard<'a>>> {
    let expires = compute_expiry(source.cache_for, query.model.cache_for, now);

    match &source.returns {
        None => Ok(Vec::new()),
        Some(Returns::Single(provider)) => {
            let records = normalize_provider(query, provider, &provider.model, response, expires)?;
            Ok(vec![NormalizedShard { provider, records }])
        }
        Some(Returns::Keyed(providers)) => {
            let mut shards = Vec::with_capacity(providers.len());
            for (key, provider) in providers {
                let shard = response.get(key.as_str()).unwrap_or(&Value::Null);
                let records = normalize_provider(query, provider, &provider.model, shard, expires)
                    .map_err(|err| err.with_response_key(key))?;
                shards.push(NormalizedShard { provider, records });
            }
            Ok(shards)
        }
    }
}

/// Identifiers a query's index entry should hold.
///
/// Takes the providers whose model and cardinality both match the query. If
/// none matches on cardinality, every provider of the query's model counts.
pub(crate) fn indexed_ids(query: &Query, shards: &[NormalizedShard<'_>]) -> IdentifierSet {
    let same_model: Vec<&NormalizedShard<'_>> = shards
        .iter()
        .filter(|shard| shard.provider.model.name == query.model.name)
        .collect();
    let any_exact = same_model
        .iter()
        .any(|shard| shard.provider.cardinality == query.cardinality);

    let mut ids = IdentifierSet::new();
    for shard in same_model {
        if !any_exact || shard.provider.cardinality == query.cardinality {
            ids.extend_from(shard.records.ids());
        }
    }
    ids
}

/// Merges shards by model name, later shards overwriting earlier ones.
pub(crate) fn merge_shards(shards: Vec<NormalizedShard<'_>>) -> NormalizedResponse {
    let mut normalized = NormalizedResponse::new();
    for shard in shards {
        normalized
            .entry(shard.provider.model.name.clone())
            .or_default()
            .merge(shard.records);
    }
    normalized
}

// == Response Normalizer ==
/// Normalizes a whole API response against a source definition.
///
/// Every record of the call shares one expiry, computed from the source
/// definition's and the query model's cache durations at `now`. Identifiers
/// produced for the query's own model are added to `returned_ids`; the
/// accumulator is never cleared here, so repeated calls build a union.
///
/// A source definition without `returns` normalizes to an empty response.
///
/// # Errors
/// Any provider failure aborts the call. Shape mismatches from a keyed
/// source carry the response key that failed.
pub fn normalize_response(
    query: &Query,
    source: &SourceDefinition,
    response: &Value,
    now: DateTime<Utc>,
    returned_ids: &mut IdentifierSet,
) -> Result<NormalizedResponse> {
    let shards = normalize_shards(query, source, response, now)?;

    for shard in &shards {
        if shard.provider.model.name == query.model.name {
            returned_ids.extend_from(shard.records.ids());
        }
    }

    Ok(merge_shards(shards))
}
