//! Query Resolver
//!
//! Rebuilds a query's result from a cache snapshot and reports whether the
//! result is complete enough to skip a refetch.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::cache::{CacheState, Record};
use crate::models::{Cardinality, Query};

// == Query Data ==
/// Result of resolving a query against a snapshot.
///
/// `complete == false` is not an error: it tells the caller that some
/// referenced data is missing, deleted, or expired and a refetch is due.
/// List results may still carry the records that were valid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryData {
    pub data: Option<Value>,
    pub complete: bool,
}

impl QueryData {
    fn missing() -> Self {
        Self {
            data: None,
            complete: false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Splits into `(data, complete)`.
    pub fn into_parts(self) -> (Option<Value>, bool) {
        (self.data, self.complete)
    }
}

// == Get Query Data ==
/// Reconstructs the item or list `query` denotes from `state`.
///
/// - Query never stored: `(None, false)`
/// - Item: the single indexed record's data, or `(None, false)` if it is
///   missing, deleted, expired, or lacks a selected field
/// - List: every servable record's data in index order; any unservable
///   record is skipped and marks the result incomplete. A query stored
///   with zero results resolves to `([], true)`.
///
/// Never mutates `state`.
pub fn get_query_data(query: &Query, state: &CacheState, now: DateTime<Utc>) -> QueryData {
    let Some(ids) = state.query_ids(&query.fingerprint()) else {
        return QueryData::missing();
    };

    match query.cardinality {
        Cardinality::Item => {
            if ids.len() > 1 {
                warn!(
                    "Item query for {} indexed {} ids, using the first",
                    query.model.name,
                    ids.len()
                );
            }
            match ids.first().and_then(|id| servable(state, query, id, now)) {
                Some(record) => QueryData {
                    data: Some(record.data.clone()),
                    complete: true,
                },
                None => QueryData::missing(),
            }
        }
        Cardinality::List => {
            let mut complete = true;
            let mut items = Vec::with_capacity(ids.len());
            for id in ids.iter() {
                match servable(state, query, id, now) {
                    Some(record) => items.push(record.data.clone()),
                    None => complete = false,
                }
            }
            QueryData {
                data: Some(Value::Array(items)),
                complete,
            }
        }
    }
}

/// Returns the record for `id` if it is live and carries the selected fields.
fn servable<'a>(
    state: &'a CacheState,
    query: &Query,
    id: &str,
    now: DateTime<Utc>,
) -> Option<&'a Record> {
    state
        .record(&query.model.name, id)
        .filter(|record| record.is_live(now) && query.fields.satisfied_by(&record.data))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::store_query;
    use crate::config::DeleteMode;
    use crate::models::{Fields, Model, Provider, SourceDefinition};
    use chrono::TimeDelta;
    use serde_json::json;

    fn user() -> Model {
        Model::new("user", "id")
    }

    fn users_response() -> Value {
        json!([
            {"id": 1, "name": "foo", "email": "foo@bar.com"},
            {"id": 2, "name": "baz", "email": "baz@bar.com"}
        ])
    }

    fn stored_list(now: DateTime<Utc>, cache_for: Option<u64>) -> (CacheState, Query) {
        let mut state = CacheState::new();
        let query = Query::list(user());
        let mut sd = SourceDefinition::single(Provider::list(user()));
        sd.cache_for = cache_for;
        store_query(&mut state, &query, &sd, &users_response(), now, DeleteMode::Tombstone).unwrap();
        (state, query)
    }

    #[test]
    fn test_unindexed_query() {
        let state = CacheState::new();
        let result = get_query_data(&Query::list(user()), &state, Utc::now());
        assert_eq!(result.into_parts(), (None, false));
    }

    #[test]
    fn test_item_after_get() {
        let mut state = CacheState::new();
        let query = Query::item(user()).with_param("id", 1);
        let sd = SourceDefinition::single(Provider::item(user()));
        let response = json!({"id": 1, "name": "foo", "email": "foo@bar.com"});
        store_query(&mut state, &query, &sd, &response, Utc::now(), DeleteMode::Tombstone).unwrap();

        let (data, complete) = get_query_data(&query, &state, Utc::now()).into_parts();
        assert!(complete);
        assert_eq!(data, Some(response));
    }

    #[test]
    fn test_list_after_get() {
        let now = Utc::now();
        let (state, query) = stored_list(now, None);

        let (data, complete) = get_query_data(&query, &state, now).into_parts();
        assert!(complete);
        assert_eq!(data, Some(users_response()));
    }

    #[test]
    fn test_partial_list_after_delete() {
        let now = Utc::now();
        let (mut state, query) = stored_list(now, None);
        store_query(
            &mut state,
            &Query::delete(user(), 1),
            &SourceDefinition::delete(),
            &Value::Null,
            now,
            DeleteMode::Tombstone,
        )
        .unwrap();

        let (data, complete) = get_query_data(&query, &state, now).into_parts();
        assert!(!complete);
        assert_eq!(data, Some(json!([users_response()[1]])));
    }

    #[test]
    fn test_expired_list() {
        let now = Utc::now();
        let (state, query) = stored_list(now, Some(60));

        assert!(get_query_data(&query, &state, now + TimeDelta::seconds(59)).is_complete());

        let expired = get_query_data(&query, &state, now + TimeDelta::seconds(60));
        assert!(!expired.is_complete());
        assert_eq!(expired.data, Some(json!([])));
    }

    #[test]
    fn test_expired_item() {
        let now = Utc::now();
        let mut state = CacheState::new();
        let query = Query::item(user());
        let sd = SourceDefinition::single(Provider::item(user())).with_cache_for(10);
        store_query(&mut state, &query, &sd, &json!({"id": 1}), now, DeleteMode::Tombstone).unwrap();

        let result = get_query_data(&query, &state, now + TimeDelta::seconds(10));
        assert_eq!(result.into_parts(), (None, false));
    }

    #[test]
    fn test_deleted_item() {
        let now = Utc::now();
        let mut state = CacheState::new();
        let query = Query::item(user());
        store_query(
            &mut state,
            &query,
            &SourceDefinition::single(Provider::item(user())),
            &json!({"id": 1}),
            now,
            DeleteMode::Tombstone,
        )
        .unwrap();
        store_query(
            &mut state,
            &Query::delete(user(), 1),
            &SourceDefinition::delete(),
            &Value::Null,
            now,
            DeleteMode::Remove,
        )
        .unwrap();

        assert_eq!(get_query_data(&query, &state, now).into_parts(), (None, false));
    }

    #[test]
    fn test_empty_list_is_complete() {
        let now = Utc::now();
        let mut state = CacheState::new();
        let query = Query::list(user());
        store_query(
            &mut state,
            &query,
            &SourceDefinition::single(Provider::list(user())),
            &json!([]),
            now,
            DeleteMode::Tombstone,
        )
        .unwrap();

        assert_eq!(
            get_query_data(&query, &state, now).into_parts(),
            (Some(json!([])), true)
        );
    }

    #[test]
    fn test_missing_selected_field_is_incomplete() {
        let now = Utc::now();
        let (state, query) = stored_list(now, None);

        let wants_name = query.clone().with_fields(Fields::Only(vec!["name".into()]));
        assert!(get_query_data(&wants_name, &state, now).is_complete());

        let wants_avatar = query.with_fields(Fields::Only(vec!["avatar".into()]));
        let result = get_query_data(&wants_avatar, &state, now);
        assert!(!result.is_complete());
        assert_eq!(result.data, Some(json!([])));
    }
}
