//! Query descriptor
//!
//! A query names the model and shape of the data a caller wants. Its
//! fingerprint keys the query-to-identifier index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::{Cardinality, Fields, Model, QueryType};

// == Query ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub model: Model,
    #[serde(default)]
    pub query_type: QueryType,
    pub cardinality: Cardinality,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
    /// Identifier targeted by a delete query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
}

/// The part of a query that determines its fingerprint.
#[derive(Serialize)]
struct FingerprintInput<'a> {
    model: &'a str,
    query_type: QueryType,
    cardinality: Cardinality,
    params: &'a BTreeMap<String, Value>,
}

impl Query {
    // == Constructors ==
    /// Creates a GET query for a single record.
    pub fn item(model: Model) -> Self {
        Self::new(model, QueryType::Get, Cardinality::Item)
    }

    /// Creates a GET query for a list of records.
    pub fn list(model: Model) -> Self {
        Self::new(model, QueryType::Get, Cardinality::List)
    }

    /// Creates a DELETE query for the record with identifier `id`.
    pub fn delete(model: Model, id: impl ToString) -> Self {
        let id = id.to_string();
        let mut query = Self::new(model, QueryType::Delete, Cardinality::Item);
        query.params.insert("id".to_string(), Value::String(id.clone()));
        query.model_id = Some(id);
        query
    }

    fn new(model: Model, query_type: QueryType, cardinality: Cardinality) -> Self {
        Self {
            model,
            query_type,
            cardinality,
            fields: Fields::All,
            params: BTreeMap::new(),
            model_id: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    // == Fingerprint ==
    /// Stable hex SHA-256 of model name, query type, cardinality and params.
    ///
    /// Params are ordered by name, so insertion order never changes the
    /// fingerprint. Field selection is not part of it.
    pub fn fingerprint(&self) -> String {
        let input = FingerprintInput {
            model: &self.model.name,
            query_type: self.query_type,
            cardinality: self.cardinality,
            params: &self.params,
        };
        // Serializing strings, enums and a map of JSON values cannot fail.
        let encoded = serde_json::to_vec(&input).unwrap_or_default();
        hex::encode(Sha256::digest(&encoded))
    }

    pub fn is_delete(&self) -> bool {
        self.query_type == QueryType::Delete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Model {
        Model::new("user", "id")
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = Query::item(user()).with_param("id", 1).with_param("org", "x");
        let b = Query::item(user()).with_param("org", "x").with_param("id", 1);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_fingerprint_distinguishes_queries() {
        let item = Query::item(user());
        let list = Query::list(user());
        let by_id = Query::item(user()).with_param("id", 1);
        let post = Query::item(Model::new("post", "id"));

        assert_ne!(item.fingerprint(), list.fingerprint());
        assert_ne!(item.fingerprint(), by_id.fingerprint());
        assert_ne!(item.fingerprint(), post.fingerprint());
    }

    #[test]
    fn test_fingerprint_ignores_fields() {
        let all = Query::list(user());
        let some = Query::list(user()).with_fields(Fields::Only(vec!["name".into()]));
        assert_eq!(all.fingerprint(), some.fingerprint());
    }

    #[test]
    fn test_delete_query() {
        let query = Query::delete(user(), 1);
        assert!(query.is_delete());
        assert_eq!(query.model_id.as_deref(), Some("1"));
    }
}
