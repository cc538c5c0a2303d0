//! Source definitions and providers
//!
//! Describes how an API operation's response maps onto cached models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Model;

// == Cardinality ==
/// Whether a payload shard is a single object or a list of objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Item,
    List,
}

// == Query Type ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    #[default]
    Get,
    Create,
    Update,
    Delete,
}

// == Fields ==
/// Field selection of a provider or query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fields {
    #[default]
    All,
    Only(Vec<String>),
}

impl Fields {
    /// Returns true if `object` carries every selected top-level field.
    pub fn satisfied_by(&self, object: &Value) -> bool {
        match self {
            Fields::All => true,
            Fields::Only(fields) => match object.as_object() {
                Some(map) => fields.iter().all(|f| map.contains_key(f)),
                None => false,
            },
        }
    }
}

// == Provider ==
/// One shard of a response: the model it fills, with what fields, and
/// whether it is an item or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub model: Model,
    #[serde(default)]
    pub fields: Fields,
    pub cardinality: Cardinality,
}

impl Provider {
    pub fn new(model: Model, fields: Fields, cardinality: Cardinality) -> Self {
        Self {
            model,
            fields,
            cardinality,
        }
    }

    pub fn item(model: Model) -> Self {
        Self::new(model, Fields::All, Cardinality::Item)
    }

    pub fn list(model: Model) -> Self {
        Self::new(model, Fields::All, Cardinality::List)
    }
}

// == Returns ==
/// The response shape of a source definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Returns {
    /// The whole response is one provider's shard
    Single(Provider),
    /// The response is an object; each key holds one provider's shard
    Keyed(BTreeMap<String, Provider>),
}

// == Source Definition ==
/// Description of one API operation's output and cache policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Response shape; delete operations carry none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Returns>,
    /// Opaque request metadata, carried for the orchestrator
    #[serde(default)]
    pub meta: Map<String, Value>,
    /// Cache duration override in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_for: Option<u64>,
    #[serde(default)]
    pub query_type: QueryType,
}

impl SourceDefinition {
    /// Creates a GET source whose whole response belongs to one provider.
    pub fn single(provider: Provider) -> Self {
        Self {
            returns: Some(Returns::Single(provider)),
            ..Self::default()
        }
    }

    /// Creates a GET source with a polymorphic, keyed response.
    pub fn keyed<K, I>(providers: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Provider)>,
    {
        let providers = providers
            .into_iter()
            .map(|(key, provider)| (key.into(), provider))
            .collect();
        Self {
            returns: Some(Returns::Keyed(providers)),
            ..Self::default()
        }
    }

    /// Creates a DELETE source, which returns nothing to cache.
    pub fn delete() -> Self {
        Self {
            query_type: QueryType::Delete,
            ..Self::default()
        }
    }

    pub fn with_cache_for(mut self, seconds: u64) -> Self {
        self.cache_for = Some(seconds);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fields_satisfied_by() {
        let data = json!({"id": 1, "name": "foo"});
        assert!(Fields::All.satisfied_by(&data));
        assert!(Fields::Only(vec!["name".into()]).satisfied_by(&data));
        assert!(!Fields::Only(vec!["email".into()]).satisfied_by(&data));
    }

    #[test]
    fn test_keyed_source_definition() {
        let sd = SourceDefinition::keyed([
            ("user", Provider::item(Model::new("user", "id"))),
            ("posts", Provider::list(Model::new("post", "id"))),
        ]);
        match sd.returns {
            Some(Returns::Keyed(ref providers)) => {
                assert_eq!(providers.len(), 2);
                assert_eq!(providers["posts"].cardinality, Cardinality::List);
            }
            _ => panic!("expected keyed returns"),
        }
        assert_eq!(sd.query_type, QueryType::Get);
    }

    #[test]
    fn test_deserialize_source_definition() {
        let sd: SourceDefinition = serde_json::from_value(json!({
            "returns": {"single": {"model": {"name": "user"}, "cardinality": "item"}},
            "cache_for": 600
        }))
        .unwrap();
        assert_eq!(sd.cache_for, Some(600));
        assert_eq!(
            sd.returns,
            Some(Returns::Single(Provider::item(Model::new("user", "id"))))
        );
    }

    #[test]
    fn test_delete_source_has_no_returns() {
        let sd = SourceDefinition::delete();
        assert!(sd.returns.is_none());
        assert_eq!(sd.query_type, QueryType::Delete);
    }
}
