//! Model descriptor
//!
//! Names a record type, the field that identifies its records, and how long
//! its records stay fresh by default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CacheError, Result};

fn default_id_field() -> String {
    "id".to_string()
}

// == Model ==
/// Immutable description of a cached record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Model name, also the top-level key in the record store
    pub name: String,
    /// Field holding each record's identifier
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Default cache duration in seconds, None = never expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_for: Option<u64>,
}

impl Model {
    // == Constructor ==
    /// Creates a model that never expires on its own.
    pub fn new(name: impl Into<String>, id_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_field: id_field.into(),
            cache_for: None,
        }
    }

    /// Returns a copy of this model with a default cache duration.
    pub fn with_cache_for(mut self, seconds: u64) -> Self {
        self.cache_for = Some(seconds);
        self
    }

    // == Identifier ==
    /// Extracts the identifier of `object` as a string.
    ///
    /// Numbers and strings both stringify, so `1` and `"1"` land on the same
    /// record.
    ///
    /// # Errors
    /// - `MissingIdentifier` if the field is absent or null
    /// - `InvalidIdentifier` if the field is a bool, array or object
    pub fn identifier_of(&self, object: &Map<String, Value>) -> Result<String> {
        match object.get(&self.id_field) {
            None | Some(Value::Null) => Err(CacheError::MissingIdentifier {
                model: self.name.clone(),
                id_field: self.id_field.clone(),
            }),
            Some(value) => stringify_identifier(value).ok_or_else(|| {
                CacheError::InvalidIdentifier {
                    model: self.name.clone(),
                    id_field: self.id_field.clone(),
                    found: value.to_string(),
                }
            }),
        }
    }
}

/// Normalizes a scalar identifier value to its string form.
pub fn stringify_identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
