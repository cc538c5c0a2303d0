//! Error types for the query cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for normalization and storage.
///
/// Every variant aborts the write that raised it before anything is merged
/// into the cache state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Payload shard shape disagrees with the provider's cardinality
    #[error("Shape mismatch for model '{model}'{}: {reason}", key_suffix(.response_key))]
    ShapeMismatch {
        model: String,
        response_key: Option<String>,
        reason: String,
    },

    /// A normalized object has no value for the model's identifier field
    #[error("Missing identifier '{id_field}' for model '{model}'")]
    MissingIdentifier { model: String, id_field: String },

    /// The identifier field holds something that is not a string or number
    #[error("Invalid identifier '{id_field}' for model '{model}': expected string or number, found {found}")]
    InvalidIdentifier {
        model: String,
        id_field: String,
        found: String,
    },

    /// Delete query built without the identifier to delete
    #[error("Delete query for model '{model}' has no model id")]
    MissingModelId { model: String },
}

impl CacheError {
    // == Shape Mismatch ==
    /// Creates a ShapeMismatch not yet tied to a response key.
    pub fn shape_mismatch(model: impl Into<String>, reason: impl Into<String>) -> Self {
        CacheError::ShapeMismatch {
            model: model.into(),
            response_key: None,
            reason: reason.into(),
        }
    }

    // == Annotate ==
    /// Attaches the polymorphic response key that was being normalized.
    ///
    /// Only ShapeMismatch carries the key; other variants are returned as-is.
    pub fn with_response_key(self, key: &str) -> Self {
        match self {
            CacheError::ShapeMismatch { model, reason, .. } => CacheError::ShapeMismatch {
                model,
                response_key: Some(key.to_string()),
                reason,
            },
            other => other,
        }
    }
}

fn key_suffix(response_key: &Option<String>) -> String {
    match response_key {
        Some(key) => format!(" at response key '{}'", key),
        None => String::new(),
    }
}

// == Result Type Alias ==
/// Convenience Result type for the query cache.
pub type Result<T> = std::result::Result<T, CacheError>;
