//! Cache Record Module
//!
//! Defines one normalized record: an opaque payload plus its cache metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Record Cache Metadata ==
/// Expiry and deletion state of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCache {
    /// Expiration timestamp, None = never expires
    pub expires: Option<DateTime<Utc>>,
    /// Tombstone marker set by delete queries
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

// == Record ==
/// A single cached record for one (model, identifier) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// The payload exactly as the API returned it
    pub data: Value,
    /// Cache metadata
    pub cache: RecordCache,
}

impl Record {
    // == Constructor ==
    /// Creates a live record.
    ///
    /// # Arguments
    /// * `data` - The payload object
    /// * `expires` - Expiration timestamp, or None to never expire
    pub fn new(data: Value, expires: Option<DateTime<Utc>>) -> Self {
        Self {
            data,
            cache: RecordCache {
                expires,
                deleted: false,
            },
        }
    }

    // == Is Expired ==
    /// Checks if the record has expired at `now`.
    ///
    /// A record whose expiry equals `now` is already expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.cache.expires {
            Some(expires) => expires <= now,
            None => false,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.cache.deleted
    }

    /// Marks the record deleted, keeping its payload.
    pub fn tombstone(&mut self) {
        self.cache.deleted = true;
    }

    // == Is Live ==
    /// Returns true if the record may be served at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.is_tombstone() && !self.is_expired(now)
    }
}
