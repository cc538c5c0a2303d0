//! Cache Statistics Module
//!
//! Summarizes what a cache snapshot holds at a point in time.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::Record;

// == Cache Stats ==
/// Counts of a cache snapshot's contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of models with at least one stored record
    pub models: usize,
    /// Number of stored records, tombstones included
    pub records: usize,
    /// Number of records marked deleted
    pub tombstones: usize,
    /// Number of live-marked records whose expiry has passed
    pub expired: usize,
    /// Number of query fingerprints in the identifier index
    pub indexed_queries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record ==
    /// Counts one stored record as seen at `now`.
    pub fn record(&mut self, record: &Record, now: DateTime<Utc>) {
        self.records += 1;
        if record.is_tombstone() {
            self.tombstones += 1;
        } else if record.is_expired(now) {
            self.expired += 1;
        }
    }

    pub fn set_models(&mut self, count: usize) {
        self.models = count;
    }

    pub fn set_indexed_queries(&mut self, count: usize) {
        self.indexed_queries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use serde_json::json;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.records, 0);
        assert_eq!(stats.tombstones, 0);
        assert_eq!(stats.expired, 0);
        assert_eq!(stats.indexed_queries, 0);
    }

    #[test]
    fn test_record_classification() {
        let now = Utc::now();
        let mut stats = CacheStats::new();

        let live = Record::new(json!({"id": 1}), None);
        let expired = Record::new(json!({"id": 2}), Some(now - TimeDelta::seconds(1)));
        let mut deleted = Record::new(json!({"id": 3}), Some(now - TimeDelta::seconds(1)));
        deleted.tombstone();

        stats.record(&live, now);
        stats.record(&expired, now);
        stats.record(&deleted, now);

        assert_eq!(stats.records, 3);
        assert_eq!(stats.tombstones, 1);
        assert_eq!(stats.expired, 1);
    }

    #[test]
    fn test_expiry_boundary_counts_as_expired() {
        let now = Utc::now();
        let mut stats = CacheStats::new();
        stats.record(&Record::new(json!({"id": 1}), None), now);
        stats.record(&Record::new(json!({"id": 2}), Some(now)), now);
        assert_eq!(stats.records, 2);
        assert_eq!(stats.expired, 1);
    }
}
