//! Ordered Identifier Collections
//!
//! Identifier sets and record maps that remember first-insertion order, so a
//! list rebuilt from the cache comes back in the order the API returned it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::cache::Record;

// == Identifier Set ==
/// De-duplicated identifiers in first-insertion order.
///
/// Membership goes through a hash index, so inserting n identifiers stays
/// linear. Serializes as a plain JSON array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct IdentifierSet {
    order: Vec<String>,
    index: HashSet<String>,
}

impl IdentifierSet {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Adds an identifier, keeping its original position if already present.
    ///
    /// Returns true if the identifier was new.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.index.contains(&id) {
            return false;
        }
        self.index.insert(id.clone());
        self.order.push(id);
        true
    }

    /// Adds every identifier of `other` not already present.
    pub fn extend_from(&mut self, other: &IdentifierSet) {
        self.order.reserve(other.len());
        for id in other.iter() {
            self.insert(id.as_str());
        }
    }

    // == Contains ==
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    pub fn first(&self) -> Option<&String> {
        self.order.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// Order is part of identity; the index mirrors it.
impl PartialEq for IdentifierSet {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl Eq for IdentifierSet {}

impl From<Vec<String>> for IdentifierSet {
    fn from(ids: Vec<String>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<IdentifierSet> for Vec<String> {
    fn from(set: IdentifierSet) -> Self {
        set.order
    }
}

impl<S: Into<String>> FromIterator<S> for IdentifierSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = IdentifierSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

// == Record Map ==
/// Identifier-keyed records in first-insertion order.
///
/// Inserting an identifier twice replaces the record but keeps the first
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordMap {
    ids: IdentifierSet,
    records: HashMap<String, Record>,
}

impl RecordMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: String, record: Record) {
        self.ids.insert(id.as_str());
        self.records.insert(id, record);
    }

    /// Moves every record of `other` into this map, last write wins.
    pub fn merge(&mut self, other: RecordMap) {
        for (id, record) in other.into_records() {
            self.insert(id, record);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    /// Identifiers in insertion order.
    pub fn ids(&self) -> &IdentifierSet {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Record)> {
        self.ids
            .iter()
            .filter_map(move |id| self.records.get(id).map(|record| (id, record)))
    }

    /// Consumes the map, yielding records in insertion order.
    pub fn into_records(self) -> impl Iterator<Item = (String, Record)> {
        let RecordMap { ids, mut records } = self;
        ids.order
            .into_iter()
            .filter_map(move |id| records.remove(&id).map(|record| (id, record)))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::time::{Duration, Instant};

    #[test]
    fn test_identifier_set_keeps_first_position() {
        let mut set = IdentifierSet::new();

        assert!(set.insert("2"));
        assert!(set.insert("1"));
        assert!(!set.insert("2"));

        let ids: Vec<&String> = set.iter().collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn test_identifier_set_extend_is_union() {
        let mut set: IdentifierSet = ["1"].into_iter().collect();
        let other: IdentifierSet = ["1", "2"].into_iter().collect();

        set.extend_from(&other);
        assert_eq!(set, ["1", "2"].into_iter().collect::<IdentifierSet>());
    }

    #[test]
    fn test_identifier_set_serializes_as_array() {
        let set: IdentifierSet = ["1", "2"].into_iter().collect();
        assert_eq!(serde_json::to_value(&set).unwrap(), json!(["1", "2"]));

        let back: IdentifierSet = serde_json::from_value(json!(["2", "1", "2"])).unwrap();
        assert_eq!(back.iter().collect::<Vec<_>>(), vec!["2", "1"]);
        assert!(back.contains("1"));
    }

    #[test]
    fn test_identifier_set_large_insert_is_linear() {
        let count = 100_000;
        let start = Instant::now();

        let set: IdentifierSet = (0..count).map(|i| i.to_string()).collect();
        let mut copy = IdentifierSet::new();
        copy.extend_from(&set);
        copy.extend_from(&set);

        assert!(
            start.elapsed() < Duration::from_secs(10),
            "inserting {} ids took {:?}",
            count,
            start.elapsed()
        );
        assert_eq!(copy.len(), count);
        assert_eq!(copy.first().map(String::as_str), Some("0"));
        assert!(copy.contains(&(count - 1).to_string()));
    }

    #[test]
    fn test_record_map_order_and_overwrite() {
        let mut map = RecordMap::new();
        map.insert("b".into(), Record::new(json!({"v": 1}), None));
        map.insert("a".into(), Record::new(json!({"v": 2}), None));
        map.insert("b".into(), Record::new(json!({"v": 3}), None));

        assert_eq!(map.len(), 2);
        let entries: Vec<(String, Value)> = map
            .iter()
            .map(|(id, r)| (id.clone(), r.data.clone()))
            .collect();
        assert_eq!(
            entries,
            vec![("b".into(), json!({"v": 3})), ("a".into(), json!({"v": 2}))]
        );
    }
}
