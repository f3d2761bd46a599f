//! The record cache.
//!
//! Every resource record a response delivers ends up here, filed under its
//! [`Node`]. The cache has set semantics: inserting a record that is
//! already present changes nothing, while records differing in any field,
//! the time to live included, coexist. Lookup is exact: a node matches only
//! the records filed under precisely that host name spelling and type.
//!
//! Nothing ever expires. The time to live of a record is stored for
//! display purposes only and entries live until the process exits or the
//! cache is cleared. This is deliberate: the tool's observable behavior
//! stays reproducible within a session, and resolution decisions can rely
//! on everything learned so far.

use crate::base::{Node, ResourceRecord};
use std::collections::{BTreeMap, BTreeSet};

/// What a cache miss returns.
static EMPTY: BTreeSet<ResourceRecord> = BTreeSet::new();

//------------ RecordCache ---------------------------------------------------

/// An exact-match store of resource records with set semantics.
#[derive(Debug, Default)]
pub struct RecordCache {
    map: BTreeMap<Node, BTreeSet<ResourceRecord>>,
}

impl RecordCache {
    /// Creates a new, empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Files a record under its node.
    ///
    /// Returns whether the record was actually new.
    pub fn insert(&mut self, record: ResourceRecord) -> bool {
        self.map.entry(record.node()).or_default().insert(record)
    }

    /// Returns the records cached for the given node.
    ///
    /// The returned set is empty if nothing is cached. The set is ordered,
    /// so iteration is deterministic.
    pub fn get(&self, node: &Node) -> &BTreeSet<ResourceRecord> {
        self.map.get(node).unwrap_or(&EMPTY)
    }

    /// Returns whether any record is cached for the given node.
    pub fn contains(&self, node: &Node) -> bool {
        !self.get(node).is_empty()
    }

    /// Returns all entries in node order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&Node, &BTreeSet<ResourceRecord>)> {
        self.map.iter()
    }

    /// Returns the number of nodes with cached records.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drops all cached records.
    pub fn clear(&mut self) {
        self.map.clear()
    }
}

//============ Testing =======================================================
