use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use counsel_storage::Mergeable;

/// Dedup hashes of recently roasted learnings with when each was first seen.
///
/// Bounded to `max_entries`; the oldest hashes are evicted first. A zero cap
/// means the copy was read from disk and defers to whichever side carries one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenHashes {
    #[serde(default)]
    pub hashes: BTreeMap<String, DateTime<Utc>>,
    #[serde(default)]
    pub max_entries: usize,
}

impl SeenHashes {
    pub fn bounded(max_entries: usize) -> Self {
        Self {
            hashes: BTreeMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.hashes.contains_key(hash)
    }

    /// Record `hash` as seen at `at`. Returns false when it was already known.
    pub fn insert(&mut self, hash: impl Into<String>, at: DateTime<Utc>) -> bool {
        let fresh = match self.hashes.entry(hash.into()) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(v) => {
                v.insert(at);
                true
            }
        };
        self.evict();
        fresh
    }

    pub fn set_max(&mut self, max_entries: usize) {
        self.max_entries = max_entries.max(1);
        self.evict();
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    fn evict(&mut self) {
        if self.max_entries == 0 || self.hashes.len() <= self.max_entries {
            return;
        }
        let mut by_age: Vec<(DateTime<Utc>, String)> = self
            .hashes
            .iter()
            .map(|(h, at)| (*at, h.clone()))
            .collect();
        by_age.sort();
        let excess = self.hashes.len() - self.max_entries;
        for (_, hash) in by_age.into_iter().take(excess) {
            self.hashes.remove(&hash);
        }
    }
}

impl Mergeable for SeenHashes {
    /// Union keeping the earliest sighting, then trim to the local cap.
    fn merge(local: &Self, remote: &Self) -> Self {
        let mut hashes = remote.hashes.clone();
        for (hash, at) in &local.hashes {
            hashes
                .entry(hash.clone())
                .and_modify(|seen| *seen = (*seen).min(*at))
                .or_insert(*at);
        }
        let max_entries = if local.max_entries > 0 {
            local.max_entries
        } else {
            remote.max_entries
        };
        let mut merged = SeenHashes { hashes, max_entries };
        merged.evict();
        merged
    }
}
