use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use counsel_core::errors::{CounselResult, StorageError};
use counsel_core::models::Insight;
use counsel_core::traits::IInsightCorpus;

use crate::snapshot::{Mergeable, SnapshotStore};

/// On-disk shape of the insight corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InsightMap(pub BTreeMap<String, Insight>);

impl Mergeable for InsightMap {
    fn merge(local: &Self, remote: &Self) -> Self {
        let mut merged = remote.0.clone();
        for (key, mine) in &local.0 {
            let value = match remote.0.get(key) {
                Some(theirs) => mine.merge(theirs),
                None => mine.clone(),
            };
            merged.insert(key.clone(), value);
        }
        InsightMap(merged)
    }
}

/// Corpus persisted as one JSON file, shared between processes.
///
/// Reads are served from an in-memory copy refreshed on every write; writes
/// re-read the file and merge before renaming over it.
pub struct JsonFileCorpus {
    store: SnapshotStore<InsightMap>,
    cache: RwLock<InsightMap>,
}

impl JsonFileCorpus {
    pub fn open(path: impl Into<PathBuf>, retry_delay: Duration) -> CounselResult<Self> {
        let store = SnapshotStore::new(path, retry_delay);
        let initial = store.load()?.value;
        Ok(Self {
            store,
            cache: RwLock::new(initial),
        })
    }

    /// Pick up writes made by other processes.
    pub fn refresh(&self) -> CounselResult<()> {
        let current = self.store.load()?.value;
        let mut cache = self.cache.write().map_err(poisoned)?;
        *cache = InsightMap::merge(&cache, &current);
        Ok(())
    }
}

impl IInsightCorpus for JsonFileCorpus {
    fn get(&self, key: &str) -> CounselResult<Option<Insight>> {
        let cache = self.cache.read().map_err(poisoned)?;
        Ok(cache.0.get(key).cloned())
    }

    fn set(&self, insight: &Insight) -> CounselResult<()> {
        let mut cache = self.cache.write().map_err(poisoned)?;
        let mut local = InsightMap::default();
        local.0.insert(insight.key.clone(), insight.clone());
        let merged = self.store.merge_and_save(&local)?;
        *cache = InsightMap::merge(&cache, &merged);
        Ok(())
    }

    fn scan(&self) -> CounselResult<Vec<Insight>> {
        let cache = self.cache.read().map_err(poisoned)?;
        Ok(cache.0.values().cloned().collect())
    }

    fn len(&self) -> CounselResult<usize> {
        Ok(self.cache.read().map_err(poisoned)?.0.len())
    }
}

/// Process-local corpus for tests and embedding.
#[derive(Default)]
pub struct InMemoryCorpus {
    inner: RwLock<BTreeMap<String, Insight>>,
}

impl InMemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_insights(insights: impl IntoIterator<Item = Insight>) -> Self {
        Self {
            inner: RwLock::new(insights.into_iter().map(|i| (i.key.clone(), i)).collect()),
        }
    }
}

impl IInsightCorpus for InMemoryCorpus {
    fn get(&self, key: &str) -> CounselResult<Option<Insight>> {
        Ok(self.inner.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, insight: &Insight) -> CounselResult<()> {
        self.inner
            .write()
            .map_err(poisoned)?
            .insert(insight.key.clone(), insight.clone());
        Ok(())
    }

    fn scan(&self) -> CounselResult<Vec<Insight>> {
        Ok(self.inner.read().map_err(poisoned)?.values().cloned().collect())
    }

    fn len(&self) -> CounselResult<usize> {
        Ok(self.inner.read().map_err(poisoned)?.len())
    }
}

fn poisoned<E>(_: E) -> StorageError {
    StorageError::ReadFailed {
        path: "<corpus>".to_string(),
        reason: "lock poisoned".to_string(),
    }
}
