//! Short-TTL memoization of ranked advice.
//!
//! Uses `moka::sync::Cache` with a TTL and a size bound; the least recently
//! used entries are evicted first. Tracks hits and misses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use moka::sync::Cache;

use counsel_core::config::CacheConfig;
use counsel_core::models::{AdviceRequest, CandidateAdvice};
use counsel_core::text;

pub struct AdviceCache {
    cache: RwLock<Cache<String, Arc<Vec<CandidateAdvice>>>>,
    enabled: RwLock<bool>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AdviceCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            cache: RwLock::new(build(config)),
            enabled: RwLock::new(config.enabled),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cache key over (tool, normalized context, input hint, flags).
    pub fn key_for(request: &AdviceRequest) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(request.tool.trim().to_lowercase().as_bytes());
        hasher.update(b"\x1f");
        hasher.update(text::normalize_whitespace(&request.context.to_lowercase()).as_bytes());
        hasher.update(b"\x1f");
        hasher.update(request.input_hint().as_bytes());
        hasher.update(b"\x1f");
        let flags = serde_json::to_string(&request.flags).unwrap_or_default();
        hasher.update(flags.as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.read().map(|e| *e).unwrap_or(false)
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<CandidateAdvice>>> {
        if !self.is_enabled() {
            return None;
        }
        let found = self.cache.read().ok().and_then(|c| c.get(key));
        match found {
            Some(v) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(v)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, key: String, advice: Vec<CandidateAdvice>) {
        if !self.is_enabled() {
            return;
        }
        if let Ok(c) = self.cache.read() {
            c.insert(key, Arc::new(advice));
        }
    }

    pub fn invalidate_all(&self) {
        if let Ok(c) = self.cache.read() {
            c.invalidate_all();
        }
    }

    /// Rebuild with new bounds. Existing entries are dropped.
    pub fn reload(&self, config: &CacheConfig) {
        if let Ok(mut c) = self.cache.write() {
            *c = build(config);
        }
        if let Ok(mut e) = self.enabled.write() {
            *e = config.enabled;
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Cache hit rate (0.0–1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.cache
            .read()
            .map(|c| {
                c.run_pending_tasks();
                c.entry_count()
            })
            .unwrap_or(0)
    }
}

fn build(config: &CacheConfig) -> Cache<String, Arc<Vec<CandidateAdvice>>> {
    Cache::builder()
        .max_capacity(config.max_entries)
        .time_to_live(Duration::from_secs(config.ttl_secs))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use counsel_core::models::{AdviceFlags, SourceKind};
    use serde_json::json;

    fn req(context: &str) -> AdviceRequest {
        AdviceRequest::new("Edit", json!({"file_path": "a.py"}), context)
    }

    #[test]
    fn key_ignores_whitespace_and_case_in_context() {
        assert_eq!(AdviceCache::key_for(&req("Fix  bug")), AdviceCache::key_for(&req("fix bug")));
        assert_ne!(AdviceCache::key_for(&req("fix bug")), AdviceCache::key_for(&req("add test")));
    }

    #[test]
    fn flags_participate_in_key() {
        let plain = req("fix bug");
        let risky = req("fix bug").with_flags(AdviceFlags {
            high_risk: true,
            ..AdviceFlags::default()
        });
        assert_ne!(AdviceCache::key_for(&plain), AdviceCache::key_for(&risky));
    }

    #[test]
    fn hit_and_miss_are_counted() {
        let cache = AdviceCache::new(&CacheConfig::default());
        assert!(cache.get("k").is_none());
        cache.insert(
            "k".into(),
            vec![CandidateAdvice::new(SourceKind::Corpus, None, "x", 0.5, 0.5)],
        );
        assert_eq!(cache.get("k").map(|v| v.len()), Some(1));
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn disabled_cache_stores_nothing() {
        let cache = AdviceCache::new(&CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        });
        cache.insert("k".into(), Vec::new());
        assert!(cache.get("k").is_none());
        assert_eq!(cache.misses(), 0);
    }
}
