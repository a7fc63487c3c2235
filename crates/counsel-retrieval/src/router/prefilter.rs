use std::collections::HashSet;

use dashmap::DashMap;

use counsel_core::models::Insight;
use counsel_core::text;

#[derive(Debug, Clone)]
struct CachedTokens {
    text_hash: blake3::Hash,
    tokens: HashSet<String>,
}

/// Cheap candidate selection for large corpora.
///
/// Token sets are cached per insight key and invalidated by a content hash, so
/// a warm pre-filter only hashes and intersects.
#[derive(Debug, Default)]
pub struct Prefilter {
    cache: DashMap<String, CachedTokens>,
}

impl Prefilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Keep at most `max` insights, ranked by shared query tokens, then confidence.
    pub fn select<'a>(
        &self,
        query_tokens: &HashSet<String>,
        corpus: &'a [Insight],
        max: usize,
    ) -> Vec<&'a Insight> {
        let mut scored: Vec<(usize, &'a Insight)> = corpus
            .iter()
            .map(|insight| (self.shared_tokens(query_tokens, insight), insight))
            .collect();
        scored.sort_by(|(sa, a), (sb, b)| {
            sb.cmp(sa)
                .then_with(|| b.confidence.total_cmp(&a.confidence))
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        scored.truncate(max);
        scored.into_iter().map(|(_, i)| i).collect()
    }

    /// Drop cache entries for keys no longer in the corpus.
    pub fn retain_keys(&self, live: &HashSet<&str>) {
        self.cache.retain(|k, _| live.contains(k.as_str()));
    }

    fn shared_tokens(&self, query_tokens: &HashSet<String>, insight: &Insight) -> usize {
        let hash = blake3::hash(insight.text.as_bytes());
        if let Some(entry) = self.cache.get(&insight.key) {
            if entry.text_hash == hash {
                return entry.tokens.intersection(query_tokens).count();
            }
        }
        let tokens = text::token_set(&insight.text);
        let shared = tokens.intersection(query_tokens).count();
        self.cache.insert(
            insight.key.clone(),
            CachedTokens {
                text_hash: hash,
                tokens,
            },
        );
        shared
    }
}
