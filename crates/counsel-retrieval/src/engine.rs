//! Ranking & fusion engine: gather, guard, score, dedupe, truncate, memoize.

use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use counsel_core::config::{CacheConfig, RankingConfig};
use counsel_core::models::{AdviceQuery, AdviceRequest, CandidateAdvice, RoutingDecision};
use counsel_core::traits::{IDomainClassifier, IEffectivenessOracle, ISourceAdapter};

use crate::cache::AdviceCache;
use crate::ranking::{self, composite_score, domain_guard, CompositeInputs};

/// Result of one ranking call.
#[derive(Debug, Clone, Default)]
pub struct RankedAdvice {
    pub advice: Vec<CandidateAdvice>,
    pub cache_hit: bool,
    /// Present when the corpus adapter ran on this call.
    pub routing: Option<RoutingDecision>,
    /// Sources that failed and contributed nothing.
    pub degraded_sources: Vec<String>,
    /// Domain the query was classified into.
    pub query_domain: Option<String>,
}

pub struct RankingEngine {
    adapters: Vec<Arc<dyn ISourceAdapter>>,
    oracle: Arc<dyn IEffectivenessOracle>,
    classifier: Arc<dyn IDomainClassifier>,
    config: RwLock<RankingConfig>,
    cache: AdviceCache,
}

impl RankingEngine {
    pub fn new(
        adapters: Vec<Arc<dyn ISourceAdapter>>,
        oracle: Arc<dyn IEffectivenessOracle>,
        classifier: Arc<dyn IDomainClassifier>,
        config: RankingConfig,
        cache: &CacheConfig,
    ) -> Self {
        Self {
            adapters,
            oracle,
            classifier,
            config: RwLock::new(config),
            cache: AdviceCache::new(cache),
        }
    }

    pub fn cache(&self) -> &AdviceCache {
        &self.cache
    }

    pub fn reload(&self, ranking: RankingConfig, cache: &CacheConfig) {
        if let Ok(mut c) = self.config.write() {
            *c = ranking;
        }
        self.cache.reload(cache);
    }

    /// Ranked advice for `request`. Never fails; failing sources are skipped.
    pub fn advise(&self, request: &AdviceRequest) -> RankedAdvice {
        let cache_key = AdviceCache::key_for(request);
        if !request.flags.bypass_cache {
            if let Some(hit) = self.cache.get(&cache_key) {
                debug!(tool = %request.tool, items = hit.len(), "advice cache hit");
                return RankedAdvice {
                    advice: hit.as_ref().clone(),
                    cache_hit: true,
                    ..RankedAdvice::default()
                };
            }
        }

        let config = self.config.read().map(|c| c.clone()).unwrap_or_default();
        let domain = self
            .classifier
            .classify(&format!("{} {}", request.context, request.input_hint()));
        let query = AdviceQuery::from_request(request, domain.clone());

        let mut candidates = Vec::new();
        let mut routing = None;
        let mut degraded_sources = Vec::new();
        for adapter in &self.adapters {
            let kind = adapter.kind();
            if request.flags.exclude_sources.contains(&kind) {
                continue;
            }
            match adapter.gather(&query) {
                Ok(out) => {
                    if out.routing.is_some() {
                        routing = out.routing;
                    }
                    candidates.extend(out.candidates);
                }
                Err(e) => {
                    warn!(
                        event = "degradation_triggered",
                        component = "source_adapter",
                        source = %kind,
                        error = %e,
                        fallback = "skip source",
                        "advice source failed"
                    );
                    degraded_sources.push(kind.to_string());
                }
            }
        }

        let max_items = request
            .flags
            .max_items
            .unwrap_or(config.max_items)
            .max(1);
        let advice = self.rank(candidates, query.domain.as_deref(), &config, max_items);

        if !request.flags.bypass_cache {
            self.cache.insert(cache_key, advice.clone());
        }
        RankedAdvice {
            advice,
            cache_hit: false,
            routing,
            degraded_sources,
            query_domain: domain,
        }
    }

    /// Guard, score, sort, dedupe, truncate.
    pub fn rank(
        &self,
        candidates: Vec<CandidateAdvice>,
        query_domain: Option<&str>,
        config: &RankingConfig,
        max_items: usize,
    ) -> Vec<CandidateAdvice> {
        let mut scored: Vec<CandidateAdvice> = candidates
            .into_iter()
            .filter(|c| {
                !config.cross_domain_guard || domain_guard::allows(c.domain.as_deref(), query_domain)
            })
            .filter_map(|mut c| {
                // Keyless notes accrue promotion state under their advice id.
                let key = match &c.insight_key {
                    Some(key) => key.clone(),
                    None => c.advice_id.to_string(),
                };
                let effectiveness = self.oracle.insight_effectiveness(&key);
                if effectiveness.suppressed {
                    debug!(insight_key = %key, "suppressed insight skipped");
                    return None;
                }
                let effectiveness = effectiveness.score;
                c.score = composite_score(&CompositeInputs {
                    confidence: c.confidence,
                    context_match: c.context_match,
                    source_quality: config.source_quality_multiplier(c.source),
                    actionability: ranking::actionability(&c.text),
                    effectiveness,
                    helpfulness: self.oracle.source_helpfulness(c.source),
                });
                (c.score >= config.min_rank_score).then_some(c)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.advice_id.cmp(&b.advice_id))
        });
        let mut kept = ranking::dedupe(scored, config.dedup_similarity);
        kept.truncate(max_items);
        kept
    }
}
