use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, warn};

use counsel_core::config::{FusionConfig, RouterConfig};
use counsel_core::constants::QUERY_PREVIEW_CHARS;
use counsel_core::models::{
    AdviceQuery, EscalationReason, Insight, RetrievalMode, RoutingDecision, SuppressionReason,
};
use counsel_core::text;
use counsel_core::traits::ISimilarityProvider;
use counsel_storage::{AppendLog, SnapshotStore};

use super::complexity;
use super::facets;
use super::prefilter::Prefilter;
use super::rate_limiter::{EscalationLimiter, EscalationWindow};
use crate::fusion::{FusionDoc, FusionScorer};

/// One corpus hit after fusion scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterHit {
    pub key: String,
    pub text: String,
    pub score: f64,
    pub semantic: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RouteOutcome {
    pub hits: Vec<RouterHit>,
    pub decision: RoutingDecision,
}

struct PassResult {
    hits: Vec<RouterHit>,
    semantic_available: bool,
}

/// Decides per query between the cheap primary pass and a facet escalation.
pub struct RetrievalRouter {
    config: RwLock<RouterConfig>,
    scorer: RwLock<FusionScorer>,
    provider: Option<Arc<dyn ISimilarityProvider>>,
    limiter: Mutex<EscalationLimiter>,
    window_store: Option<SnapshotStore<EscalationWindow>>,
    decision_log: Option<AppendLog>,
    prefilter: Prefilter,
}

impl RetrievalRouter {
    pub fn new(config: RouterConfig, fusion: FusionConfig) -> Self {
        let limiter = EscalationLimiter::new(config.rate_window, config.rate_cap);
        Self {
            config: RwLock::new(config),
            scorer: RwLock::new(FusionScorer::new(fusion)),
            provider: None,
            limiter: Mutex::new(limiter),
            window_store: None,
            decision_log: None,
            prefilter: Prefilter::new(),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn ISimilarityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Share the escalation window with other processes through `store`.
    pub fn with_window_store(mut self, store: SnapshotStore<EscalationWindow>) -> Self {
        self.window_store = Some(store);
        self
    }

    pub fn with_decision_log(mut self, log: AppendLog) -> Self {
        self.decision_log = Some(log);
        self
    }

    pub fn config(&self) -> RouterConfig {
        self.config
            .read()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    pub fn reload(&self, router: RouterConfig, fusion: FusionConfig) {
        if let Ok(mut limiter) = self.limiter.lock() {
            limiter.reload(router.rate_window, router.rate_cap);
        }
        if let Ok(mut c) = self.config.write() {
            *c = router;
        }
        if let Ok(mut s) = self.scorer.write() {
            s.reload(fusion);
        }
    }

    /// Escalation rate over the current window.
    pub fn escalation_rate(&self) -> f64 {
        self.limiter.lock().map(|l| l.rate()).unwrap_or(0.0)
    }

    /// Retrieve corpus hits for `query`.
    pub fn route(&self, query: &AdviceQuery, corpus: &[Insight]) -> RouteOutcome {
        let started = Instant::now();
        let cfg = self.config();
        let scorer = self
            .scorer
            .read()
            .map(|s| s.clone())
            .unwrap_or_default();
        let query_text = query.search_text();

        // Pre-filter
        let (candidates, prefiltered_to): (Vec<&Insight>, Option<usize>) =
            if corpus.len() > cfg.prefilter_threshold {
                if self.prefilter.cached_entries() > corpus.len() {
                    let live: HashSet<&str> = corpus.iter().map(|i| i.key.as_str()).collect();
                    self.prefilter.retain_keys(&live);
                }
                let q = text::token_set(&query_text);
                let picked = self.prefilter.select(&q, corpus, cfg.prefilter_max);
                let n = picked.len();
                (picked, Some(n))
            } else {
                (corpus.iter().collect(), None)
            };
        let subset_keys: Option<Vec<String>> =
            prefiltered_to.map(|_| candidates.iter().map(|i| i.key.clone()).collect());

        // Primary pass
        let primary = self.run_pass(
            &scorer,
            &cfg,
            &query_text,
            &candidates,
            subset_keys.as_deref(),
        );
        let primary_ms = elapsed_ms(started);
        let semantic_available = primary.semantic_available;

        // Escalation policy
        let assessment = complexity::assess(&query_text, cfg.complex_query_tokens);
        let high_risk = query.high_risk || assessment.risky_terms;
        let top_score = primary.hits.first().map_or(0.0, |h| h.score);

        let mut reasons = Vec::new();
        match cfg.mode {
            RetrievalMode::HybridAgentic => reasons.push(EscalationReason::ForcedByMode),
            RetrievalMode::EmbeddingsOnly | RetrievalMode::Auto => {
                if primary.hits.len() < cfg.min_results {
                    reasons.push(EscalationReason::LowResultCount);
                }
                if top_score < cfg.min_top_score {
                    reasons.push(EscalationReason::LowTopScore);
                }
                if assessment.score >= cfg.complexity_threshold {
                    reasons.push(EscalationReason::ComplexQuery);
                }
                if high_risk {
                    reasons.push(EscalationReason::HighRisk);
                }
            }
        }

        let over_budget = primary_ms > cfg.fast_path_budget_ms;
        let facet_queries = facets::plan(&query_text, cfg.max_facets, cfg.facet_terms);
        let rate_exempt = query.high_risk;

        let mut suppressed_by = None;
        if !reasons.is_empty() {
            suppressed_by = match cfg.mode {
                RetrievalMode::EmbeddingsOnly => Some(SuppressionReason::EmbeddingsOnly),
                RetrievalMode::Auto if over_budget && !high_risk => {
                    Some(SuppressionReason::OverBudget)
                }
                _ if facet_queries.is_empty() => Some(SuppressionReason::NoFacets),
                _ => None,
            };
        }
        let wants = !reasons.is_empty() && suppressed_by.is_none();
        let escalate = self.admit_escalation(wants, rate_exempt, &cfg);
        if wants && !escalate {
            suppressed_by = Some(SuppressionReason::RateCap);
        }

        // Facet expansion under a wall-clock deadline
        let mut merged: HashMap<String, RouterHit> = primary
            .hits
            .into_iter()
            .map(|h| (h.key.clone(), h))
            .collect();
        let mut facets_run = 0;
        let mut timed_out = false;
        let mut semantic_available = semantic_available;
        if escalate {
            let deadline = Instant::now() + Duration::from_millis(cfg.deadline_ms);
            for facet in &facet_queries {
                if Instant::now() >= deadline {
                    timed_out = true;
                    break;
                }
                let pass = self.run_pass(&scorer, &cfg, facet, &candidates, subset_keys.as_deref());
                semantic_available |= pass.semantic_available;
                facets_run += 1;
                for hit in pass.hits {
                    match merged.get(&hit.key) {
                        Some(existing) if existing.score >= hit.score => {}
                        _ => {
                            merged.insert(hit.key.clone(), hit);
                        }
                    }
                }
            }
            if facets_run == facet_queries.len() && Instant::now() > deadline {
                timed_out = true;
            }
        }

        let mut hits: Vec<RouterHit> = merged.into_values().collect();
        sort_hits(&mut hits);
        hits.truncate(cfg.primary_limit);

        let decision = RoutingDecision {
            timestamp: Utc::now(),
            query_preview: text::truncate_chars(&query_text, QUERY_PREVIEW_CHARS),
            mode: cfg.mode,
            escalated: escalate,
            reasons,
            suppressed_by,
            high_risk,
            complexity: assessment.score,
            corpus_size: corpus.len(),
            prefiltered_to,
            semantic_available,
            facets_planned: if escalate { facet_queries.len() } else { 0 },
            facets_run,
            timed_out,
            primary_ms,
            total_ms: elapsed_ms(started),
            result_count: hits.len(),
            top_score: hits.first().map_or(0.0, |h| h.score),
        };
        self.log_decision(&decision);
        RouteOutcome { hits, decision }
    }

    /// Record this call in the rolling limiter and decide whether a wanted
    /// escalation may proceed. Exempt calls never count against the cap.
    fn admit_escalation(&self, wants: bool, exempt: bool, cfg: &RouterConfig) -> bool {
        let Ok(mut limiter) = self.limiter.lock() else {
            return wants && exempt;
        };
        if let Some(store) = &self.window_store {
            match store.load() {
                Ok(loaded) => limiter.absorb(&loaded.value),
                Err(e) => debug!(error = %e, "escalation window unreadable, using local copy"),
            }
        }
        let allowed = wants && (exempt || limiter.allows());
        limiter.record(allowed && !exempt);
        if let Some(store) = &self.window_store {
            match store.merge_and_save(limiter.window()) {
                Ok(merged) => limiter.absorb(&merged),
                Err(e) => debug!(error = %e, "escalation window not persisted"),
            }
        }
        if wants {
            debug!(
                rate = limiter.rate(),
                cap = cfg.rate_cap,
                allowed,
                exempt,
                "escalation rate check"
            );
        }
        allowed
    }

    fn run_pass(
        &self,
        scorer: &FusionScorer,
        cfg: &RouterConfig,
        query: &str,
        candidates: &[&Insight],
        subset: Option<&[String]>,
    ) -> PassResult {
        let mut semantic: HashMap<String, (f64, f64, String)> = HashMap::new();
        let mut semantic_available = false;
        if let Some(provider) = &self.provider {
            match provider.similarity(query, subset, cfg.primary_limit * 2) {
                Ok(found) => {
                    semantic_available = true;
                    for hit in found {
                        semantic.insert(hit.key, (hit.semantic_sim, hit.trigger_conf, hit.text));
                    }
                }
                Err(e) => {
                    warn!(
                        event = "degradation_triggered",
                        component = "similarity",
                        provider = provider.name(),
                        error = %e,
                        fallback = "lexical only",
                        "similarity provider failed"
                    );
                }
            }
        }

        let known: HashSet<&str> = candidates.iter().map(|i| i.key.as_str()).collect();
        let extra: Vec<(&String, &(f64, f64, String))> = semantic
            .iter()
            .filter(|(k, _)| !known.contains(k.as_str()) && subset.is_none())
            .collect();

        let mut keys: Vec<&str> = Vec::with_capacity(candidates.len() + extra.len());
        let mut texts: Vec<&str> = Vec::with_capacity(keys.capacity());
        let mut docs: Vec<FusionDoc<'_>> = Vec::with_capacity(keys.capacity());
        for insight in candidates {
            let sem = semantic.get(&insight.key);
            keys.push(&insight.key);
            texts.push(&insight.text);
            docs.push(FusionDoc {
                text: &insight.text,
                semantic: sem.map(|s| s.0),
                trigger_conf: sem.map_or(0.0, |s| s.1),
            });
        }
        for (key, (sim, trigger, text)) in &extra {
            keys.push(key.as_str());
            texts.push(text.as_str());
            docs.push(FusionDoc {
                text: text.as_str(),
                semantic: Some(*sim),
                trigger_conf: *trigger,
            });
        }

        let scores = scorer.score_batch(query, &docs);
        let mut hits: Vec<RouterHit> = scores
            .iter()
            .enumerate()
            .filter(|(_, s)| s.fused >= cfg.min_fused_score && s.fused > 0.0)
            .map(|(i, s)| RouterHit {
                key: keys[i].to_string(),
                text: texts[i].to_string(),
                score: s.fused,
                semantic: docs[i].semantic,
            })
            .collect();
        sort_hits(&mut hits);
        hits.truncate(cfg.primary_limit);
        PassResult {
            hits,
            semantic_available,
        }
    }

    fn log_decision(&self, decision: &RoutingDecision) {
        debug!(
            event = "escalation_decided",
            mode = %decision.mode,
            escalated = decision.escalated,
            reasons = ?decision.reasons,
            suppressed_by = ?decision.suppressed_by,
            facets_run = decision.facets_run,
            timed_out = decision.timed_out,
            total_ms = decision.total_ms,
            "routing decision"
        );
        if let Some(log) = &self.decision_log {
            if let Err(e) = log.append(decision) {
                debug!(error = %e, "routing decision not logged");
            }
        }
    }
}

fn sort_hits(hits: &mut [RouterHit]) {
    hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.key.cmp(&b.key)));
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis().min(u64::MAX as u128) as u64
}
