//! Router behaviour: mode handling, budgets, deadlines, and the escalation rate cap.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use counsel_core::config::{FusionConfig, RouterConfig, StorageConfig};
use counsel_core::errors::{CounselResult, RetrievalError};
use counsel_core::models::{
    AdviceQuery, AdviceRequest, Insight, RetrievalMode, RoutingDecision, SuppressionReason,
};
use counsel_core::traits::{ISimilarityProvider, SimilarityHit};
use counsel_retrieval::router::{EscalationLimiter, EscalationWindow, RetrievalRouter};
use counsel_storage::{AppendLog, LockPolicy, SnapshotStore};
use serde_json::json;

struct CountingProvider {
    calls: AtomicUsize,
    delay: Duration,
    fail: bool,
}

impl CountingProvider {
    fn new(delay_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(delay_ms),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            fail: true,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ISimilarityProvider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    fn similarity(
        &self,
        _query: &str,
        _subset: Option<&[String]>,
        _limit: usize,
    ) -> CounselResult<Vec<SimilarityHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if self.fail {
            return Err(RetrievalError::ProviderUnavailable {
                provider: "counting".into(),
                reason: "down".into(),
            }
            .into());
        }
        Ok(Vec::new())
    }
}

fn corpus() -> Vec<Insight> {
    test_fixtures::seed_corpus()
        .into_iter()
        .map(|s| {
            let i = Insight::new(s.key, s.category, s.text, s.confidence);
            match s.domain {
                Some(d) => i.with_domain(d),
                None => i,
            }
        })
        .collect()
}

fn query(context: &str) -> AdviceQuery {
    AdviceQuery::from_request(&AdviceRequest::new("Bash", json!({}), context), None)
}

fn risky(context: &str) -> AdviceQuery {
    let mut q = query(context);
    q.high_risk = true;
    q
}

fn config(mode: RetrievalMode) -> RouterConfig {
    RouterConfig {
        mode,
        ..RouterConfig::default()
    }
}

#[test]
fn embeddings_only_makes_exactly_one_similarity_call() {
    let provider = CountingProvider::new(0);
    let router = RetrievalRouter::new(config(RetrievalMode::EmbeddingsOnly), FusionConfig::default())
        .with_provider(provider.clone());

    let out = router.route(
        &query("compare pytest versus unittest and then fix the flaky test"),
        &corpus(),
    );

    assert_eq!(provider.calls(), 1);
    assert!(!out.decision.escalated);
    assert_eq!(out.decision.suppressed_by, Some(SuppressionReason::EmbeddingsOnly));
    assert_eq!(out.decision.facets_run, 0);
}

#[test]
fn hybrid_mode_runs_every_planned_facet() {
    let provider = CountingProvider::new(0);
    let cfg = RouterConfig {
        deadline_ms: 10_000,
        ..config(RetrievalMode::HybridAgentic)
    };
    let router = RetrievalRouter::new(cfg, FusionConfig::default()).with_provider(provider.clone());

    let out = router.route(&query("run database migrations before integration tests"), &corpus());

    assert!(out.decision.escalated);
    assert!(out.decision.facets_planned > 0);
    assert_eq!(out.decision.facets_run, out.decision.facets_planned);
    assert_eq!(provider.calls(), 1 + out.decision.facets_run);
    assert_eq!(
        out.hits.first().map(|h| h.key.as_str()),
        Some("db-migrations-before-tests")
    );
}

#[test]
fn slow_primary_pass_suppresses_escalation_for_normal_queries() {
    let provider = CountingProvider::new(30);
    let cfg = RouterConfig {
        fast_path_budget_ms: 5,
        ..config(RetrievalMode::Auto)
    };
    let router = RetrievalRouter::new(cfg, FusionConfig::default()).with_provider(provider.clone());

    let out = router.route(&query("format readme headings"), &[]);

    assert!(!out.decision.escalated);
    assert_eq!(out.decision.suppressed_by, Some(SuppressionReason::OverBudget));
    assert_eq!(provider.calls(), 1);
}

#[test]
fn high_risk_queries_escalate_despite_slow_primary_pass() {
    let provider = CountingProvider::new(30);
    let cfg = RouterConfig {
        fast_path_budget_ms: 5,
        deadline_ms: 10_000,
        ..config(RetrievalMode::Auto)
    };
    let router = RetrievalRouter::new(cfg, FusionConfig::default()).with_provider(provider.clone());

    let out = router.route(&risky("format readme headings"), &[]);

    assert!(out.decision.escalated);
    assert!(out.decision.high_risk);
    assert!(provider.calls() > 1);
}

#[test]
fn escalation_stops_at_the_deadline() {
    let provider = CountingProvider::new(60);
    let cfg = RouterConfig {
        deadline_ms: 100,
        max_facets: 3,
        facet_terms: 1,
        ..config(RetrievalMode::HybridAgentic)
    };
    let router = RetrievalRouter::new(cfg, FusionConfig::default()).with_provider(provider.clone());

    let out = router.route(&query("rotate signing keys quarterly everywhere"), &corpus());

    assert_eq!(out.decision.facets_planned, 3);
    assert!(out.decision.facets_run < out.decision.facets_planned);
    assert!(out.decision.timed_out);
    let escalation_ms = out.decision.total_ms - out.decision.primary_ms;
    assert!(escalation_ms < 100 + 60 + 200, "escalation took {escalation_ms}ms");
}

#[test]
fn provider_failure_degrades_to_lexical() {
    let provider = CountingProvider::failing();
    let router = RetrievalRouter::new(config(RetrievalMode::EmbeddingsOnly), FusionConfig::default())
        .with_provider(provider);

    let out = router.route(&query("database migrations integration tests"), &corpus());

    assert!(!out.decision.semantic_available);
    assert_eq!(
        out.hits.first().map(|h| h.key.as_str()),
        Some("db-migrations-before-tests")
    );
}

fn capped_router(window: usize, cap: f64) -> RetrievalRouter {
    RetrievalRouter::new(
        RouterConfig {
            rate_window: window,
            rate_cap: cap,
            ..config(RetrievalMode::Auto)
        },
        FusionConfig::default(),
    )
}

fn assert_windows_capped(flags: &[bool], window: usize, budget: usize) {
    for w in flags.windows(window) {
        assert!(w.iter().filter(|e| **e).count() <= budget, "window {w:?}");
    }
}

#[test]
fn rate_cap_bounds_escalations_in_every_window() {
    let router = capped_router(10, 0.3);
    let decisions: Vec<RoutingDecision> = (0..40)
        .map(|_| router.route(&query("format readme headings"), &[]).decision)
        .collect();

    let flags: Vec<bool> = decisions.iter().map(|d| d.escalated).collect();
    assert_windows_capped(&flags, 10, 3);
    assert!(decisions
        .iter()
        .any(|d| d.suppressed_by == Some(SuppressionReason::RateCap)));
    assert!(flags.iter().any(|e| *e));
}

#[test]
fn explicit_high_risk_is_exempt_from_the_cap() {
    let router = capped_router(10, 0.1);
    assert!(router.route(&query("format readme headings"), &[]).decision.escalated);
    assert!(!router.route(&query("format readme headings"), &[]).decision.escalated);

    let out = router.route(&risky("format readme headings"), &[]);
    assert!(out.decision.escalated);
}

#[test]
fn escalation_window_is_shared_through_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("router_window.json");
    let a = capped_router(10, 0.1).with_window_store(SnapshotStore::new(&path, Duration::from_millis(5)));
    let b = capped_router(10, 0.1).with_window_store(SnapshotStore::new(&path, Duration::from_millis(5)));

    assert!(a.route(&query("format readme headings"), &[]).decision.escalated);
    let out = b.route(&query("format readme headings"), &[]);
    assert_eq!(out.decision.suppressed_by, Some(SuppressionReason::RateCap));
}

#[test]
fn shared_window_keeps_every_process_call() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("router_window.json");
    let store = || SnapshotStore::<EscalationWindow>::new(&path, Duration::from_millis(5));
    let a = capped_router(10, 0.5).with_window_store(store());
    let b = capped_router(10, 0.5).with_window_store(store());

    a.route(&query("format readme headings"), &[]);
    b.route(&query("format readme headings"), &[]);
    a.route(&query("format readme headings"), &[]);

    let window = store().load().unwrap().value;
    assert_eq!(window.recent.len(), 3);
    let ids: std::collections::HashSet<_> = window.recent.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(window.capacity, 10);
}

#[test]
fn decisions_are_appended_to_the_log() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("routing_decisions.jsonl");
    let router = RetrievalRouter::new(config(RetrievalMode::Auto), FusionConfig::default())
        .with_decision_log(AppendLog::new(&log_path, LockPolicy::BestEffort, &StorageConfig::default()));

    router.route(&query("database migrations"), &corpus());
    router.route(&query("css grid layout"), &corpus());

    let reader = AppendLog::new(&log_path, LockPolicy::BestEffort, &StorageConfig::default());
    let logged: Vec<RoutingDecision> = reader.read_all().unwrap();
    assert_eq!(logged.len(), 2);
    assert!(logged[0].query_preview.contains("database"));
}

#[test]
fn large_corpus_is_prefiltered() {
    let mut big: Vec<Insight> = (0..500)
        .map(|i| Insight::new(format!("filler-{i}"), "misc", format!("filler note number {i} about gardening"), 0.5))
        .collect();
    big.push(Insight::new(
        "kafka-offsets",
        "ops",
        "Commit kafka consumer offsets only after the batch is persisted",
        0.8,
    ));
    let router = RetrievalRouter::new(config(RetrievalMode::EmbeddingsOnly), FusionConfig::default());

    let out = router.route(&query("kafka consumer offsets"), &big);

    assert!(out.decision.prefiltered_to.is_some_and(|n| n <= RouterConfig::default().prefilter_max));
    assert_eq!(out.hits.first().map(|h| h.key.as_str()), Some("kafka-offsets"));
}

proptest! {
    #[test]
    fn limiter_never_exceeds_budget(
        size in 1usize..30,
        cap in 0.0f64..1.0,
        wants in proptest::collection::vec(any::<bool>(), 0..200),
    ) {
        let mut limiter = EscalationLimiter::new(size, cap);
        let budget = limiter.budget();
        let mut admitted = Vec::with_capacity(wants.len());
        for want in wants {
            let allowed = want && limiter.allows();
            limiter.record(allowed);
            admitted.push(allowed);
        }
        for w in admitted.windows(size) {
            prop_assert!(w.iter().filter(|e| **e).count() <= budget);
        }
        prop_assert!(limiter.rate() <= 1.0);
    }
}
