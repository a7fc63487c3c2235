use chrono::Utc;

use counsel_core::config::StorageConfig;
use counsel_core::models::{EscalationReason, RetrievalMode, RoutingDecision, SuppressionReason};
use counsel_observability::{summarize_decisions, summarize_log};
use counsel_storage::{AppendLog, LockPolicy};

fn decision(escalated: bool, total_ms: u64) -> RoutingDecision {
    RoutingDecision {
        timestamp: Utc::now(),
        query_preview: "edit a.py".into(),
        mode: RetrievalMode::Auto,
        escalated,
        reasons: if escalated {
            vec![EscalationReason::LowTopScore]
        } else {
            Vec::new()
        },
        suppressed_by: None,
        high_risk: false,
        complexity: 1,
        corpus_size: 10,
        prefiltered_to: None,
        semantic_available: true,
        facets_planned: 0,
        facets_run: 0,
        timed_out: false,
        primary_ms: total_ms,
        total_ms,
        result_count: 3,
        top_score: 0.4,
    }
}

#[test]
fn empty_input_is_an_empty_summary() {
    let s = summarize_decisions(&[]);
    assert_eq!(s.count, 0);
    assert_eq!(s.escalation_rate, 0.0);
}

#[test]
fn rates_latency_and_histograms() {
    let mut decisions: Vec<RoutingDecision> = (1..=20).map(|i| decision(i % 4 == 0, i)).collect();
    decisions[0].timed_out = true;
    decisions[1].suppressed_by = Some(SuppressionReason::RateCap);

    let s = summarize_decisions(&decisions);
    assert_eq!(s.count, 20);
    assert_eq!(s.escalated, 5);
    assert!((s.escalation_rate - 0.25).abs() < 1e-9);
    assert_eq!(s.timeouts, 1);
    assert!((s.avg_total_ms - 10.5).abs() < 1e-9);
    assert_eq!(s.p95_total_ms, 19);
    assert_eq!(s.reasons["low_top_score"], 5);
    assert_eq!(s.suppressions["rate_cap"], 1);
    assert_eq!(s.modes["auto"], 20);
}

#[test]
fn summarizes_the_log_tail() {
    let dir = tempfile::tempdir().unwrap();
    let log = AppendLog::new(
        dir.path().join("routing_decisions.jsonl"),
        LockPolicy::BestEffort,
        &StorageConfig::default(),
    );
    for i in 0..10 {
        log.append(&decision(i >= 5, 10)).unwrap();
    }
    let s = summarize_log(&log, 5).unwrap();
    assert_eq!(s.count, 5);
    assert_eq!(s.escalated, 5);
}
