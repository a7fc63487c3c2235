//! Summaries over routing decisions: escalation rate, timeouts, latency percentiles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use counsel_core::errors::StorageError;
use counsel_core::models::RoutingDecision;
use counsel_storage::AppendLog;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingSummary {
    pub count: usize,
    pub escalated: usize,
    pub escalation_rate: f64,
    pub timeouts: usize,
    pub avg_total_ms: f64,
    pub p95_total_ms: u64,
    /// Escalation reasons seen, by name.
    pub reasons: BTreeMap<String, usize>,
    /// Suppressions seen, by name.
    pub suppressions: BTreeMap<String, usize>,
    /// Decisions per retrieval mode.
    pub modes: BTreeMap<String, usize>,
}

pub fn summarize_decisions(decisions: &[RoutingDecision]) -> RoutingSummary {
    if decisions.is_empty() {
        return RoutingSummary::default();
    }
    let mut summary = RoutingSummary {
        count: decisions.len(),
        ..RoutingSummary::default()
    };
    let mut latencies: Vec<u64> = Vec::with_capacity(decisions.len());
    for d in decisions {
        if d.escalated {
            summary.escalated += 1;
        }
        if d.timed_out {
            summary.timeouts += 1;
        }
        for reason in &d.reasons {
            *summary.reasons.entry(reason.as_str().to_string()).or_default() += 1;
        }
        if let Some(s) = d.suppressed_by {
            *summary.suppressions.entry(s.as_str().to_string()).or_default() += 1;
        }
        *summary.modes.entry(d.mode.as_str().to_string()).or_default() += 1;
        latencies.push(d.total_ms);
    }
    summary.escalation_rate = summary.escalated as f64 / summary.count as f64;
    summary.avg_total_ms = latencies.iter().sum::<u64>() as f64 / latencies.len() as f64;
    latencies.sort_unstable();
    let idx = ((0.95 * (latencies.len() - 1) as f64).round() as usize).min(latencies.len() - 1);
    summary.p95_total_ms = latencies[idx];
    summary
}

/// Summarize the last `n` lines of a routing decision log.
pub fn summarize_log(log: &AppendLog, n: usize) -> Result<RoutingSummary, StorageError> {
    let decisions: Vec<RoutingDecision> = log.tail(n)?;
    Ok(summarize_decisions(&decisions))
}
