//! Bounded roast history and the windowed quality-rate metric.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use counsel_core::models::Verdict;

/// Trace id prefixes that mark synthetic traffic.
const SYNTHETIC_TRACE_PREFIXES: &[&str] = &["test-", "test_", "synthetic", "bench-", "selftest"];

/// Who is asking for a roast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoastContext {
    pub trace_id: Option<String>,
    /// Free-form origin label, e.g. the capturing hook.
    pub source: Option<String>,
    /// Explicitly synthetic (tests, benchmarks). Also inferred from the trace id.
    pub synthetic: bool,
}

impl RoastContext {
    pub fn traced(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: Some(trace_id.into()),
            ..Self::default()
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
            || self.source.as_deref() == Some("test")
            || self.trace_id.as_deref().is_some_and(|t| {
                let t = t.to_ascii_lowercase();
                SYNTHETIC_TRACE_PREFIXES.iter().any(|p| t.starts_with(p))
            })
    }
}

/// One line of `roast_history.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoastRecord {
    pub timestamp: DateTime<Utc>,
    pub verdict: Verdict,
    pub total: u32,
    pub dedup_hash: String,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub synthetic: bool,
    #[serde(default)]
    pub noise: Option<String>,
    #[serde(default)]
    pub refined: bool,
}

/// Quality rate over the recent window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityRate {
    /// Records that counted after exclusions and per-trace caps.
    pub sampled: usize,
    pub quality: usize,
    pub rate: f64,
}

/// In-memory tail of roast records.
#[derive(Debug, Clone, Default)]
pub struct RoastHistory {
    records: VecDeque<RoastRecord>,
    max: usize,
}

impl RoastHistory {
    pub fn new(max: usize) -> Self {
        Self {
            records: VecDeque::new(),
            max: max.max(1),
        }
    }

    pub fn from_records(records: impl IntoIterator<Item = RoastRecord>, max: usize) -> Self {
        let mut history = Self::new(max);
        for r in records {
            history.push(r);
        }
        history
    }

    pub fn push(&mut self, record: RoastRecord) {
        self.records.push_back(record);
        while self.records.len() > self.max {
            self.records.pop_front();
        }
    }

    pub fn set_max(&mut self, max: usize) {
        self.max = max.max(1);
        while self.records.len() > self.max {
            self.records.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &RoastRecord> {
        self.records.iter()
    }

    /// Share of `quality` verdicts among the newest `window` records.
    ///
    /// Synthetic records are skipped; each trace contributes at most
    /// `max_per_trace` samples (its newest ones). Untraced records are
    /// counted individually.
    pub fn quality_rate(&self, window: usize, max_per_trace: usize) -> QualityRate {
        let mut per_trace: HashMap<&str, usize> = HashMap::new();
        let mut out = QualityRate::default();
        for record in self.records.iter().rev().take(window) {
            if record.synthetic {
                continue;
            }
            if let Some(trace) = record.trace_id.as_deref() {
                let seen = per_trace.entry(trace).or_insert(0);
                if *seen >= max_per_trace {
                    continue;
                }
                *seen += 1;
            }
            out.sampled += 1;
            if record.verdict == Verdict::Quality {
                out.quality += 1;
            }
        }
        if out.sampled > 0 {
            out.rate = out.quality as f64 / out.sampled as f64;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(verdict: Verdict, trace: Option<&str>, synthetic: bool) -> RoastRecord {
        RoastRecord {
            timestamp: Utc::now(),
            verdict,
            total: 0,
            dedup_hash: String::new(),
            trace_id: trace.map(str::to_string),
            synthetic,
            noise: None,
            refined: false,
        }
    }

    #[test]
    fn synthetic_traffic_is_excluded() {
        let mut h = RoastHistory::new(10);
        h.push(record(Verdict::Quality, None, true));
        h.push(record(Verdict::Primitive, None, false));
        let rate = h.quality_rate(10, 3);
        assert_eq!((rate.sampled, rate.quality), (1, 0));
    }

    #[test]
    fn one_trace_cannot_dominate() {
        let mut h = RoastHistory::new(20);
        for _ in 0..10 {
            h.push(record(Verdict::Quality, Some("t1"), false));
        }
        h.push(record(Verdict::Primitive, Some("t2"), false));
        let rate = h.quality_rate(20, 3);
        assert_eq!(rate.sampled, 4);
        assert!((rate.rate - 0.75).abs() < 1e-9);
    }

    #[test]
    fn history_is_bounded() {
        let h = RoastHistory::from_records((0..5).map(|_| record(Verdict::NeedsWork, None, false)), 3);
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn synthetic_inferred_from_trace() {
        assert!(RoastContext::traced("test-123").is_synthetic());
        assert!(!RoastContext::traced("run-123").is_synthetic());
    }
}
