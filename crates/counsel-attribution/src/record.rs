//! One outcome record per learning id, and the merge rule for concurrent writers.
//!
//! Record fields follow last-writer-wins on `retrieved_at`: the newest
//! retrieval owns the active attempt. Metadata the winner lacks
//! (`insight_key`, `source`, `tool`) is backfilled from the older copy,
//! and `retrieval_count` only ever grows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use counsel_core::models::{OutcomeKind, SourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub learning_id: String,
    #[serde(default)]
    pub content: String,
    pub retrieved_at: DateTime<Utc>,
    #[serde(default)]
    pub insight_key: Option<String>,
    #[serde(default)]
    pub source: Option<SourceKind>,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub acted_on: bool,
    #[serde(default)]
    pub outcome: OutcomeKind,
    #[serde(default)]
    pub outcome_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub outcome_trace_id: Option<String>,
    #[serde(default)]
    pub latency_s: Option<f64>,
    /// Whether the recorded outcome met the strict gate.
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub evidence: String,
    #[serde(default)]
    pub retrieval_count: u64,
}

impl OutcomeRecord {
    /// A fresh attempt: retrieved, not yet acted on.
    pub fn retrieved(learning_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            learning_id: learning_id.into(),
            content: String::new(),
            retrieved_at: at,
            insight_key: None,
            source: None,
            trace_id: None,
            tool: None,
            acted_on: false,
            outcome: OutcomeKind::Unset,
            outcome_at: None,
            outcome_trace_id: None,
            latency_s: None,
            strict: false,
            evidence: String::new(),
            retrieval_count: 1,
        }
    }

    /// Start a new attempt on an existing record. Keeps identity metadata.
    pub fn restart(&mut self, at: DateTime<Utc>) {
        self.retrieved_at = at;
        self.acted_on = false;
        self.outcome = OutcomeKind::Unset;
        self.outcome_at = None;
        self.outcome_trace_id = None;
        self.latency_s = None;
        self.strict = false;
        self.evidence.clear();
        self.retrieval_count += 1;
    }

    /// Retrieved and still waiting for an outcome.
    pub fn is_open(&self) -> bool {
        !self.acted_on
    }

    /// `acted_on` implies `outcome_at`; latency is never negative.
    pub fn is_consistent(&self) -> bool {
        (!self.acted_on || self.outcome_at.is_some())
            && self.latency_s.map_or(true, |l| l >= 0.0)
    }

    /// Make the record consistent. Returns `true` when something changed.
    pub fn repair(&mut self) -> bool {
        let mut changed = false;
        if self.acted_on && self.outcome_at.is_none() {
            self.outcome_at = Some(self.retrieved_at);
            changed = true;
        }
        if let Some(l) = self.latency_s {
            if l < 0.0 || !l.is_finite() {
                self.latency_s = Some(0.0);
                changed = true;
            }
        }
        if !self.acted_on && self.outcome != OutcomeKind::Unset {
            self.outcome = OutcomeKind::Unset;
            self.strict = false;
            changed = true;
        }
        changed
    }
}

/// Merge two copies of the same learning's record.
pub fn merge_record(local: &OutcomeRecord, remote: &OutcomeRecord) -> OutcomeRecord {
    let local_wins = match local.retrieved_at.cmp(&remote.retrieved_at) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => attempt_progress(local) >= attempt_progress(remote),
    };
    let (winner, other) = if local_wins {
        (local, remote)
    } else {
        (remote, local)
    };

    let mut merged = winner.clone();
    if merged.insight_key.is_none() {
        merged.insight_key = other.insight_key.clone();
    }
    if merged.source.is_none() {
        merged.source = other.source;
    }
    if merged.tool.is_none() {
        merged.tool = other.tool.clone();
    }
    if merged.content.is_empty() {
        merged.content = other.content.clone();
    }
    merged.retrieval_count = local.retrieval_count.max(remote.retrieval_count);
    merged
}

/// Same attempt seen twice: the copy that got further wins.
fn attempt_progress(r: &OutcomeRecord) -> (bool, Option<DateTime<Utc>>) {
    (r.acted_on, r.outcome_at)
}
