//! Per-source effectiveness counters with idempotent followed/helpful marks.
//!
//! `given`, `followed` and `helpful` are grow-only; merge takes the max per
//! source, the union of idempotency markers and the max per tool.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use counsel_core::models::{SourceKind, ToolOutcomeStats};
use counsel_storage::Mergeable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceCounters {
    pub given: u64,
    pub followed: u64,
    pub helpful: u64,
}

impl SourceCounters {
    pub fn is_consistent(&self) -> bool {
        self.helpful <= self.followed && self.followed <= self.given
    }

    fn merge(&self, other: &SourceCounters) -> SourceCounters {
        SourceCounters {
            given: self.given.max(other.given),
            followed: self.followed.max(other.followed),
            helpful: self.helpful.max(other.helpful),
        }
    }

    fn add(&mut self, other: &SourceCounters) {
        self.given += other.given;
        self.followed += other.followed;
        self.helpful += other.helpful;
    }
}

/// What `repair` changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRepair {
    pub sources_clamped: Vec<SourceKind>,
    pub markers_dropped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectivenessCounters {
    pub by_source: BTreeMap<SourceKind, SourceCounters>,
    /// advice_id → when it was first marked followed.
    pub followed_ids: BTreeMap<String, DateTime<Utc>>,
    /// advice_id → when it was first marked helpful.
    pub helpful_ids: BTreeMap<String, DateTime<Utc>>,
    /// advice_id → source, learned when the advice was given.
    pub advice_sources: BTreeMap<String, SourceKind>,
    pub tools: BTreeMap<String, ToolOutcomeStats>,
}

impl EffectivenessCounters {
    pub fn record_given(&mut self, advice_id: &str, source: SourceKind) {
        self.by_source.entry(source).or_default().given += 1;
        self.advice_sources.insert(advice_id.to_string(), source);
    }

    /// Mark advice as followed (and helpful). Each advice id moves each
    /// counter at most once, and only after it was given.
    /// Returns `(followed_changed, helpful_changed)`.
    pub fn mark_followed(
        &mut self,
        advice_id: &str,
        helpful: bool,
        at: DateTime<Utc>,
    ) -> (bool, bool) {
        let Some(source) = self.advice_sources.get(advice_id).copied() else {
            return (false, false);
        };
        let mut followed_changed = false;
        let mut helpful_changed = false;
        if !self.followed_ids.contains_key(advice_id) {
            self.followed_ids.insert(advice_id.to_string(), at);
            self.by_source.entry(source).or_default().followed += 1;
            followed_changed = true;
        }
        if helpful && !self.helpful_ids.contains_key(advice_id) {
            self.helpful_ids.insert(advice_id.to_string(), at);
            self.by_source.entry(source).or_default().helpful += 1;
            helpful_changed = true;
        }
        (followed_changed, helpful_changed)
    }

    pub fn record_tool_outcome(&mut self, tool: &str, success: bool) {
        let stats = self.tools.entry(normalize_tool(tool)).or_default();
        if success {
            stats.good += 1;
        } else {
            stats.bad += 1;
        }
    }

    pub fn tool_outcomes(&self, tool: &str) -> ToolOutcomeStats {
        self.tools
            .get(&normalize_tool(tool))
            .copied()
            .unwrap_or_default()
    }

    /// helpful / followed for `source`, or 0.5 below `min_followed`.
    pub fn helpfulness(&self, source: SourceKind, min_followed: u64) -> f64 {
        match self.by_source.get(&source) {
            Some(c) if c.followed > 0 && c.followed >= min_followed => {
                (c.helpful as f64 / c.followed as f64).clamp(0.0, 1.0)
            }
            _ => 0.5,
        }
    }

    pub fn totals(&self) -> SourceCounters {
        let mut total = SourceCounters::default();
        for c in self.by_source.values() {
            total.add(c);
        }
        total
    }

    pub fn is_consistent(&self) -> bool {
        self.by_source.values().all(SourceCounters::is_consistent)
            && self.helpful_ids.keys().all(|id| self.followed_ids.contains_key(id))
    }

    /// Clamp `helpful ≤ followed ≤ given` per source and drop helpful
    /// markers with no followed marker. Idempotent.
    pub fn repair(&mut self) -> CounterRepair {
        let mut report = CounterRepair::default();
        for (source, c) in self.by_source.iter_mut() {
            if c.is_consistent() {
                continue;
            }
            c.followed = c.followed.min(c.given);
            c.helpful = c.helpful.min(c.followed);
            report.sources_clamped.push(*source);
        }
        let before = self.helpful_ids.len();
        let followed = &self.followed_ids;
        self.helpful_ids.retain(|id, _| followed.contains_key(id));
        report.markers_dropped = before - self.helpful_ids.len();
        report
    }
}

impl Mergeable for EffectivenessCounters {
    fn merge(local: &Self, remote: &Self) -> Self {
        let mut by_source = remote.by_source.clone();
        for (source, c) in &local.by_source {
            let merged = by_source.get(source).map_or(*c, |r| c.merge(r));
            by_source.insert(*source, merged);
        }

        let mut tools = remote.tools.clone();
        for (tool, s) in &local.tools {
            let entry = tools.entry(tool.clone()).or_default();
            entry.good = entry.good.max(s.good);
            entry.bad = entry.bad.max(s.bad);
        }

        EffectivenessCounters {
            by_source,
            followed_ids: union_earliest(&local.followed_ids, &remote.followed_ids),
            helpful_ids: union_earliest(&local.helpful_ids, &remote.helpful_ids),
            advice_sources: local
                .advice_sources
                .iter()
                .chain(&remote.advice_sources)
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            tools,
        }
    }
}

fn union_earliest(
    a: &BTreeMap<String, DateTime<Utc>>,
    b: &BTreeMap<String, DateTime<Utc>>,
) -> BTreeMap<String, DateTime<Utc>> {
    let mut out = b.clone();
    for (id, at) in a {
        out.entry(id.clone())
            .and_modify(|existing| *existing = (*existing).min(*at))
            .or_insert(*at);
    }
    out
}

pub fn normalize_tool(tool: &str) -> String {
    tool.trim().to_lowercase()
}
