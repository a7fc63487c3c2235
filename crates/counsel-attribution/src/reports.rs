//! Read-only aggregations over the ledger.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use counsel_core::config::AttributionConfig;
use counsel_core::models::{OutcomeKind, PromotionTier, ToolOutcomeStats};

use crate::counters::{EffectivenessCounters, SourceCounters};
use crate::promotion::{self, PromotionState};
use crate::record::OutcomeRecord;

/// Tools listed per source in attribution reports.
pub const TOP_TOOLS: usize = 3;

/// Label for records retrieved without a source tag.
pub const UNKNOWN_SOURCE: &str = "unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceAttribution {
    pub source: String,
    pub retrieved: u64,
    pub acted_on: u64,
    pub good: u64,
    pub bad: u64,
    pub strict_acted_on: u64,
    pub strict_good: u64,
    pub strict_bad: u64,
    /// Tools with the most acted-on records from this source.
    pub top_tools: Vec<(String, u64)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceAttributionReport {
    pub generated_at: Option<DateTime<Utc>>,
    pub records_considered: usize,
    pub window_secs: u64,
    pub require_trace: bool,
    pub sources: Vec<SourceAttribution>,
}

/// Aggregate the `limit` most recent records by source.
///
/// A record lands in the strict bucket when its latency is within
/// `window_secs` and, with `require_trace`, its outcome carried the trace of
/// the retrieval.
pub fn source_attribution<'a>(
    records: impl IntoIterator<Item = &'a OutcomeRecord>,
    limit: usize,
    window_secs: u64,
    require_trace: bool,
    now: DateTime<Utc>,
) -> SourceAttributionReport {
    let mut recent: Vec<&OutcomeRecord> = records.into_iter().collect();
    recent.sort_by(|a, b| {
        b.retrieved_at
            .cmp(&a.retrieved_at)
            .then_with(|| a.learning_id.cmp(&b.learning_id))
    });
    recent.truncate(limit);

    let mut by_source: BTreeMap<String, SourceAttribution> = BTreeMap::new();
    let mut tools: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
    for r in &recent {
        let label = r
            .source
            .map_or_else(|| UNKNOWN_SOURCE.to_string(), |s| s.as_str().to_string());
        let row = by_source.entry(label.clone()).or_insert_with(|| SourceAttribution {
            source: label.clone(),
            ..SourceAttribution::default()
        });
        row.retrieved += r.retrieval_count.max(1);
        if !r.acted_on {
            continue;
        }
        row.acted_on += 1;
        match r.outcome {
            OutcomeKind::Good => row.good += 1,
            OutcomeKind::Bad => row.bad += 1,
            _ => {}
        }
        if is_strict(r, window_secs, require_trace) {
            row.strict_acted_on += 1;
            match r.outcome {
                OutcomeKind::Good => row.strict_good += 1,
                OutcomeKind::Bad => row.strict_bad += 1,
                _ => {}
            }
        }
        if let Some(tool) = &r.tool {
            *tools.entry(label).or_default().entry(tool.clone()).or_default() += 1;
        }
    }

    for (label, counts) in tools {
        if let Some(row) = by_source.get_mut(&label) {
            let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            ranked.truncate(TOP_TOOLS);
            row.top_tools = ranked;
        }
    }

    let mut sources: Vec<SourceAttribution> = by_source.into_values().collect();
    sources.sort_by(|a, b| b.retrieved.cmp(&a.retrieved).then_with(|| a.source.cmp(&b.source)));

    SourceAttributionReport {
        generated_at: Some(now),
        records_considered: recent.len(),
        window_secs,
        require_trace,
        sources,
    }
}

fn is_strict(r: &OutcomeRecord, window_secs: u64, require_trace: bool) -> bool {
    let in_window = r.latency_s.is_some_and(|l| l <= window_secs as f64);
    let traced = match (&r.trace_id, &r.outcome_trace_id) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    in_window && (traced || !require_trace)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEffectiveness {
    pub source: String,
    pub counters: SourceCounters,
    pub follow_rate: f64,
    pub helpful_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectivenessReport {
    pub generated_at: Option<DateTime<Utc>>,
    pub totals: SourceCounters,
    pub follow_rate: f64,
    pub helpful_rate: f64,
    pub by_source: Vec<SourceEffectiveness>,
    pub records: usize,
    pub open_records: usize,
    /// Insight count per promotion tier.
    pub tiers: BTreeMap<String, usize>,
    pub suppressed_keys: Vec<String>,
    pub tools: BTreeMap<String, ToolOutcomeStats>,
}

pub fn effectiveness_report<'a>(
    counters: &EffectivenessCounters,
    records: impl IntoIterator<Item = &'a OutcomeRecord>,
    promotion: &BTreeMap<String, PromotionState>,
    config: &AttributionConfig,
    now: DateTime<Utc>,
) -> EffectivenessReport {
    let totals = counters.totals();
    let by_source = counters
        .by_source
        .iter()
        .map(|(source, c)| SourceEffectiveness {
            source: source.as_str().to_string(),
            counters: *c,
            follow_rate: ratio(c.followed, c.given),
            helpful_rate: ratio(c.helpful, c.followed),
        })
        .collect();

    let mut records_n = 0;
    let mut open = 0;
    for r in records {
        records_n += 1;
        if r.is_open() {
            open += 1;
        }
    }

    let mut tiers: BTreeMap<String, usize> = BTreeMap::new();
    let mut suppressed_keys = Vec::new();
    for (key, state) in promotion {
        let e = promotion::effectiveness(state, config, now);
        *tiers.entry(e.tier.as_str().to_string()).or_default() += 1;
        if e.tier == PromotionTier::Suppressed {
            suppressed_keys.push(key.clone());
        }
    }

    EffectivenessReport {
        generated_at: Some(now),
        totals,
        follow_rate: ratio(totals.followed, totals.given),
        helpful_rate: ratio(totals.helpful, totals.followed),
        by_source,
        records: records_n,
        open_records: open,
        tiers,
        suppressed_keys,
        tools: counters.tools.clone(),
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
