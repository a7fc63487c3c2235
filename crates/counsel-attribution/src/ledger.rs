//! AttributionLedger: retrieval/outcome tracking, promotion state, and
//! effectiveness counters behind one re-read/merge/rename protocol.
//!
//! Every mutation refreshes from disk, applies the change in memory,
//! re-reads and merges again right before the atomic write, evicts down to
//! `max_records`, and appends a one-line summary to the snapshot log.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use counsel_core::config::{AttributionConfig, StorageConfig};
use counsel_core::errors::{AttributionError, CounselError, CounselResult, StorageError};
use counsel_core::models::{
    InsightEffectiveness, OutcomeKind, SourceKind, ToolOutcomeStats,
};
use counsel_core::traits::{IEffectivenessOracle, IInsightCorpus};
use counsel_storage::{AppendLog, LockPolicy, Mergeable, SnapshotStore, StateLayout};

use crate::counters::{normalize_tool, CounterRepair, EffectivenessCounters};
use crate::promotion::{self, PromotionState};
use crate::record::{merge_record, OutcomeRecord};
use crate::reports::{self, EffectivenessReport, SourceAttributionReport};

/// Persisted ledger: one record per learning id plus promotion state per insight key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerFile {
    pub records: BTreeMap<String, OutcomeRecord>,
    pub promotion: BTreeMap<String, PromotionState>,
}

impl Mergeable for LedgerFile {
    fn merge(local: &Self, remote: &Self) -> Self {
        let mut records = remote.records.clone();
        for (id, r) in &local.records {
            let merged = match records.get(id) {
                Some(other) => merge_record(r, other),
                None => r.clone(),
            };
            records.insert(id.clone(), merged);
        }
        let mut promotion = remote.promotion.clone();
        for (key, s) in &local.promotion {
            let merged = match promotion.get(key) {
                Some(other) => promotion::merge_state(s, other),
                None => s.clone(),
            };
            promotion.insert(key.clone(), merged);
        }
        LedgerFile { records, promotion }
    }
}

/// Drop records beyond `max`: open (never acted on) records first, then the
/// oldest acted ones. Returns the number evicted.
pub fn evict(file: &mut LedgerFile, max: usize) -> usize {
    let excess = file.records.len().saturating_sub(max);
    if excess == 0 {
        return 0;
    }
    let mut order: Vec<(bool, DateTime<Utc>, String)> = file
        .records
        .values()
        .map(|r| (r.acted_on, r.retrieved_at, r.learning_id.clone()))
        .collect();
    order.sort();
    for (_, _, id) in order.into_iter().take(excess) {
        file.records.remove(&id);
    }
    excess
}

/// A retrieval that starts or restarts an attribution attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalEvent {
    pub learning_id: String,
    pub content: String,
    pub insight_key: Option<String>,
    pub source: Option<SourceKind>,
    pub trace_id: Option<String>,
    pub tool: Option<String>,
    /// Event time; now when absent.
    pub at: Option<DateTime<Utc>>,
}

impl RetrievalEvent {
    pub fn new(learning_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            learning_id: learning_id.into(),
            content: content.into(),
            insight_key: None,
            source: None,
            trace_id: None,
            tool: None,
            at: None,
        }
    }
}

/// An outcome reported against a learning id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeEvent {
    pub learning_id: String,
    pub outcome: OutcomeKind,
    pub evidence: String,
    pub trace_id: Option<String>,
    pub insight_key: Option<String>,
    pub source: Option<SourceKind>,
    pub tool: Option<String>,
    pub at: Option<DateTime<Utc>>,
}

impl OutcomeEvent {
    pub fn new(learning_id: impl Into<String>, outcome: OutcomeKind) -> Self {
        Self {
            learning_id: learning_id.into(),
            outcome,
            evidence: String::new(),
            trace_id: None,
            insight_key: None,
            source: None,
            tool: None,
            at: None,
        }
    }

    pub fn with_trace(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = evidence.into();
        self
    }

    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = Some(at);
        self
    }
}

/// How one outcome was attributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeAttribution {
    pub learning_id: String,
    pub insight_key: Option<String>,
    pub strict: bool,
    pub latency_s: Option<f64>,
    /// Whether the outcome moved promotion counters.
    pub counted: bool,
    /// The outcome predates the active attempt and was ignored.
    pub stale: bool,
}

/// One line of `advice_given.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceGivenRecord {
    pub at: DateTime<Utc>,
    pub advice_id: String,
    pub source: SourceKind,
    #[serde(default)]
    pub insight_key: Option<String>,
    pub tool: String,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub cache_hit: bool,
}

/// One line of `ledger_snapshots.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshotLine {
    pub at: DateTime<Utc>,
    pub records: usize,
    pub acted_on: usize,
    pub insights: usize,
    pub evicted: usize,
    pub given: u64,
    pub followed: u64,
    pub helpful: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairReport {
    pub counters: CounterRepair,
    pub records_repaired: usize,
    pub records_evicted: usize,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.counters == CounterRepair::default()
            && self.records_repaired == 0
            && self.records_evicted == 0
    }
}

struct LedgerState {
    file: LedgerFile,
    counters: EffectivenessCounters,
}

struct LedgerStores {
    ledger: SnapshotStore<LedgerFile>,
    counters: SnapshotStore<EffectivenessCounters>,
    snapshots: AppendLog,
    advice_given: AppendLog,
}

pub struct AttributionLedger {
    config: RwLock<AttributionConfig>,
    helpfulness_min_followed: AtomicU64,
    state: Mutex<LedgerState>,
    stores: Option<LedgerStores>,
    corpus: Option<Arc<dyn IInsightCorpus>>,
}

impl AttributionLedger {
    /// A ledger that lives only in this process.
    pub fn in_memory(config: AttributionConfig) -> Self {
        Self {
            config: RwLock::new(config),
            helpfulness_min_followed: AtomicU64::new(0),
            state: Mutex::new(LedgerState {
                file: LedgerFile::default(),
                counters: EffectivenessCounters::default(),
            }),
            stores: None,
            corpus: None,
        }
    }

    /// A ledger shared with other processes through `layout`.
    pub fn open(
        layout: &StateLayout,
        config: AttributionConfig,
        storage: &StorageConfig,
    ) -> CounselResult<Self> {
        layout.ensure()?;
        let delay = Duration::from_millis(storage.corrupt_retry_delay_ms);
        let stores = LedgerStores {
            ledger: SnapshotStore::new(layout.outcome_ledger(), delay),
            counters: SnapshotStore::new(layout.effectiveness(), delay),
            snapshots: AppendLog::new(layout.ledger_snapshots(), LockPolicy::BestEffort, storage),
            advice_given: AppendLog::new(layout.advice_given(), LockPolicy::FailClosed, storage),
        };
        let mut ledger = Self::in_memory(config);
        ledger.stores = Some(stores);
        ledger.refresh()?;
        Ok(ledger)
    }

    /// Propagate outcomes into the corpus reliability counters.
    pub fn with_corpus(mut self, corpus: Arc<dyn IInsightCorpus>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    /// Follows needed before a source's helpfulness leaves 0.5.
    pub fn with_helpfulness_min(self, min_followed: u64) -> Self {
        self.helpfulness_min_followed
            .store(min_followed, Ordering::Relaxed);
        self
    }

    pub fn config(&self) -> AttributionConfig {
        self.config.read().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn reload(&self, config: AttributionConfig, helpfulness_min_followed: u64) {
        if let Ok(mut c) = self.config.write() {
            *c = config;
        }
        self.helpfulness_min_followed
            .store(helpfulness_min_followed, Ordering::Relaxed);
    }

    /// Re-read persisted state and merge it into memory. Counters are
    /// normalized on the way in.
    pub fn refresh(&self) -> CounselResult<()> {
        let Some(stores) = &self.stores else {
            return Ok(());
        };
        let file = stores.ledger.load()?.value;
        let mut counters = stores.counters.load()?.value;
        let repaired = counters.repair();
        if repaired != CounterRepair::default() {
            warn!(
                sources = ?repaired.sources_clamped,
                markers = repaired.markers_dropped,
                "effectiveness counters normalized on load"
            );
        }
        let mut state = self.lock()?;
        state.file = LedgerFile::merge(&state.file, &file);
        state.counters = EffectivenessCounters::merge(&state.counters, &counters);
        Ok(())
    }

    // ── retrieval / outcome ──────────────────────────────────────────────

    /// Start (or restart) the attribution attempt for `event.learning_id`.
    pub fn track_retrieval(&self, event: RetrievalEvent) -> CounselResult<()> {
        self.track_retrievals(std::slice::from_ref(&event))
    }

    /// Track several retrievals with one save.
    pub fn track_retrievals(&self, events: &[RetrievalEvent]) -> CounselResult<()> {
        if events.is_empty() {
            return Ok(());
        }
        self.refresh()?;
        let now = Utc::now();
        let mut state = self.lock()?;
        for event in events {
            let at = event.at.unwrap_or(now);
            let record = state
                .file
                .records
                .entry(event.learning_id.clone())
                .or_insert_with(|| {
                    let mut r = OutcomeRecord::retrieved(&event.learning_id, at);
                    r.retrieval_count = 0;
                    r
                });
            if at >= record.retrieved_at || record.retrieval_count == 0 {
                record.restart(at);
                record.trace_id = event.trace_id.clone();
                if !event.content.is_empty() {
                    record.content = event.content.clone();
                }
                if event.insight_key.is_some() {
                    record.insight_key = event.insight_key.clone();
                }
                if event.source.is_some() {
                    record.source = event.source;
                }
                if let Some(tool) = &event.tool {
                    record.tool = Some(normalize_tool(tool));
                }
            } else {
                // Older than the active attempt: only backfill.
                record.retrieval_count += 1;
                if record.content.is_empty() {
                    record.content = event.content.clone();
                }
                if record.insight_key.is_none() {
                    record.insight_key = event.insight_key.clone();
                }
                if record.source.is_none() {
                    record.source = event.source;
                }
                if record.tool.is_none() {
                    record.tool = event.tool.as_deref().map(normalize_tool);
                }
            }
        }
        debug!(count = events.len(), "retrievals tracked");
        self.persist_ledger(&mut state)
    }

    /// Record an outcome. Strict when the trace matches the retrieval and the
    /// latency is within the strict window; weak otherwise.
    pub fn track_outcome(&self, event: OutcomeEvent) -> CounselResult<OutcomeAttribution> {
        self.refresh()?;
        let config = self.config();
        let at = event.at.unwrap_or_else(Utc::now);
        let mut state = self.lock()?;

        let record = state
            .file
            .records
            .entry(event.learning_id.clone())
            .or_insert_with(|| {
                debug!(learning_id = %event.learning_id, "outcome without retrieval, weak only");
                let mut r = OutcomeRecord::retrieved(&event.learning_id, at);
                r.retrieval_count = 0;
                r.insight_key = event.insight_key.clone();
                r.source = event.source;
                r.tool = event.tool.as_deref().map(normalize_tool);
                r
            });

        if at < record.retrieved_at {
            debug!(learning_id = %event.learning_id, "stale outcome ignored");
            return Ok(OutcomeAttribution {
                learning_id: event.learning_id,
                insight_key: record.insight_key.clone(),
                strict: false,
                latency_s: None,
                counted: false,
                stale: true,
            });
        }

        let first_report = !record.acted_on;
        let latency = (at - record.retrieved_at).num_milliseconds().max(0) as f64 / 1_000.0;
        let traced = matches!(
            (&record.trace_id, &event.trace_id),
            (Some(a), Some(b)) if a == b
        );
        let strict = traced && latency <= config.strict_window_secs as f64;

        if record.insight_key.is_none() {
            record.insight_key = event.insight_key.clone();
        }
        if record.source.is_none() {
            record.source = event.source;
        }
        if record.tool.is_none() {
            record.tool = event.tool.as_deref().map(normalize_tool);
        }
        record.acted_on = true;
        record.outcome = event.outcome;
        record.outcome_at = Some(at);
        record.outcome_trace_id = event.trace_id.clone();
        record.latency_s = Some(latency);
        record.strict = strict;
        record.evidence = event.evidence.clone();

        let insight_key = record.insight_key.clone();
        let promotion_key = insight_key
            .clone()
            .unwrap_or_else(|| event.learning_id.clone());
        let counted = first_report && event.outcome.is_decisive();
        if counted {
            let entry = state.file.promotion.entry(promotion_key).or_default();
            promotion::apply_outcome(entry, event.outcome, strict, &config, at);
        }
        self.persist_ledger(&mut state)?;
        drop(state);

        if counted {
            if let (Some(corpus), Some(key)) = (&self.corpus, &insight_key) {
                if let Err(e) = corpus.record_outcome(key, event.outcome) {
                    warn!(insight_key = %key, error = %e, "corpus reliability update failed");
                }
            }
        }

        info!(
            event = "outcome_recorded",
            learning_id = %event.learning_id,
            outcome = %event.outcome,
            strict,
            counted,
            latency_s = latency,
            "outcome attributed"
        );
        Ok(OutcomeAttribution {
            learning_id: event.learning_id,
            insight_key,
            strict,
            latency_s: Some(latency),
            counted,
            stale: false,
        })
    }

    /// Open attempts for `tool`: those retrieved under `trace_id` when any
    /// exist, else every open attempt within the outcome lookback.
    pub fn open_retrievals(
        &self,
        tool: &str,
        trace_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> CounselResult<Vec<OutcomeRecord>> {
        self.refresh()?;
        let lookback = chrono::Duration::seconds(
            self.config().outcome_lookback_secs.min(u64::from(u32::MAX)) as i64,
        );
        let tool = normalize_tool(tool);
        let state = self.lock()?;
        let open: Vec<&OutcomeRecord> = state
            .file
            .records
            .values()
            .filter(|r| r.is_open() && r.tool.as_deref() == Some(tool.as_str()))
            .collect();

        if let Some(trace) = trace_id {
            let traced: Vec<OutcomeRecord> = open
                .iter()
                .filter(|r| r.trace_id.as_deref() == Some(trace))
                .map(|r| (*r).clone())
                .collect();
            if !traced.is_empty() {
                return Ok(traced);
            }
        }
        Ok(open
            .into_iter()
            .filter(|r| r.retrieved_at <= now && now - r.retrieved_at <= lookback)
            .cloned()
            .collect())
    }

    pub fn record(&self, learning_id: &str) -> Option<OutcomeRecord> {
        self.lock().ok()?.file.records.get(learning_id).cloned()
    }

    pub fn record_count(&self) -> usize {
        self.lock().map(|s| s.file.records.len()).unwrap_or(0)
    }

    // ── effectiveness ────────────────────────────────────────────────────

    pub fn get_insight_effectiveness(&self, insight_key: &str) -> InsightEffectiveness {
        self.effectiveness_at(insight_key, Utc::now())
    }

    pub fn effectiveness_at(&self, insight_key: &str, now: DateTime<Utc>) -> InsightEffectiveness {
        let config = self.config();
        self.lock()
            .ok()
            .and_then(|s| s.file.promotion.get(insight_key).cloned())
            .map_or(InsightEffectiveness::NEUTRAL, |p| {
                promotion::effectiveness(&p, &config, now)
            })
    }

    pub fn promotion_state(&self, insight_key: &str) -> Option<PromotionState> {
        self.lock().ok()?.file.promotion.get(insight_key).cloned()
    }

    /// Log advice handed to the agent and bump `given`. The log is
    /// load-bearing: a lock failure refuses the write and surfaces an error.
    pub fn log_advice_given(&self, given: &[AdviceGivenRecord]) -> CounselResult<()> {
        if given.is_empty() {
            return Ok(());
        }
        if let Some(stores) = &self.stores {
            for line in given {
                stores.advice_given.append(line).map_err(log_unavailable)?;
            }
        }
        self.update_counters(|c| {
            for line in given {
                c.record_given(&line.advice_id, line.source);
            }
        })
    }

    /// Idempotently mark advice as followed (and helpful). Advice that was
    /// never logged as given is left alone.
    pub fn mark_followed(&self, advice_id: &str, helpful: bool) -> CounselResult<(bool, bool)> {
        let mut changed = (false, false);
        self.update_counters(|c| {
            changed = c.mark_followed(advice_id, helpful, Utc::now());
        })?;
        Ok(changed)
    }

    pub fn record_tool_outcome(&self, tool: &str, success: bool) -> CounselResult<()> {
        self.update_counters(|c| c.record_tool_outcome(tool, success))
    }

    pub fn counters(&self) -> EffectivenessCounters {
        self.lock().map(|s| s.counters.clone()).unwrap_or_default()
    }

    // ── reports ──────────────────────────────────────────────────────────

    /// Attribution by source over the `limit` most recent records.
    /// `window_secs` overrides the strict window.
    pub fn get_source_attribution(
        &self,
        limit: usize,
        window_secs: Option<u64>,
        require_trace: bool,
    ) -> SourceAttributionReport {
        let window = window_secs.unwrap_or_else(|| self.config().strict_window_secs);
        match self.lock() {
            Ok(state) => reports::source_attribution(
                state.file.records.values(),
                limit,
                window,
                require_trace,
                Utc::now(),
            ),
            Err(_) => SourceAttributionReport::default(),
        }
    }

    pub fn get_effectiveness_report(&self) -> EffectivenessReport {
        let config = self.config();
        match self.lock() {
            Ok(state) => reports::effectiveness_report(
                &state.counters,
                state.file.records.values(),
                &state.file.promotion,
                &config,
                Utc::now(),
            ),
            Err(_) => EffectivenessReport::default(),
        }
    }

    // ── repair ───────────────────────────────────────────────────────────

    /// Clamp counters, fix inconsistent records, and evict overflow.
    /// Idempotent: a second run reports nothing.
    pub fn repair(&self) -> CounselResult<RepairReport> {
        self.refresh()?;
        let max = self.config().max_records;
        let mut state = self.lock()?;
        let mut report = RepairReport {
            counters: state.counters.repair(),
            ..RepairReport::default()
        };
        for r in state.file.records.values_mut() {
            if r.repair() {
                report.records_repaired += 1;
            }
        }
        report.records_evicted = evict(&mut state.file, max);

        if let Some(stores) = &self.stores {
            stores.counters.save(&state.counters)?;
            stores.ledger.save(&state.file)?;
        }
        if !report.is_clean() {
            warn!(
                sources = ?report.counters.sources_clamped,
                records = report.records_repaired,
                evicted = report.records_evicted,
                "attribution state repaired"
            );
        }
        Ok(report)
    }

    // ── internals ────────────────────────────────────────────────────────

    fn lock(&self) -> CounselResult<MutexGuard<'_, LedgerState>> {
        self.state.lock().map_err(|_| CounselError::InvariantViolation {
            details: "attribution ledger lock poisoned".to_string(),
        })
    }

    fn update_counters(&self, apply: impl FnOnce(&mut EffectivenessCounters)) -> CounselResult<()> {
        self.refresh()?;
        let mut state = self.lock()?;
        apply(&mut state.counters);
        if let Some(stores) = &self.stores {
            state.counters = stores.counters.merge_and_save(&state.counters)?;
        }
        Ok(())
    }

    fn persist_ledger(&self, state: &mut LedgerState) -> CounselResult<()> {
        let max = self.config().max_records;
        let Some(stores) = &self.stores else {
            evict(&mut state.file, max);
            return Ok(());
        };
        let remote = stores.ledger.load()?.value;
        let mut merged = LedgerFile::merge(&state.file, &remote);
        let evicted = evict(&mut merged, max);
        stores.ledger.save(&merged)?;
        state.file = merged;

        let totals = state.counters.totals();
        let line = LedgerSnapshotLine {
            at: Utc::now(),
            records: state.file.records.len(),
            acted_on: state.file.records.values().filter(|r| r.acted_on).count(),
            insights: state.file.promotion.len(),
            evicted,
            given: totals.given,
            followed: totals.followed,
            helpful: totals.helpful,
        };
        if let Err(e) = stores.snapshots.append(&line) {
            debug!(error = %e, "ledger snapshot line dropped");
        }
        Ok(())
    }
}

fn log_unavailable(e: StorageError) -> CounselError {
    match e {
        StorageError::LockUnavailable { .. } => AttributionError::LogUnavailable {
            reason: e.to_string(),
        }
        .into(),
        other => other.into(),
    }
}

impl IEffectivenessOracle for AttributionLedger {
    fn insight_effectiveness(&self, insight_key: &str) -> InsightEffectiveness {
        self.get_insight_effectiveness(insight_key)
    }

    fn source_helpfulness(&self, source: SourceKind) -> f64 {
        let min = self.helpfulness_min_followed.load(Ordering::Relaxed);
        self.lock()
            .map(|s| s.counters.helpfulness(source, min))
            .unwrap_or(0.5)
    }

    fn tool_outcomes(&self, tool: &str) -> ToolOutcomeStats {
        self.lock()
            .map(|s| s.counters.tool_outcomes(tool))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn retrieve(id: &str, key: &str, trace: &str, at: DateTime<Utc>) -> RetrievalEvent {
        RetrievalEvent {
            insight_key: Some(key.into()),
            source: Some(SourceKind::Corpus),
            trace_id: Some(trace.into()),
            tool: Some("Bash".into()),
            at: Some(at),
            ..RetrievalEvent::new(id, "text")
        }
    }

    #[test]
    fn eviction_prefers_open_records() {
        let mut file = LedgerFile::default();
        let mut acted = OutcomeRecord::retrieved("acted", t(0));
        acted.acted_on = true;
        acted.outcome_at = Some(t(1));
        file.records.insert("acted".into(), acted);
        file.records
            .insert("open-new".into(), OutcomeRecord::retrieved("open-new", t(50)));
        file.records
            .insert("open-old".into(), OutcomeRecord::retrieved("open-old", t(10)));
        assert_eq!(evict(&mut file, 1), 2);
        assert!(file.records.contains_key("acted"));
    }

    #[test]
    fn strict_needs_matching_trace_within_window() {
        let ledger = AttributionLedger::in_memory(AttributionConfig {
            strict_window_secs: 60,
            ..AttributionConfig::default()
        });
        ledger.track_retrieval(retrieve("a", "k", "t1", t(0))).unwrap();
        ledger.track_retrieval(retrieve("b", "k", "t1", t(0))).unwrap();
        ledger.track_retrieval(retrieve("c", "k", "t1", t(0))).unwrap();

        let ok = ledger
            .track_outcome(OutcomeEvent::new("a", OutcomeKind::Good).with_trace("t1").at(t(30)))
            .unwrap();
        let wrong_trace = ledger
            .track_outcome(OutcomeEvent::new("b", OutcomeKind::Good).with_trace("t2").at(t(30)))
            .unwrap();
        let late = ledger
            .track_outcome(OutcomeEvent::new("c", OutcomeKind::Good).with_trace("t1").at(t(90)))
            .unwrap();
        assert!(ok.strict);
        assert!(!wrong_trace.strict);
        assert!(!late.strict);
        assert!(ok.counted && wrong_trace.counted && late.counted);
    }

    #[test]
    fn stale_outcome_is_ignored() {
        let ledger = AttributionLedger::in_memory(AttributionConfig::default());
        ledger.track_retrieval(retrieve("a", "k", "t1", t(100))).unwrap();
        let r = ledger
            .track_outcome(OutcomeEvent::new("a", OutcomeKind::Bad).at(t(50)))
            .unwrap();
        assert!(r.stale);
        assert!(ledger.record("a").unwrap().is_open());
    }

    #[test]
    fn second_report_for_one_attempt_is_not_counted() {
        let ledger = AttributionLedger::in_memory(AttributionConfig::default());
        ledger.track_retrieval(retrieve("a", "k", "t1", t(0))).unwrap();
        let first = ledger
            .track_outcome(OutcomeEvent::new("a", OutcomeKind::Good).at(t(5)))
            .unwrap();
        let second = ledger
            .track_outcome(OutcomeEvent::new("a", OutcomeKind::Good).at(t(6)))
            .unwrap();
        assert!(first.counted);
        assert!(!second.counted);
        assert_eq!(ledger.promotion_state("k").unwrap().weak_good, 1);
    }

    #[test]
    fn unknown_learning_creates_weak_only_record() {
        let ledger = AttributionLedger::in_memory(AttributionConfig::default());
        let r = ledger
            .track_outcome(OutcomeEvent::new("ghost", OutcomeKind::Good).with_trace("t1"))
            .unwrap();
        assert!(!r.strict);
        assert!(r.counted);
        let record = ledger.record("ghost").unwrap();
        assert!(record.acted_on);
        assert_eq!(record.retrieval_count, 0);
    }

    #[test]
    fn open_retrievals_prefer_trace() {
        let ledger = AttributionLedger::in_memory(AttributionConfig::default());
        let now = Utc::now();
        ledger.track_retrieval(retrieve("a", "k1", "t1", now)).unwrap();
        ledger.track_retrieval(retrieve("b", "k2", "t2", now)).unwrap();
        let traced = ledger.open_retrievals("bash", Some("t1"), now).unwrap();
        assert_eq!(traced.len(), 1);
        assert_eq!(traced[0].learning_id, "a");
        let all = ledger.open_retrievals("BASH", Some("t9"), now).unwrap();
        assert_eq!(all.len(), 2);
        assert!(ledger.open_retrievals("edit", None, now).unwrap().is_empty());
    }
}
