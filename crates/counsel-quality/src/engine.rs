//! QualityGate: primitive battery, duplicate check, dimension scoring,
//! conservative refinement, and the roast history.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, RwLock};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use counsel_core::config::QualityConfig;
use counsel_core::models::{QualityDimensions, QualityScore, Verdict};
use counsel_core::text;
use counsel_storage::{AppendLog, Mergeable, SnapshotStore};

use crate::dimensions::{actionability, ethics, novelty, outcome, reasoning, specificity};
use crate::history::{QualityRate, RoastContext, RoastHistory, RoastRecord};
use crate::noise;
use crate::refine;
use crate::seen::SeenHashes;

/// Noise tag reported for empty or too-short input.
pub const TOO_SHORT: &str = "too_short";

/// Result of roasting one candidate learning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoastOutcome {
    /// Text as submitted.
    pub original: String,
    /// Text the verdict applies to: the refined text when refinement ran.
    pub text: String,
    pub refined: bool,
    pub score: QualityScore,
    /// Noise signature that short-circuited scoring.
    pub noise: Option<String>,
    pub dedup_hash: String,
}

impl RoastOutcome {
    pub fn verdict(&self) -> Verdict {
        self.score.verdict
    }
}

struct GateState {
    seen: SeenHashes,
    /// Token sets of recent non-duplicate learnings, for novelty.
    recent: VecDeque<HashSet<String>>,
    history: RoastHistory,
    appends_since_compact: usize,
}

pub struct QualityGate {
    config: RwLock<QualityConfig>,
    state: Mutex<GateState>,
    seen_store: Option<SnapshotStore<SeenHashes>>,
    history_log: Option<AppendLog>,
    log_max_lines: usize,
}

impl QualityGate {
    pub fn new(config: QualityConfig) -> Self {
        let history = RoastHistory::new(config.history_max);
        let seen = SeenHashes::bounded(config.seen_max);
        Self {
            config: RwLock::new(config),
            state: Mutex::new(GateState {
                seen,
                recent: VecDeque::new(),
                history,
                appends_since_compact: 0,
            }),
            seen_store: None,
            history_log: None,
            log_max_lines: usize::MAX,
        }
    }

    /// Share seen hashes with other processes through `store`.
    pub fn with_seen_store(mut self, store: SnapshotStore<SeenHashes>) -> Self {
        self.seen_store = Some(store);
        self
    }

    /// Persist roast records to `log`, seeding the in-memory history from its tail.
    pub fn with_history_log(mut self, log: AppendLog, max_lines: usize) -> Self {
        let max = self.config().history_max;
        match log.tail::<RoastRecord>(max) {
            Ok(records) => {
                if let Ok(mut state) = self.state.lock() {
                    state.history = RoastHistory::from_records(records, max);
                }
            }
            Err(e) => warn!(
                event = "degradation_triggered",
                component = "roast_history",
                error = %e,
                fallback = "empty history",
                "roast history unreadable"
            ),
        }
        self.history_log = Some(log);
        self.log_max_lines = max_lines.max(1);
        self
    }

    pub fn config(&self) -> QualityConfig {
        self.config.read().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn reload(&self, config: QualityConfig) {
        if let Ok(mut state) = self.state.lock() {
            state.history.set_max(config.history_max);
            state.seen.set_max(config.seen_max);
            while state.recent.len() > config.history_max {
                state.recent.pop_front();
            }
        }
        if let Ok(mut c) = self.config.write() {
            *c = config;
        }
    }

    /// Score `text` without recording anything. Duplicates are not detected here.
    pub fn assess(&self, text: &str) -> QualityScore {
        let cfg = self.config();
        let state = self.state.lock().ok();
        let recent = state.as_ref().map(|s| &s.recent);
        self.assess_with(text, &cfg, recent).0
    }

    fn assess_with(
        &self,
        text: &str,
        cfg: &QualityConfig,
        recent: Option<&VecDeque<HashSet<String>>>,
    ) -> (QualityScore, Option<&'static str>) {
        let trimmed = text.trim();
        if trimmed.chars().count() < cfg.min_chars {
            return (floor_score(cfg), Some(TOO_SHORT));
        }
        if let Some(tag) = noise::detect(trimmed) {
            return (floor_score(cfg), Some(tag));
        }
        let tokens = text::token_set(trimmed);
        let dims = QualityDimensions {
            actionability: actionability::score(trimmed),
            novelty: novelty::score(
                &tokens,
                recent.into_iter().flatten(),
                cfg.novelty_similarity,
            ),
            reasoning: reasoning::score(trimmed),
            specificity: specificity::score(trimmed),
            outcome_linkage: outcome::score(trimmed),
            ethics: cfg.ethics_enabled.then(|| ethics::score(trimmed)),
        };
        let verdict = classify(dims.total(), cfg);
        (QualityScore::new(dims, verdict), None)
    }

    /// Roast one candidate learning and record the event.
    pub fn roast(&self, text: &str, ctx: &RoastContext) -> RoastOutcome {
        let cfg = self.config();
        let original = text.to_string();
        let trimmed = text.trim();
        let dedup_hash = text::dedup_hash(trimmed);

        let Ok(mut state) = self.state.lock() else {
            return RoastOutcome {
                original,
                text: trimmed.to_string(),
                refined: false,
                score: floor_score(&cfg),
                noise: None,
                dedup_hash,
            };
        };

        let outcome = if trimmed.chars().count() < cfg.min_chars {
            RoastOutcome {
                original,
                text: trimmed.to_string(),
                refined: false,
                score: floor_score(&cfg),
                noise: Some(TOO_SHORT.to_string()),
                dedup_hash,
            }
        } else if self.already_seen(&mut state, &dedup_hash) {
            RoastOutcome {
                original,
                text: trimmed.to_string(),
                refined: false,
                score: QualityScore::new(QualityDimensions::floor(cfg.ethics_enabled), Verdict::Duplicate),
                noise: None,
                dedup_hash,
            }
        } else {
            let mut new_hashes = vec![dedup_hash.clone()];
            let (mut score, noise) = self.assess_with(trimmed, &cfg, Some(&state.recent));
            let mut final_text = trimmed.to_string();
            let mut refined = false;

            if noise.is_none() && score.verdict == Verdict::NeedsWork && cfg.auto_refine {
                if let Some(candidate) = refine::refine(trimmed) {
                    let (rescored, rescored_noise) =
                        self.assess_with(&candidate, &cfg, Some(&state.recent));
                    let keep = keeps_refinement(&score, &rescored, rescored_noise);
                    debug!(
                        before = score.total,
                        after = rescored.total,
                        verdict = %rescored.verdict,
                        kept = keep,
                        "learning refined"
                    );
                    if keep {
                        if refine::changes_identity(trimmed, &candidate) {
                            new_hashes.push(text::dedup_hash(&candidate));
                        }
                        score = rescored;
                        final_text = candidate;
                        refined = true;
                    }
                }
            }

            self.remember(&mut state, new_hashes, cfg.seen_max);
            if noise.is_none() {
                state.recent.push_back(text::token_set(&final_text));
                while state.recent.len() > cfg.history_max {
                    state.recent.pop_front();
                }
            }
            RoastOutcome {
                original,
                text: final_text,
                refined,
                score,
                noise: noise.map(str::to_string),
                dedup_hash,
            }
        };

        let record = RoastRecord {
            timestamp: Utc::now(),
            verdict: outcome.verdict(),
            total: outcome.score.total,
            dedup_hash: outcome.dedup_hash.clone(),
            trace_id: ctx.trace_id.clone(),
            synthetic: ctx.is_synthetic(),
            noise: outcome.noise.clone(),
            refined: outcome.refined,
        };
        self.log_record(&mut state, &record);
        state.history.push(record);

        info!(
            event = "roast_verdict",
            verdict = %outcome.verdict(),
            total = outcome.score.total,
            noise = outcome.noise.as_deref().unwrap_or(""),
            refined = outcome.refined,
            "learning roasted"
        );
        outcome
    }

    /// Windowed quality rate over the roast history.
    pub fn quality_rate(&self) -> QualityRate {
        let cfg = self.config();
        self.state
            .lock()
            .map(|s| {
                s.history
                    .quality_rate(cfg.quality_rate_window, cfg.max_samples_per_trace)
            })
            .unwrap_or_default()
    }

    /// Newest-last copy of the in-memory history.
    pub fn history(&self) -> Vec<RoastRecord> {
        self.state
            .lock()
            .map(|s| s.history.records().cloned().collect())
            .unwrap_or_default()
    }

    fn already_seen(&self, state: &mut GateState, hash: &str) -> bool {
        if let Some(store) = &self.seen_store {
            match store.load() {
                Ok(loaded) => state.seen = SeenHashes::merge(&state.seen, &loaded.value),
                Err(e) => debug!(error = %e, "seen hashes unreadable, using local copy"),
            }
        }
        state.seen.contains(hash)
    }

    fn remember(&self, state: &mut GateState, hashes: Vec<String>, max_entries: usize) {
        let now = Utc::now();
        let mut fresh = SeenHashes::bounded(max_entries);
        for h in hashes {
            state.seen.insert(h.clone(), now);
            fresh.insert(h, now);
        }
        if let Some(store) = &self.seen_store {
            match store.merge_and_save(&fresh) {
                Ok(merged) => state.seen = SeenHashes::merge(&state.seen, &merged),
                Err(e) => warn!(
                    event = "degradation_triggered",
                    component = "quality_seen",
                    error = %e,
                    fallback = "in-memory dedup",
                    "seen hashes not persisted"
                ),
            }
        }
    }

    fn log_record(&self, state: &mut GateState, record: &RoastRecord) {
        let Some(log) = &self.history_log else {
            return;
        };
        match log.append(record) {
            Ok(true) => state.appends_since_compact += 1,
            Ok(false) => {}
            Err(e) => debug!(error = %e, "roast record not logged"),
        }
        if state.appends_since_compact >= self.log_max_lines {
            state.appends_since_compact = 0;
            if let Err(e) = log.compact(self.log_max_lines) {
                debug!(error = %e, "roast history not compacted");
            }
        }
    }
}

fn classify(total: u32, cfg: &QualityConfig) -> Verdict {
    if total >= cfg.quality_threshold {
        Verdict::Quality
    } else if total >= cfg.needs_work_threshold {
        Verdict::NeedsWork
    } else {
        Verdict::Primitive
    }
}

/// A refinement is kept only when it scores no lower and is not noise.
fn keeps_refinement(before: &QualityScore, after: &QualityScore, after_noise: Option<&str>) -> bool {
    after_noise.is_none() && after.total >= before.total
}

fn floor_score(cfg: &QualityConfig) -> QualityScore {
    QualityScore::new(QualityDimensions::floor(cfg.ethics_enabled), Verdict::Primitive)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> QualityGate {
        QualityGate::new(QualityConfig::default())
    }

    #[test]
    fn classify_uses_both_thresholds() {
        let cfg = QualityConfig::default();
        assert_eq!(classify(cfg.quality_threshold, &cfg), Verdict::Quality);
        assert_eq!(classify(cfg.needs_work_threshold, &cfg), Verdict::NeedsWork);
        assert_eq!(classify(0, &cfg), Verdict::Primitive);
    }

    #[test]
    fn refinement_must_not_lower_the_score_or_become_noise() {
        let score = |novelty| {
            let dims = QualityDimensions {
                novelty,
                actionability: 1,
                ..QualityDimensions::default()
            };
            QualityScore::new(dims, Verdict::NeedsWork)
        };
        assert!(keeps_refinement(&score(1), &score(1), None));
        assert!(keeps_refinement(&score(1), &score(2), None));
        assert!(!keeps_refinement(&score(2), &score(1), None));
        assert!(!keeps_refinement(&score(1), &score(2), Some("tool_telemetry")));
    }

    #[test]
    fn empty_text_is_primitive_not_an_error() {
        let out = gate().roast("", &RoastContext::default());
        assert_eq!(out.verdict(), Verdict::Primitive);
        assert_eq!(out.noise.as_deref(), Some(TOO_SHORT));
        assert_eq!(out.score.total, 0);
    }

    #[test]
    fn assess_does_not_record() {
        let g = gate();
        let text = "User prefers dark theme because it reduces eye strain";
        assert_eq!(g.assess(text).verdict, Verdict::Quality);
        assert_eq!(g.roast(text, &RoastContext::default()).verdict(), Verdict::Quality);
        assert!(g.history().len() == 1);
    }
}
