//! # counsel-attribution
//!
//! Did the advice help? One record per learning id tracks the active
//! retrieval → outcome attempt. Outcomes are attributed weakly always and
//! strictly only when the trace matches and the latency fits the window.
//!
//! Per insight, a dual-gate promotion state turns outcomes into
//! effectiveness (warm-up → weak → strict, with a time-boxed suppression and
//! retest below the strict floor). Per source, grow-only counters track
//! given/followed/helpful with per-advice idempotency.

pub mod counters;
pub mod ledger;
pub mod promotion;
pub mod record;
pub mod reports;

pub use counters::{EffectivenessCounters, SourceCounters};
pub use ledger::{
    AdviceGivenRecord, AttributionLedger, LedgerFile, OutcomeAttribution, OutcomeEvent,
    RepairReport, RetrievalEvent,
};
pub use promotion::PromotionState;
pub use record::OutcomeRecord;
pub use reports::{EffectivenessReport, SourceAttribution, SourceAttributionReport};
