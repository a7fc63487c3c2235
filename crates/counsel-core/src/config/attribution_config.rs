use serde::{Deserialize, Serialize};

use super::defaults;

/// Outcome attribution ledger configuration.
///
/// The dual-gate numbers are tuning knobs; the policy shape
/// (warm-up, strict floor, time-boxed retest) is fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributionConfig {
    /// Maximum retrieval-to-outcome latency for strict attribution (s).
    pub strict_window_secs: u64,
    /// Decisive outcomes needed before an insight leaves neutral (0.5).
    pub weak_min_samples: u64,
    /// Strict outcomes needed before the strict gate applies.
    pub strict_min_samples: u64,
    /// Strict rate below which an insight is suppressed.
    pub strict_floor: f64,
    /// Suppression length before an automatic retest (s).
    pub retest_cooldown_secs: u64,
    /// Weight of the strict rate in the final weak/strict blend.
    pub strict_weight: f64,
    /// Effectiveness reported while suppressed.
    pub suppressed_effectiveness: f64,
    /// Ledger records kept before eviction.
    pub max_records: usize,
    /// How far back `report_outcome` looks for open retrievals (s).
    pub outcome_lookback_secs: u64,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            strict_window_secs: defaults::DEFAULT_STRICT_WINDOW_SECS,
            weak_min_samples: defaults::DEFAULT_WEAK_MIN_SAMPLES,
            strict_min_samples: defaults::DEFAULT_STRICT_MIN_SAMPLES,
            strict_floor: defaults::DEFAULT_STRICT_FLOOR,
            retest_cooldown_secs: defaults::DEFAULT_RETEST_COOLDOWN_SECS,
            strict_weight: defaults::DEFAULT_STRICT_WEIGHT,
            suppressed_effectiveness: defaults::DEFAULT_SUPPRESSED_EFFECTIVENESS,
            max_records: defaults::DEFAULT_MAX_LEDGER_RECORDS,
            outcome_lookback_secs: defaults::DEFAULT_OUTCOME_LOOKBACK_SECS,
        }
    }
}
