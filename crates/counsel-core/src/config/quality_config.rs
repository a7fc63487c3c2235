use serde::{Deserialize, Serialize};

use super::defaults;

/// Quality gate configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Total score at or above which a learning is `quality`.
    pub quality_threshold: u32,
    /// Total score at or above which a learning is `needs_work`.
    pub needs_work_threshold: u32,
    pub ethics_enabled: bool,
    pub auto_refine: bool,
    /// Roast events kept in memory.
    pub history_max: usize,
    /// Events considered by the quality-rate metric.
    pub quality_rate_window: usize,
    /// Samples a single trace may contribute to the quality rate.
    pub max_samples_per_trace: usize,
    /// Overlap with a previously seen learning above which novelty drops.
    pub novelty_similarity: f64,
    /// Texts shorter than this are unscoreable.
    pub min_chars: usize,
    /// Dedup hashes remembered; the oldest are forgotten first.
    pub seen_max: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            quality_threshold: defaults::DEFAULT_QUALITY_THRESHOLD,
            needs_work_threshold: defaults::DEFAULT_NEEDS_WORK_THRESHOLD,
            ethics_enabled: defaults::DEFAULT_ETHICS_ENABLED,
            auto_refine: defaults::DEFAULT_AUTO_REFINE,
            history_max: defaults::DEFAULT_ROAST_HISTORY_MAX,
            quality_rate_window: defaults::DEFAULT_QUALITY_RATE_WINDOW,
            max_samples_per_trace: defaults::DEFAULT_MAX_SAMPLES_PER_TRACE,
            novelty_similarity: defaults::DEFAULT_NOVELTY_SIMILARITY,
            min_chars: defaults::DEFAULT_MIN_LEARNING_CHARS,
            seen_max: defaults::DEFAULT_SEEN_HASHES_MAX,
        }
    }
}
