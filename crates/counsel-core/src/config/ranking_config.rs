use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::SourceKind;

/// Ranking & fusion engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Maximum advice items returned per call.
    pub max_items: usize,
    /// Items with a composite score below this are dropped.
    pub min_rank_score: f64,
    /// Token-overlap similarity at which two items count as the same advice.
    pub dedup_similarity: f64,
    /// Drop candidates tagged with a domain other than the query's.
    pub cross_domain_guard: bool,
    /// Per-source quality multipliers. Missing sources use built-in values.
    pub source_quality: BTreeMap<SourceKind, f64>,
    /// Outcomes a tool needs before tool-caution advice is produced.
    pub tool_caution_min_samples: usize,
    /// Bad-outcome rate at which a tool is considered risky.
    pub tool_caution_bad_rate: f64,
    /// Followed count a source needs before its helpfulness leaves neutral.
    pub helpfulness_min_followed: u64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_items: defaults::DEFAULT_MAX_ITEMS,
            min_rank_score: defaults::DEFAULT_MIN_RANK_SCORE,
            dedup_similarity: defaults::DEFAULT_DEDUP_SIMILARITY,
            cross_domain_guard: true,
            source_quality: BTreeMap::new(),
            tool_caution_min_samples: defaults::DEFAULT_TOOL_CAUTION_MIN_SAMPLES,
            tool_caution_bad_rate: defaults::DEFAULT_TOOL_CAUTION_BAD_RATE,
            helpfulness_min_followed: defaults::DEFAULT_HELPFULNESS_MIN_FOLLOWED,
        }
    }
}

impl RankingConfig {
    /// Quality multiplier for a source, falling back to the built-in table.
    pub fn source_quality_multiplier(&self, source: SourceKind) -> f64 {
        if let Some(v) = self.source_quality.get(&source) {
            return *v;
        }
        match source {
            SourceKind::Corpus => 1.0,
            SourceKind::ToolCaution => 1.1,
            SourceKind::Surprise => 1.0,
            SourceKind::StructuralDistillation => 0.95,
            SourceKind::DomainChip => 0.9,
            SourceKind::Session => 0.85,
            SourceKind::SkillHint => 0.8,
        }
    }
}
