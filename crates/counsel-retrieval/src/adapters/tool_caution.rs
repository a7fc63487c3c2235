use std::sync::{Arc, RwLock};

use counsel_core::config::RankingConfig;
use counsel_core::errors::CounselResult;
use counsel_core::models::{AdviceQuery, CandidateAdvice, SourceKind, ToolOutcomeStats};
use counsel_core::traits::{AdapterOutput, IEffectivenessOracle, ISourceAdapter};

/// Turns a tool's recent failure history into caution advice.
pub struct ToolCautionAdapter {
    oracle: Arc<dyn IEffectivenessOracle>,
    config: RwLock<RankingConfig>,
}

impl ToolCautionAdapter {
    pub fn new(oracle: Arc<dyn IEffectivenessOracle>, config: RankingConfig) -> Self {
        Self {
            oracle,
            config: RwLock::new(config),
        }
    }

    pub fn reload(&self, config: RankingConfig) {
        if let Ok(mut c) = self.config.write() {
            *c = config;
        }
    }

    /// Caution text and rate for `tool`, when its history warrants one.
    pub fn caution_for(&self, tool: &str) -> Option<(String, ToolOutcomeStats)> {
        let (min_samples, bad_rate) = self
            .config
            .read()
            .map(|c| (c.tool_caution_min_samples, c.tool_caution_bad_rate))
            .ok()?;
        let stats = self.oracle.tool_outcomes(tool);
        if (stats.total() as usize) < min_samples || stats.bad_rate() < bad_rate {
            return None;
        }
        let text = format!(
            "{tool} failed {} of its last {} attempts; check inputs and preconditions before running it again.",
            stats.bad,
            stats.total()
        );
        Some((text, stats))
    }
}

impl ISourceAdapter for ToolCautionAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::ToolCaution
    }

    fn gather(&self, query: &AdviceQuery) -> CounselResult<AdapterOutput> {
        let Some((text, stats)) = self.caution_for(&query.tool) else {
            return Ok(AdapterOutput::default());
        };
        let candidate = CandidateAdvice::new(
            SourceKind::ToolCaution,
            Some(format!("tool:{}", query.tool.to_lowercase())),
            text,
            stats.bad_rate(),
            1.0,
        )
        .with_rationale(format!(
            "bad-outcome rate {:.0}% over {} outcomes",
            stats.bad_rate() * 100.0,
            stats.total()
        ));
        Ok(AdapterOutput::from_candidates(vec![candidate]))
    }
}
