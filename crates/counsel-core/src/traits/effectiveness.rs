use crate::models::{InsightEffectiveness, SourceKind, ToolOutcomeStats};

/// Read-only view of attribution state used while ranking.
pub trait IEffectivenessOracle: Send + Sync {
    fn insight_effectiveness(&self, insight_key: &str) -> InsightEffectiveness;

    /// Historical helpfulness of a source in [0.0, 1.0]; 0.5 when unknown.
    fn source_helpfulness(&self, source: SourceKind) -> f64;

    fn tool_outcomes(&self, tool: &str) -> ToolOutcomeStats;
}

/// Oracle with no history: everything neutral.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralOracle;

impl IEffectivenessOracle for NeutralOracle {
    fn insight_effectiveness(&self, _insight_key: &str) -> InsightEffectiveness {
        InsightEffectiveness::NEUTRAL
    }

    fn source_helpfulness(&self, _source: SourceKind) -> f64 {
        0.5
    }

    fn tool_outcomes(&self, _tool: &str) -> ToolOutcomeStats {
        ToolOutcomeStats::default()
    }
}
