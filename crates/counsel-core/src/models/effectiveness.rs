use serde::{Deserialize, Serialize};

/// Where an insight currently sits in the dual-gate promotion policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionTier {
    /// Not enough decisive outcomes yet; effectiveness is neutral.
    #[default]
    WarmUp,
    /// Weak rate governs; strict data is too thin.
    Weak,
    /// Strict gate active; weak/strict blend.
    Strict,
    /// Strict rate fell below the floor; hidden until the retest time.
    Suppressed,
    /// Cooldown expired; judged on outcomes since suppression only.
    Retest,
}

impl PromotionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WarmUp => "warm_up",
            Self::Weak => "weak",
            Self::Strict => "strict",
            Self::Suppressed => "suppressed",
            Self::Retest => "retest",
        }
    }
}

/// Demonstrated effectiveness of one insight, as seen by ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsightEffectiveness {
    /// [0.0, 1.0]; 0.5 is neutral.
    pub score: f64,
    pub suppressed: bool,
    pub tier: PromotionTier,
}

impl InsightEffectiveness {
    pub const NEUTRAL: InsightEffectiveness = InsightEffectiveness {
        score: 0.5,
        suppressed: false,
        tier: PromotionTier::WarmUp,
    };
}

impl Default for InsightEffectiveness {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Decisive outcome counts for one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolOutcomeStats {
    pub good: u64,
    pub bad: u64,
}

impl ToolOutcomeStats {
    pub fn total(&self) -> u64 {
        self.good + self.bad
    }

    pub fn bad_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.bad as f64 / self.total() as f64
        }
    }
}
