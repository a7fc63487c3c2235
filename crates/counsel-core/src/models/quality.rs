use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CounselError;

/// Outcome of the quality gate for one candidate learning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Quality,
    NeedsWork,
    Primitive,
    Duplicate,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::NeedsWork => "needs_work",
            Self::Primitive => "primitive",
            Self::Duplicate => "duplicate",
        }
    }

    /// Ordering used when comparing a refined rescore with the original.
    pub fn rank(self) -> u8 {
        match self {
            Self::Quality => 3,
            Self::NeedsWork => 2,
            Self::Primitive => 1,
            Self::Duplicate => 0,
        }
    }

    pub fn admits(self) -> bool {
        self == Self::Quality
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = CounselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "needs_work" | "needs-work" => Ok(Self::NeedsWork),
            "primitive" => Ok(Self::Primitive),
            "duplicate" => Ok(Self::Duplicate),
            _ => Err(CounselError::UnknownKind {
                kind: "verdict",
                value: s.to_string(),
            }),
        }
    }
}

/// Per-dimension sub-scores, each in 0..=2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QualityDimensions {
    pub actionability: u8,
    pub novelty: u8,
    pub reasoning: u8,
    pub specificity: u8,
    pub outcome_linkage: u8,
    /// `None` when the ethics dimension is disabled.
    pub ethics: Option<u8>,
}

impl QualityDimensions {
    pub fn total(&self) -> u32 {
        [
            self.actionability,
            self.novelty,
            self.reasoning,
            self.specificity,
            self.outcome_linkage,
            self.ethics.unwrap_or(0),
        ]
        .iter()
        .map(|&v| u32::from(v.min(2)))
        .sum()
    }

    /// Lowest possible scores, used for unscoreable input.
    pub fn floor(ethics_enabled: bool) -> Self {
        Self {
            ethics: ethics_enabled.then_some(0),
            ..Self::default()
        }
    }
}

/// Immutable quality assessment of one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityScore {
    pub dimensions: QualityDimensions,
    pub total: u32,
    pub verdict: Verdict,
}

impl QualityScore {
    pub fn new(dimensions: QualityDimensions, verdict: Verdict) -> Self {
        Self {
            total: dimensions.total(),
            dimensions,
            verdict,
        }
    }
}
