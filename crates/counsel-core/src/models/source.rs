use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CounselError;

/// Where a candidate advice came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// The insight corpus, reached through the retrieval router.
    Corpus,
    /// Notes captured during the current working session.
    Session,
    /// Cautions derived from a tool's failure history.
    ToolCaution,
    /// Domain observers ("chips") watching one subject area.
    DomainChip,
    /// Structural distillations of repeated episodes.
    StructuralDistillation,
    /// Cautions recorded after an outcome surprised the agent.
    Surprise,
    /// Hints attached to installed skills.
    SkillHint,
}

impl SourceKind {
    pub const ALL: [SourceKind; 7] = [
        SourceKind::Corpus,
        SourceKind::Session,
        SourceKind::ToolCaution,
        SourceKind::DomainChip,
        SourceKind::StructuralDistillation,
        SourceKind::Surprise,
        SourceKind::SkillHint,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Corpus => "corpus",
            Self::Session => "session",
            Self::ToolCaution => "tool_caution",
            Self::DomainChip => "domain_chip",
            Self::StructuralDistillation => "structural_distillation",
            Self::Surprise => "surprise",
            Self::SkillHint => "skill_hint",
        }
    }

    /// Sources backed by a note file rather than the corpus or the ledger.
    pub fn is_note_source(self) -> bool {
        !matches!(self, Self::Corpus | Self::ToolCaution)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = CounselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| CounselError::UnknownKind {
                kind: "source",
                value: s.to_string(),
            })
    }
}
