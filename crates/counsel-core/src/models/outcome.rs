use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CounselError;

/// Outcome reported for an action that followed a retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Good,
    Bad,
    Neutral,
    #[default]
    Unset,
}

impl OutcomeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "bad",
            Self::Neutral => "neutral",
            Self::Unset => "unset",
        }
    }

    /// Good and bad outcomes count toward effectiveness rates.
    pub fn is_decisive(self) -> bool {
        matches!(self, Self::Good | Self::Bad)
    }

    pub fn from_success(success: bool) -> Self {
        if success {
            Self::Good
        } else {
            Self::Bad
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutcomeKind {
    type Err = CounselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(Self::Good),
            "bad" => Ok(Self::Bad),
            "neutral" => Ok(Self::Neutral),
            "unset" => Ok(Self::Unset),
            _ => Err(CounselError::UnknownKind {
                kind: "outcome",
                value: s.to_string(),
            }),
        }
    }
}
