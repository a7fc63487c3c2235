use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RouterConfig;
use crate::errors::ConfigError;
use crate::models::RetrievalMode;

/// Named retrieval profile. Seeds router budgets before file and env layers apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalProfile {
    /// Embeddings-only, tight budgets.
    Fast,
    #[default]
    Balanced,
    /// Always escalates; wide budgets, more facets, higher escalation cap.
    Deep,
}

impl RetrievalProfile {
    pub const ALL: [RetrievalProfile; 3] = [Self::Fast, Self::Balanced, Self::Deep];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Deep => "deep",
        }
    }

    /// Overwrite the router fields this profile controls.
    pub fn apply(&self, router: &mut RouterConfig) {
        match self {
            Self::Fast => {
                router.mode = RetrievalMode::EmbeddingsOnly;
                router.primary_limit = 5;
                router.fast_path_budget_ms = 120;
                router.deadline_ms = 400;
                router.max_facets = 1;
                router.rate_cap = 0.15;
            }
            Self::Balanced => {
                let defaults = RouterConfig::default();
                router.mode = defaults.mode;
                router.primary_limit = defaults.primary_limit;
                router.fast_path_budget_ms = defaults.fast_path_budget_ms;
                router.deadline_ms = defaults.deadline_ms;
                router.max_facets = defaults.max_facets;
                router.rate_cap = defaults.rate_cap;
            }
            Self::Deep => {
                router.mode = RetrievalMode::HybridAgentic;
                router.primary_limit = 12;
                router.fast_path_budget_ms = 500;
                router.deadline_ms = 2_500;
                router.max_facets = 5;
                router.rate_cap = 0.6;
            }
        }
    }
}

impl fmt::Display for RetrievalProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrievalProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "deep" => Ok(Self::Deep),
            other => Err(ConfigError::UnknownProfile {
                name: other.to_string(),
            }),
        }
    }
}
