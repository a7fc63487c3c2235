use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CounselError;

/// How the retrieval router treats escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    /// One similarity pass, never escalates.
    EmbeddingsOnly,
    /// Escalates when the primary pass looks weak or the query is hard.
    #[default]
    Auto,
    /// Always escalates, bounded by the facet limit.
    HybridAgentic,
}

impl RetrievalMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmbeddingsOnly => "embeddings_only",
            Self::Auto => "auto",
            Self::HybridAgentic => "hybrid_agentic",
        }
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrievalMode {
    type Err = CounselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "embeddings_only" => Ok(Self::EmbeddingsOnly),
            "auto" => Ok(Self::Auto),
            "hybrid_agentic" => Ok(Self::HybridAgentic),
            _ => Err(CounselError::UnknownKind {
                kind: "retrieval mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Why the router wanted to escalate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationReason {
    LowResultCount,
    LowTopScore,
    ComplexQuery,
    HighRisk,
    ForcedByMode,
}

impl EscalationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowResultCount => "low_result_count",
            Self::LowTopScore => "low_top_score",
            Self::ComplexQuery => "complex_query",
            Self::HighRisk => "high_risk",
            Self::ForcedByMode => "forced_by_mode",
        }
    }
}

/// Why a wanted escalation did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionReason {
    /// Mode forbids escalation.
    EmbeddingsOnly,
    /// Primary pass blew the fast-path budget on a non-risky query.
    OverBudget,
    /// Rolling escalation rate cap vetoed it.
    RateCap,
    /// No facet queries could be derived.
    NoFacets,
}

impl SuppressionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmbeddingsOnly => "embeddings_only",
            Self::OverBudget => "over_budget",
            Self::RateCap => "rate_cap",
            Self::NoFacets => "no_facets",
        }
    }
}

/// Record of one routing decision, logged for offline tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub timestamp: DateTime<Utc>,
    pub query_preview: String,
    pub mode: RetrievalMode,
    pub escalated: bool,
    pub reasons: Vec<EscalationReason>,
    pub suppressed_by: Option<SuppressionReason>,
    pub high_risk: bool,
    pub complexity: u32,
    pub corpus_size: usize,
    pub prefiltered_to: Option<usize>,
    pub semantic_available: bool,
    pub facets_planned: usize,
    pub facets_run: usize,
    pub timed_out: bool,
    pub primary_ms: u64,
    pub total_ms: u64,
    pub result_count: usize,
    pub top_score: f64,
}
