use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::RetrievalMode;

/// Retrieval router policy: escalation thresholds, budgets, and rate caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub mode: RetrievalMode,
    /// Candidates kept from each retrieval pass.
    pub primary_limit: usize,
    /// Escalate when the primary pass returns fewer results than this.
    pub min_results: usize,
    /// Escalate when the best primary score is below this.
    pub min_top_score: f64,
    /// Complexity points at which a query counts as complex.
    pub complexity_threshold: u32,
    /// Token count that earns one complexity point.
    pub complex_query_tokens: usize,
    /// Fast-path budget for the primary pass (ms).
    pub fast_path_budget_ms: u64,
    /// Wall-clock deadline for the whole escalation phase (ms).
    pub deadline_ms: u64,
    /// Maximum facet queries per escalation.
    pub max_facets: usize,
    /// Salient terms per facet query.
    pub facet_terms: usize,
    /// Maximum fraction of escalated calls over the rolling window.
    pub rate_cap: f64,
    /// Number of calls in the rolling window.
    pub rate_window: usize,
    /// Corpus size above which the cheap pre-filter runs.
    pub prefilter_threshold: usize,
    /// Candidates kept by the pre-filter.
    pub prefilter_max: usize,
    /// Hits scoring below this are dropped.
    pub min_fused_score: f64,
    /// Hard timeout handed to network similarity providers (ms).
    pub similarity_timeout_ms: u64,
    /// Base URL of an HTTP similarity service. Lexical only when unset.
    pub similarity_url: Option<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            mode: RetrievalMode::Auto,
            primary_limit: defaults::DEFAULT_PRIMARY_LIMIT,
            min_results: defaults::DEFAULT_MIN_RESULTS,
            min_top_score: defaults::DEFAULT_MIN_TOP_SCORE,
            complexity_threshold: defaults::DEFAULT_COMPLEXITY_THRESHOLD,
            complex_query_tokens: defaults::DEFAULT_COMPLEX_QUERY_TOKENS,
            fast_path_budget_ms: defaults::DEFAULT_FAST_PATH_BUDGET_MS,
            deadline_ms: defaults::DEFAULT_ESCALATION_DEADLINE_MS,
            max_facets: defaults::DEFAULT_MAX_FACETS,
            facet_terms: defaults::DEFAULT_FACET_TERMS,
            rate_cap: defaults::DEFAULT_RATE_CAP,
            rate_window: defaults::DEFAULT_RATE_WINDOW,
            prefilter_threshold: defaults::DEFAULT_PREFILTER_THRESHOLD,
            prefilter_max: defaults::DEFAULT_PREFILTER_MAX,
            min_fused_score: defaults::DEFAULT_MIN_FUSED_SCORE,
            similarity_timeout_ms: defaults::DEFAULT_SIMILARITY_TIMEOUT_MS,
            similarity_url: None,
        }
    }
}
