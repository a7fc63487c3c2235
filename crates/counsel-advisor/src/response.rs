use serde::{Deserialize, Serialize};

use counsel_core::models::{CandidateAdvice, RoutingDecision};
use counsel_quality::RoastOutcome;

/// What `advise` hands back to the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdviceResponse {
    pub advice: Vec<CandidateAdvice>,
    pub cache_hit: bool,
    pub routing: Option<RoutingDecision>,
    /// Retrievals and advice-given records reached the ledger.
    pub attribution_logged: bool,
    pub degraded_sources: Vec<String>,
}

impl AdviceResponse {
    pub fn top_text(&self) -> Option<&str> {
        self.advice.first().map(|a| a.text.as_str())
    }
}

/// Result of `learn`: the roast, and the corpus key when the learning was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnOutcome {
    pub roast: RoastOutcome,
    pub stored_key: Option<String>,
}
