use crate::errors::CounselResult;
use crate::models::{AdviceQuery, CandidateAdvice, RoutingDecision, SourceKind};

/// What one adapter contributed to a retrieval call.
#[derive(Debug, Clone, Default)]
pub struct AdapterOutput {
    pub candidates: Vec<CandidateAdvice>,
    /// Set by adapters that route through the retrieval router.
    pub routing: Option<RoutingDecision>,
}

impl AdapterOutput {
    pub fn from_candidates(candidates: Vec<CandidateAdvice>) -> Self {
        Self {
            candidates,
            routing: None,
        }
    }
}

/// A source of candidate advice.
pub trait ISourceAdapter: Send + Sync {
    fn kind(&self) -> SourceKind;

    fn gather(&self, query: &AdviceQuery) -> CounselResult<AdapterOutput>;
}
