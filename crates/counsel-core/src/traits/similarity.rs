use serde::{Deserialize, Serialize};

use crate::errors::CounselResult;

/// One hit from an external similarity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityHit {
    pub key: String,
    pub text: String,
    /// Semantic similarity in [0.0, 1.0].
    pub semantic_sim: f64,
    /// Trigger-rule confidence in [0.0, 1.0]; acts as a floor on the fused score.
    #[serde(default)]
    pub trigger_conf: f64,
}

/// Optional similarity/embedding collaborator.
///
/// Implementations talking to the network must enforce their own hard timeout.
/// Callers treat any error as "no additional candidates".
pub trait ISimilarityProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Score `query` against the corpus, or only `subset` keys when given.
    fn similarity(
        &self,
        query: &str,
        subset: Option<&[String]>,
        limit: usize,
    ) -> CounselResult<Vec<SimilarityHit>>;
}
