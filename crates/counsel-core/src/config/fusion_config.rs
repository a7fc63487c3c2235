use serde::{Deserialize, Serialize};

use super::defaults;

/// Blend weights for the lexical-semantic fusion scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub bm25_k1: f64,
    pub bm25_b: f64,
    /// Share of the lexical score taken from BM25; the rest is token overlap.
    pub bm25_weight: f64,
    /// Share of the fused score taken from the external similarity, when present.
    pub semantic_weight: f64,
    /// Batches larger than this are scored in parallel.
    pub parallel_threshold: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            bm25_k1: defaults::DEFAULT_BM25_K1,
            bm25_b: defaults::DEFAULT_BM25_B,
            bm25_weight: defaults::DEFAULT_BM25_WEIGHT,
            semantic_weight: defaults::DEFAULT_SEMANTIC_WEIGHT,
            parallel_threshold: defaults::DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}
