use std::collections::HashSet;

use rayon::prelude::*;

use counsel_core::config::FusionConfig;
use counsel_core::text;

use super::{bm25, overlap};

/// One document handed to the scorer.
#[derive(Debug, Clone, Copy)]
pub struct FusionDoc<'a> {
    pub text: &'a str,
    /// Externally supplied semantic similarity, when a provider answered.
    pub semantic: Option<f64>,
    /// Trigger-rule confidence; a floor on the fused score.
    pub trigger_conf: f64,
}

impl<'a> FusionDoc<'a> {
    pub fn lexical(text: &'a str) -> Self {
        Self {
            text,
            semantic: None,
            trigger_conf: 0.0,
        }
    }
}

/// Per-document breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionScore {
    pub bm25: f64,
    pub overlap: f64,
    pub lexical: f64,
    pub fused: f64,
}

impl FusionScore {
    pub const ZERO: FusionScore = FusionScore {
        bm25: 0.0,
        overlap: 0.0,
        lexical: 0.0,
        fused: 0.0,
    };
}

/// Blends batch-normalized BM25, token overlap, and an optional semantic score.
#[derive(Debug, Clone)]
pub struct FusionScorer {
    config: FusionConfig,
}

impl FusionScorer {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn reload(&mut self, config: FusionConfig) {
        self.config = config;
    }

    /// Score one query against one document in [0.0, 1.0].
    pub fn score(&self, query: &str, document: &str) -> f64 {
        self.score_batch(query, &[FusionDoc::lexical(document)])
            .first()
            .map_or(0.0, |s| s.fused)
    }

    /// Score a batch. BM25 is normalized against the best document in this batch.
    pub fn score_batch(&self, query: &str, docs: &[FusionDoc<'_>]) -> Vec<FusionScore> {
        let query_terms = text::tokenize(query);
        let query_set: HashSet<String> = query_terms.iter().cloned().collect();

        let tokenized: Vec<Vec<String>> = if docs.len() > self.config.parallel_threshold {
            docs.par_iter().map(|d| text::tokenize(d.text)).collect()
        } else {
            docs.iter().map(|d| text::tokenize(d.text)).collect()
        };

        let mut bm25_scores =
            bm25::raw_scores(&query_terms, &tokenized, self.config.bm25_k1, self.config.bm25_b);
        bm25::normalize(&mut bm25_scores);

        docs.iter()
            .zip(tokenized.iter())
            .zip(bm25_scores)
            .map(|((doc, tokens), bm25)| {
                if query_terms.is_empty() || doc.text.trim().is_empty() {
                    return FusionScore::ZERO;
                }
                let overlap = overlap::token_overlap(&query_set, tokens);
                let w = self.config.bm25_weight;
                let lexical = w * bm25 + (1.0 - w) * overlap;
                let blended = match doc.semantic {
                    Some(sem) => {
                        let sw = self.config.semantic_weight;
                        sw * clamp_unit(sem) + (1.0 - sw) * lexical
                    }
                    None => lexical,
                };
                FusionScore {
                    bm25,
                    overlap,
                    lexical,
                    fused: clamp_unit(blended.max(doc.trigger_conf)),
                }
            })
            .collect()
    }
}

impl Default for FusionScorer {
    fn default() -> Self {
        Self::new(FusionConfig::default())
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_or_document_scores_zero() {
        let s = FusionScorer::default();
        assert_eq!(s.score("", "run tests"), 0.0);
        assert_eq!(s.score("run tests", ""), 0.0);
        assert_eq!(s.score("the a of", "the a of"), 0.0);
    }

    #[test]
    fn semantic_score_blends_in() {
        let s = FusionScorer::default();
        let docs = [
            FusionDoc { text: "migrate the schema first", semantic: Some(0.9), trigger_conf: 0.0 },
            FusionDoc { text: "migrate the schema first", semantic: None, trigger_conf: 0.0 },
        ];
        let out = s.score_batch("schema migration order", &docs);
        assert!(out[0].fused > 0.0);
        assert_eq!(out[0].lexical, out[1].lexical);
        assert!((out[0].fused - (0.6 * 0.9 + 0.4 * out[0].lexical)).abs() < 1e-9);
    }

    #[test]
    fn trigger_confidence_is_a_floor() {
        let s = FusionScorer::default();
        let docs = [FusionDoc { text: "totally unrelated", semantic: None, trigger_conf: 0.7 }];
        assert_eq!(s.score_batch("cargo build", &docs)[0].fused, 0.7);
    }
}
