//! Near-duplicate removal over ranked advice.

use std::collections::HashSet;

use counsel_core::models::CandidateAdvice;
use counsel_core::text;

/// Drop candidates whose text repeats an earlier (higher-ranked) one.
///
/// Two texts are the same advice when their normalized forms are equal or their
/// token overlap reaches `similarity`. Input must already be sorted best-first.
pub fn dedupe(candidates: Vec<CandidateAdvice>, similarity: f64) -> Vec<CandidateAdvice> {
    let mut seen_ids = HashSet::new();
    let mut seen_norm = HashSet::new();
    let mut kept_tokens: Vec<HashSet<String>> = Vec::new();
    let mut kept = Vec::with_capacity(candidates.len());

    for c in candidates {
        if !seen_ids.insert(c.advice_id.clone()) {
            continue;
        }
        let norm = text::dedup_normalize(&c.text);
        if !seen_norm.insert(norm) {
            continue;
        }
        let tokens = text::token_set(&c.text);
        if !tokens.is_empty()
            && kept_tokens
                .iter()
                .any(|k| text::jaccard(k, &tokens) >= similarity)
        {
            continue;
        }
        kept_tokens.push(tokens);
        kept.push(c);
    }
    kept
}
