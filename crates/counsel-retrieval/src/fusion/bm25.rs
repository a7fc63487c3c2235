//! BM25 over a single candidate batch.
//!
//! Document frequencies and average length come from the batch itself, so no
//! global IDF table is needed. Scores are divided by the batch maximum: the best
//! candidate in any batch scores 1.0.

use std::collections::HashMap;

/// Raw BM25 scores for every document against `query_terms`.
pub fn raw_scores(query_terms: &[String], docs: &[Vec<String>], k1: f64, b: f64) -> Vec<f64> {
    if query_terms.is_empty() || docs.is_empty() {
        return vec![0.0; docs.len()];
    }
    let n = docs.len() as f64;
    let total_len: usize = docs.iter().map(Vec::len).sum();
    let avgdl = (total_len as f64 / n).max(1.0);

    let mut df: HashMap<&str, usize> = HashMap::new();
    for term in query_terms {
        if df.contains_key(term.as_str()) {
            continue;
        }
        let count = docs.iter().filter(|d| d.iter().any(|t| t == term)).count();
        df.insert(term.as_str(), count);
    }

    docs.iter()
        .map(|doc| {
            let dl = doc.len() as f64;
            let mut tf: HashMap<&str, usize> = HashMap::new();
            for t in doc {
                *tf.entry(t.as_str()).or_insert(0) += 1;
            }
            df.iter()
                .map(|(term, &d)| {
                    let f = *tf.get(term).unwrap_or(&0) as f64;
                    if f == 0.0 {
                        return 0.0;
                    }
                    let d = d as f64;
                    let idf = (1.0 + (n - d + 0.5) / (d + 0.5)).ln();
                    idf * f * (k1 + 1.0) / (f + k1 * (1.0 - b + b * dl / avgdl))
                })
                .sum()
        })
        .collect()
}

/// Divide by the batch maximum. An all-zero batch stays all zero.
pub fn normalize(scores: &mut [f64]) {
    let max = scores.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return;
    }
    for s in scores.iter_mut() {
        *s /= max;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn best_match_normalizes_to_one() {
        let q = toks("cargo test");
        let docs = vec![toks("run cargo test often"), toks("cargo build"), toks("unrelated")];
        let mut s = raw_scores(&q, &docs, 1.2, 0.75);
        normalize(&mut s);
        assert_eq!(s[0], 1.0);
        assert!(s[1] > 0.0 && s[1] < 1.0);
        assert_eq!(s[2], 0.0);
    }

    #[test]
    fn empty_inputs_score_zero() {
        assert_eq!(raw_scores(&[], &[toks("a b")], 1.2, 0.75), vec![0.0]);
        assert!(raw_scores(&toks("a"), &[], 1.2, 0.75).is_empty());
        assert_eq!(raw_scores(&toks("a"), &[vec![]], 1.2, 0.75), vec![0.0]);
    }
}
