use std::collections::HashSet;

use counsel_core::text;

/// Jaccard overlap between a query token set and a document's tokens.
pub fn token_overlap(query: &HashSet<String>, doc_tokens: &[String]) -> f64 {
    let doc: HashSet<String> = doc_tokens.iter().cloned().collect();
    text::jaccard(query, &doc)
}
