use std::collections::HashSet;

use counsel_core::text;

/// Derive up to `max_facets` short queries from the salient terms of `query`.
///
/// Salient terms are the distinct non-numeric tokens, longest first; each facet
/// groups `terms_per_facet` of them.
pub fn plan(query: &str, max_facets: usize, terms_per_facet: usize) -> Vec<String> {
    if max_facets == 0 || terms_per_facet == 0 {
        return Vec::new();
    }
    let mut seen = HashSet::new();
    let mut terms: Vec<String> = text::tokenize(query)
        .into_iter()
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .filter(|t| seen.insert(t.clone()))
        .collect();
    terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    terms.truncate(max_facets * terms_per_facet);

    terms
        .chunks(terms_per_facet)
        .map(|chunk| chunk.join(" "))
        .collect()
}
