use std::collections::HashSet;

use counsel_core::text;

/// Minimum content tokens for full novelty credit.
const NOVEL_MIN_TOKENS: usize = 4;

/// Novelty against recently roasted learnings.
///
/// 0 when a recent learning overlaps at `similarity` or more, 1 for partial
/// overlap or very short content, otherwise 2.
pub fn score<'a>(
    tokens: &HashSet<String>,
    recent: impl IntoIterator<Item = &'a HashSet<String>>,
    similarity: f64,
) -> u8 {
    if tokens.is_empty() {
        return 0;
    }
    let closest = recent
        .into_iter()
        .map(|r| text::jaccard(tokens, r))
        .fold(0.0_f64, f64::max);
    if closest >= similarity {
        0
    } else if closest >= similarity / 2.0 || tokens.len() < NOVEL_MIN_TOKENS {
        1
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_lowers_novelty() {
        let a = text::token_set("prefer ripgrep over grep for large repositories");
        let b = text::token_set("prefer ripgrep over grep for big repositories");
        let c = text::token_set("pin the rust toolchain version in ci");
        assert_eq!(score(&a, [], 0.6), 2);
        assert_eq!(score(&a, [&b], 0.6), 0);
        assert_eq!(score(&a, [&c], 0.6), 2);
        assert_eq!(score(&text::token_set("use rg"), [], 0.6), 1);
    }
}
