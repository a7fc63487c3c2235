//! Text utilities shared by scoring, dedup, and id derivation.

use std::collections::HashSet;

use crate::constants::DEDUP_HASH_HEX_LEN;

/// Words that carry no retrieval signal.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "can", "do", "for", "from", "has",
    "have", "i", "if", "in", "into", "is", "it", "its", "me", "my", "not", "of", "on", "or",
    "our", "so", "that", "the", "their", "then", "there", "these", "this", "to", "was", "we",
    "were", "what", "when", "which", "will", "with", "you", "your",
];

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.binary_search(&token).is_ok()
}

/// Lowercased alphanumeric tokens (underscores kept), stopwords and
/// single characters removed. Order and repeats are preserved.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() > 1)
        .map(str::to_lowercase)
        .filter(|t| !is_stopword(t))
        .collect()
}

pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// Jaccard index of two token sets; 0.0 when either is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}

/// Collapse runs of whitespace into one space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalization used for duplicate detection: lowercase, every number
/// collapsed to `#`, whitespace collapsed, trailing punctuation dropped.
pub fn dedup_normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut chars = lowered.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            while let Some(&next) = chars.peek() {
                let continues_number = next.is_ascii_digit()
                    || ((next == '.' || next == ',') && {
                        let mut ahead = chars.clone();
                        ahead.next();
                        ahead.peek().is_some_and(|d| d.is_ascii_digit())
                    });
                if !continues_number {
                    break;
                }
                chars.next();
            }
            out.push('#');
        } else {
            out.push(c);
        }
    }
    normalize_whitespace(&out)
        .trim_end_matches(['.', '!', '?', ';', ','])
        .to_string()
}

/// Stable hash of the dedup-normalized text.
pub fn dedup_hash(text: &str) -> String {
    let hex = blake3::hash(dedup_normalize(text).as_bytes()).to_hex();
    hex.as_str()[..DEDUP_HASH_HEX_LEN].to_string()
}

/// Share of non-whitespace characters that are code punctuation.
pub fn code_density(text: &str) -> f64 {
    let total = text.chars().filter(|c| !c.is_whitespace()).count();
    if total == 0 {
        return 0.0;
    }
    let symbols = text
        .chars()
        .filter(|c| matches!(c, '{' | '}' | '(' | ')' | ';' | '=' | '<' | '>' | '[' | ']'))
        .count();
    symbols as f64 / total as f64
}

/// Truncate on a character boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopword_table_is_sorted() {
        let mut sorted = STOPWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOPWORDS);
    }

    #[test]
    fn tokenize_drops_stopwords_and_short_tokens() {
        assert_eq!(
            tokenize("Fix the bug in a.py, then run_tests!"),
            vec!["fix", "bug", "py", "run_tests"]
        );
    }

    #[test]
    fn numbers_collapse_for_dedup() {
        assert_eq!(dedup_normalize("Saved 3 files"), dedup_normalize("saved 7 files"));
        assert_eq!(dedup_normalize("took 1,250.5 ms."), "took # ms");
        assert_eq!(dedup_normalize("v2  and   v10"), "v# and v#");
    }

    #[test]
    fn dedup_hash_matches_for_whitespace_variants() {
        assert_eq!(dedup_hash("  Use rg\tinstead of grep "), dedup_hash("use rg instead of grep"));
    }

    #[test]
    fn jaccard_of_empty_is_zero() {
        assert_eq!(jaccard(&HashSet::new(), &token_set("x y")), 0.0);
    }

    #[test]
    fn code_density_counts_punctuation() {
        assert_eq!(code_density("   "), 0.0);
        assert!(code_density("fn f() { g(); }") > 0.4);
        assert!(code_density("run the tests first") < 0.01);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
