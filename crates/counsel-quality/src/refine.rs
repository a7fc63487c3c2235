//! Structural cleanup only. Never adds content.

use counsel_core::text;

/// Collapse whitespace and drop a duplicated leading phrase ("Tip: Tip: ...").
///
/// Returns `None` when nothing changed.
pub fn refine(original: &str) -> Option<String> {
    let mut words: Vec<&str> = original.split_whitespace().collect();
    while let Some(k) = repeated_prefix_len(&words) {
        words.drain(..k);
    }
    let refined = words.join(" ");
    (refined != original && !refined.is_empty()).then_some(refined)
}

/// Length of the longest leading word run that is immediately repeated.
fn repeated_prefix_len(words: &[&str]) -> Option<usize> {
    (1..=words.len() / 2).rev().find(|&k| {
        words[..k]
            .iter()
            .zip(&words[k..2 * k])
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    })
}

/// Whether refinement would change the dedup identity of `text`.
pub fn changes_identity(original: &str, refined: &str) -> bool {
    text::dedup_hash(original) != text::dedup_hash(refined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_repeated_lead_and_spacing() {
        assert_eq!(
            refine("Tip: tip:  run   the linter before committing").as_deref(),
            Some("tip: run the linter before committing")
        );
        assert_eq!(
            refine("use rg use rg for searching").as_deref(),
            Some("use rg for searching")
        );
    }

    #[test]
    fn clean_text_is_a_no_op() {
        assert_eq!(refine("Run the linter before committing"), None);
        assert_eq!(refine("   "), None);
    }

    #[test]
    fn whitespace_only_edits_keep_identity() {
        let refined = refine("run  the   linter").unwrap_or_default();
        assert!(!changes_identity("run  the   linter", &refined));
    }
}
