/// Domains treated as untagged.
const NEUTRAL_DOMAINS: &[&str] = &["", "general", "any"];

/// Whether a candidate tagged `candidate` may be shown for a query in `query`.
///
/// Untagged candidates always pass; tagged ones pass only when the query is in
/// the same domain.
pub fn allows(candidate: Option<&str>, query: Option<&str>) -> bool {
    let Some(tag) = candidate.map(str::trim) else {
        return true;
    };
    if NEUTRAL_DOMAINS.iter().any(|d| d.eq_ignore_ascii_case(tag)) {
        return true;
    }
    query.is_some_and(|q| q.trim().eq_ignore_ascii_case(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_cases() {
        assert!(allows(None, Some("git")));
        assert!(allows(Some("general"), None));
        assert!(allows(Some("git"), Some("Git")));
        assert!(!allows(Some("frontend"), Some("git")));
        assert!(!allows(Some("frontend"), None));
    }
}
