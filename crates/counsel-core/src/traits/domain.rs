use crate::text;

/// Maps free text to a coarse domain label.
pub trait IDomainClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Option<String>;
}

/// Keyword-vote classifier used when no external classifier is wired in.
#[derive(Debug, Clone)]
pub struct KeywordDomainClassifier {
    rules: Vec<(String, Vec<String>)>,
}

const DEFAULT_RULES: &[(&str, &[&str])] = &[
    ("testing", &["test", "tests", "pytest", "assert", "fixture", "coverage", "flaky"]),
    ("git", &["git", "commit", "branch", "rebase", "merge", "stash", "cherry"]),
    ("database", &["sql", "sqlite", "postgres", "migration", "schema", "index", "transaction"]),
    ("frontend", &["css", "react", "component", "ui", "theme", "layout", "html"]),
    ("deployment", &["docker", "deploy", "kubernetes", "k8s", "pipeline", "ci", "release"]),
    ("security", &["auth", "token", "secret", "password", "credential", "permission"]),
];

impl Default for KeywordDomainClassifier {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES
                .iter()
                .map(|(domain, words)| {
                    (
                        domain.to_string(),
                        words.iter().map(|w| w.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl KeywordDomainClassifier {
    pub fn new(rules: Vec<(String, Vec<String>)>) -> Self {
        Self { rules }
    }
}

impl IDomainClassifier for KeywordDomainClassifier {
    /// Domain with the most keyword hits; ties go to the earlier rule.
    fn classify(&self, input: &str) -> Option<String> {
        let tokens = text::token_set(input);
        if tokens.is_empty() {
            return None;
        }
        let mut best: Option<(&str, usize)> = None;
        for (domain, words) in &self.rules {
            let hits = words.iter().filter(|w| tokens.contains(w.as_str())).count();
            if hits > 0 && best.map_or(true, |(_, b)| hits > b) {
                best = Some((domain, hits));
            }
        }
        best.map(|(d, _)| d.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_domain_with_most_hits() {
        let c = KeywordDomainClassifier::default();
        assert_eq!(
            c.classify("rebase the branch before merge").as_deref(),
            Some("git")
        );
        assert_eq!(c.classify("flaky pytest fixture").as_deref(), Some("testing"));
    }

    #[test]
    fn no_hits_means_no_domain() {
        let c = KeywordDomainClassifier::default();
        assert_eq!(c.classify("hello world"), None);
        assert_eq!(c.classify(""), None);
    }
}
