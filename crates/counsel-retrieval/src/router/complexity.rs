//! Query complexity and risk heuristics, table-driven.

use counsel_core::rule_pattern;
use counsel_core::rules::{self, Rule};
use counsel_core::text;

rule_pattern!(
    RE_COMPARISON,
    r"(?i)\b(compare|comparison|versus|vs\.?|difference between|trade-?offs?|better than|pros and cons)\b"
);
rule_pattern!(
    RE_MULTI_HOP,
    r"(?i)\b(and then|after (?:that|which)|depends on|root cause|why (?:did|does|is|was)|how come|in order to|which (?:caused|causes))\b"
);
rule_pattern!(RE_QUESTION_CHAIN, r"\?[^?]+\?");
rule_pattern!(
    RE_HIGH_RISK,
    r"(?i)(rm\s+-rf|drop\s+(?:table|database)|force[- ]push|push\s+(?:-f|--force)|reset\s+--hard|\btruncate\b|\bdelete\b|\bproduction\b|\bprod\b|\bmigrat\w*|\bsecrets?\b|\bcredentials?\b|\bpasswords?\b|\bsudo\b|chmod\s+777)"
);

static COMPLEXITY_RULES: [Rule; 4] = [
    Rule::pattern("comparison", &RE_COMPARISON, 1),
    Rule::pattern("multi_hop", &RE_MULTI_HOP, 1),
    Rule::pattern("question_chain", &RE_QUESTION_CHAIN, 1),
    Rule::pattern("high_risk", &RE_HIGH_RISK, 1),
];

static RISK_RULES: [Rule; 1] = [Rule::pattern("high_risk", &RE_HIGH_RISK, 1)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexityAssessment {
    pub score: u32,
    /// Risk terms were found in the query text.
    pub risky_terms: bool,
    pub tags: Vec<&'static str>,
}

/// Score `query`; one point per firing rule plus one for a long query.
pub fn assess(query: &str, long_query_tokens: usize) -> ComplexityAssessment {
    let hits = rules::evaluate(&COMPLEXITY_RULES, query);
    let mut tags: Vec<&'static str> = hits.iter().map(|h| h.tag).collect();
    let mut score: u32 = hits.iter().map(|h| h.weight.max(0) as u32).sum();
    if text::tokenize(query).len() >= long_query_tokens {
        score += 1;
        tags.push("long_query");
    }
    ComplexityAssessment {
        score,
        risky_terms: rules::first_match(&RISK_RULES, query).is_some(),
        tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_query_scores_zero() {
        let a = assess("Read src/main.rs", 14);
        assert_eq!(a.score, 0);
        assert!(!a.risky_terms);
    }

    #[test]
    fn comparison_and_risk_add_up() {
        let a = assess("compare rebase versus merge before force-push to production", 14);
        assert!(a.risky_terms);
        assert!(a.tags.contains(&"comparison"));
        assert!(a.score >= 2);
    }

    #[test]
    fn long_queries_earn_a_point() {
        let q = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima mike november";
        let a = assess(q, 14);
        assert_eq!(a.tags, vec!["long_query"]);
        assert_eq!(a.score, 1);
    }
}
