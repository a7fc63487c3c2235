use counsel_core::rule_pattern;
use counsel_core::rules::Rule;

rule_pattern!(
    RE_IMPERATIVE,
    r"(?i)^\s*(always|never|use|avoid|prefer|run|check|add|remove|make sure|ensure|don't|do not|set|keep|verify|pin|split|call|pass|wrap)\b"
);
rule_pattern!(
    RE_PREFERENCE,
    r"(?i)\b(prefers?|wants?|likes|dislikes|expects?|requires?|insists? on)\b"
);
rule_pattern!(
    RE_CONDITION,
    r"(?i)\b(if|when|whenever|before|after|unless|instead of)\b"
);

pub(crate) static RULES: [Rule; 3] = [
    Rule::pattern("imperative", &RE_IMPERATIVE, 1),
    Rule::pattern("preference", &RE_PREFERENCE, 1),
    Rule::pattern("condition", &RE_CONDITION, 1),
];

/// Does the text tell someone what to do, and when.
pub fn score(text: &str) -> u8 {
    super::capped_sum(&RULES, text)
}
