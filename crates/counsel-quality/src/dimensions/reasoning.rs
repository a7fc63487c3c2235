use counsel_core::rule_pattern;
use counsel_core::rules::Rule;

rule_pattern!(
    RE_CAUSAL,
    r"(?i)\b(because|since|so that|due to|as a result|which means|otherwise)\b"
);
rule_pattern!(
    RE_PURPOSE,
    r"(?i)\b(to avoid|to prevent|in order to|to keep|to make sure|to ensure)\b"
);

pub(crate) static RULES: [Rule; 2] = [
    Rule::pattern("causal", &RE_CAUSAL, 2),
    Rule::pattern("purpose", &RE_PURPOSE, 1),
];

/// Whether the text carries its own justification.
pub fn score(text: &str) -> u8 {
    super::strongest(&RULES, text)
}
