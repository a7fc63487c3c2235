use counsel_core::rule_pattern;
use counsel_core::rules::Rule;

rule_pattern!(
    RE_PATH,
    r"(?i)([\w.-]+/[\w./-]+|\b[\w-]+\.(?:rs|py|ts|tsx|js|jsx|json|toml|ya?ml|md|sql|sh|go|java|css|html|lock)\b)"
);
rule_pattern!(RE_IDENTIFIER, r"(\b[a-z][a-z0-9]*_[a-z0-9_]+\b|\b[a-z]+[A-Z]\w*\b|::)");
rule_pattern!(RE_FLAG, r"(?:^|\s)--?[a-zA-Z][\w-]*");
rule_pattern!(RE_NUMBER, r"\b\d+(?:\.\d+)*\b");
rule_pattern!(RE_CODE_SPAN, r"`[^`]+`");

pub(crate) static RULES: [Rule; 5] = [
    Rule::pattern("path", &RE_PATH, 1),
    Rule::pattern("identifier", &RE_IDENTIFIER, 1),
    Rule::pattern("flag", &RE_FLAG, 1),
    Rule::pattern("number", &RE_NUMBER, 1),
    Rule::pattern("code_span", &RE_CODE_SPAN, 1),
];

/// Concrete anchors: paths, identifiers, flags, numbers, code spans.
pub fn score(text: &str) -> u8 {
    super::capped_sum(&RULES, text)
}
