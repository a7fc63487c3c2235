//! Primitive-rejection battery.
//!
//! Any firing rule marks the text as noise; scoring is skipped. Tables are
//! evaluated in order so the reported tag is deterministic.

use counsel_core::rule_pattern;
use counsel_core::rules::{self, Rule};
use counsel_core::text;

rule_pattern!(
    RE_TOOL_OUTCOME,
    r"(?i)\b(succeeded|failed|worked|completed|ran|finished)\s+(?:with|using|via|in)\s+(?:the\s+)?\w+\s+tool\b"
);
rule_pattern!(
    RE_TOOL_CHAIN,
    r"(?i)^\s*\w+\s*(?:->|→|=>|>)\s*\w+(?:\s*(?:->|→|=>|>)\s*\w+)+\s*\.?\s*$"
);
rule_pattern!(
    RE_TOOL_STATUS,
    r"(?i)^\s*(?:tool\s+)?\w+\s+(?:call|calls|invocation|invocations|task)\s+(?:succeeded|failed|completed)\b"
);
rule_pattern!(
    RE_PLATITUDE,
    r"(?i)^\s*(?:always\s+)?(?:be careful|do (?:your|the) best|write (?:good|clean|better) code|test (?:everything|your code)|follow best practices|keep (?:it|things) simple|think before|communication is key|quality matters)\b"
);
rule_pattern!(
    RE_EVIDENCE,
    r"(?i)(\bbecause\b|\bsince\b|\bwhen\b|\bafter\b|\bbefore\b|\bunless\b|\d)"
);
rule_pattern!(
    RE_EXPLANATION,
    r"(?i)\b(because|so that|to avoid|otherwise|this prevents|which means)\b"
);
rule_pattern!(
    RE_CONNECTOR,
    r"(?i)\b(?:because|since|therefore|so)\b"
);

/// Code punctuation share above which unexplained text is raw code.
const RAW_CODE_DENSITY: f64 = 0.1;

static NOISE_RULES: [Rule; 7] = [
    Rule::pattern("tool_telemetry", &RE_TOOL_OUTCOME, 1),
    Rule::pattern("tool_telemetry", &RE_TOOL_CHAIN, 1),
    Rule::pattern("tool_telemetry", &RE_TOOL_STATUS, 1),
    Rule::predicate("metrics_dump", is_metrics_dump, 1),
    Rule::predicate("raw_code", is_code_like, 1).unless(&RE_EXPLANATION),
    Rule::predicate("tautology", is_circular, 1),
    Rule::pattern("platitude", &RE_PLATITUDE, 1).unless(&RE_EVIDENCE),
];

/// Tag of the first noise signature `text` carries.
pub fn detect(text: &str) -> Option<&'static str> {
    rules::first_match(&NOISE_RULES, text).map(|hit| hit.tag)
}

/// Tags of rules whose pattern failed to compile.
pub fn broken_rules() -> Vec<&'static str> {
    rules::broken_rules(&NOISE_RULES)
}

/// Mostly numbers: half or more of the words carry a digit.
fn is_metrics_dump(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 2 {
        return false;
    }
    let numeric = words
        .iter()
        .filter(|w| w.chars().any(|c| c.is_ascii_digit()))
        .count();
    numeric * 2 >= words.len()
}

fn is_code_like(text: &str) -> bool {
    text::code_density(text) > RAW_CODE_DENSITY
}

/// "X because X": both sides of a causal connector say the same thing.
fn is_circular(text: &str) -> bool {
    let Some(re) = RE_CONNECTOR.as_ref() else {
        return false;
    };
    let Some(m) = re.find(text) else {
        return false;
    };
    let left = text::token_set(&text[..m.start()]);
    let right = text::token_set(&text[m.end()..]);
    !left.is_empty() && !right.is_empty() && text::jaccard(&left, &right) >= 0.75
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_compiles() {
        assert!(broken_rules().is_empty());
    }

    #[test]
    fn tool_telemetry_is_noise() {
        assert_eq!(detect("Read task succeeded with Read tool"), Some("tool_telemetry"));
        assert_eq!(detect("Glob -> Read -> Edit"), Some("tool_telemetry"));
        assert_eq!(detect("Bash call failed"), Some("tool_telemetry"));
    }

    #[test]
    fn metrics_and_code() {
        assert_eq!(detect("latency 340ms p95 812ms errors 3"), Some("metrics_dump"));
        assert_eq!(detect("let x = foo(bar[0]); y();"), Some("raw_code"));
        assert_eq!(detect("Wrap it in Some(x) because None(y) breaks"), None);
    }

    #[test]
    fn circular_and_platitudes() {
        assert_eq!(detect("The build works because the build works"), Some("tautology"));
        assert_eq!(detect("Always write clean code"), Some("platitude"));
        assert_eq!(detect("Keep it simple when adding retries to the client"), None);
    }

    #[test]
    fn real_learnings_pass() {
        assert_eq!(detect("User prefers dark theme because it reduces eye strain"), None);
        assert_eq!(detect("Saved 3 files after fixing the import cycle"), None);
    }
}
