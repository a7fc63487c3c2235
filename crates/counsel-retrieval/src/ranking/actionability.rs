//! Deterministic actionability heuristic over advice text.

use counsel_core::rule_pattern;
use counsel_core::rules::{self, Rule};
use counsel_core::text;

rule_pattern!(
    RE_IMPERATIVE,
    r"(?i)^\s*(always|never|use|avoid|prefer|run|check|add|remove|make sure|ensure|don't|do not|set|keep|try|verify|read|pin|split)\b"
);
rule_pattern!(
    RE_CONDITIONAL,
    r"(?i)\b(if|when|whenever|before|after|unless|instead of|otherwise)\b"
);
rule_pattern!(RE_REASON, r"(?i)\b(because|so that|to avoid|which prevents|since)\b");
rule_pattern!(
    RE_TELEMETRY,
    r"(?i)(\b\d+(?:\.\d+)?\s?(?:%|(?:ms|s|sec)\b)|\b(?:succeeded|status|exit code|latency|count)\s*[:=]?\s*\d)"
);

/// Weights are hundredths.
static ACTIONABILITY_RULES: [Rule; 5] = [
    Rule::pattern("imperative", &RE_IMPERATIVE, 30),
    Rule::pattern("conditional", &RE_CONDITIONAL, 20),
    Rule::pattern("reason", &RE_REASON, 10),
    Rule::pattern("telemetry_shape", &RE_TELEMETRY, -20),
    Rule::predicate("code_dense", is_code_dense, -30),
];

const BASE: i32 = 30;

/// Share of symbol characters above which text reads as code.
const CODE_DENSITY_LIMIT: f64 = 0.08;

fn is_code_dense(text: &str) -> bool {
    text::code_density(text) > CODE_DENSITY_LIMIT
}

/// Actionability in [0.0, 1.0].
pub fn actionability(text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }
    let points = BASE + rules::total_weight(&ACTIONABILITY_RULES, text);
    (points as f64 / 100.0).clamp(0.0, 1.0)
}
