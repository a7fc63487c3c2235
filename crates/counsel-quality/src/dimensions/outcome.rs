use counsel_core::rule_pattern;
use counsel_core::rules::Rule;

rule_pattern!(
    RE_EFFECT,
    r"(?i)\b(reduces?|reduced|prevents?|prevented|avoids?|fixe[sd]|fix|improves?|improved|causes?|caused|leads? to|led to|results? in|broke|breaks|saves?|saved|speeds? up|sped up|slows? down)\b"
);
rule_pattern!(
    RE_MEASURED,
    r"(?i)(\b\d+(?:\.\d+)?\s?(?:%|(?:x|ms|s|sec|seconds|minutes|mins|hours)\b)|\b(resolved|eliminated|halved|doubled|cut)\b)"
);

pub(crate) static RULES: [Rule; 2] = [
    Rule::pattern("effect", &RE_EFFECT, 1),
    Rule::pattern("measured", &RE_MEASURED, 1),
];

/// Link between the learning and an observed result.
pub fn score(text: &str) -> u8 {
    super::capped_sum(&RULES, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_and_measurement_stack() {
        assert_eq!(score("Nothing to see"), 0);
        assert_eq!(score("Caching reduces load"), 1);
        assert_eq!(score("Caching cut p95 latency by 40%"), 1);
        assert_eq!(score("Batching inserts reduced import time by 60%"), 2);
    }
}
