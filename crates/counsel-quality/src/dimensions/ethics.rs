use counsel_core::rule_pattern;
use counsel_core::rules::{self, Rule};

rule_pattern!(
    RE_EXPLOIT,
    r"(?i)\b(manipulat\w*|deceiv\w*|trick (?:users|people|them|customers)|exploit (?:users|people|customers)|dark patterns?|bypass (?:consent|auth\w*|the paywall)|harvest (?:emails|data|contacts)|spam\w*|astroturf\w*)\b"
);
rule_pattern!(
    RE_POSITIVE_SUM,
    r"(?i)\b(win-win|mutual(?:ly)? benefi\w*|benefits? (?:both|everyone)|with (?:explicit )?consent|transparen\w*|respects? (?:the )?users?)\b"
);

pub(crate) static EXPLOIT_RULES: [Rule; 1] = [Rule::pattern("exploit", &RE_EXPLOIT, 1)];
pub(crate) static POSITIVE_SUM_RULES: [Rule; 1] =
    [Rule::pattern("positive_sum", &RE_POSITIVE_SUM, 1)];

/// Neutral text scores 1.
pub const NEUTRAL: u8 = 1;

/// 0 for exploitative content, 2 for explicit positive-sum framing.
pub fn score(text: &str) -> u8 {
    if rules::first_match(&EXPLOIT_RULES, text).is_some() {
        0
    } else if rules::first_match(&POSITIVE_SUM_RULES, text).is_some() {
        2
    } else {
        NEUTRAL
    }
}
