//! Scoring dimensions, each 0–2.

pub mod actionability;
pub mod ethics;
pub mod novelty;
pub mod outcome;
pub mod reasoning;
pub mod specificity;

use counsel_core::rules::{self, Rule};

/// Sum of firing weights, capped at 2.
pub(crate) fn capped_sum(table: &[Rule], text: &str) -> u8 {
    rules::total_weight(table, text).clamp(0, 2) as u8
}

/// Highest firing weight, capped at 2.
pub(crate) fn strongest(table: &[Rule], text: &str) -> u8 {
    rules::evaluate(table, text)
        .iter()
        .map(|h| h.weight)
        .max()
        .unwrap_or(0)
        .clamp(0, 2) as u8
}

/// Tags of broken patterns across every dimension table.
pub fn broken_rules() -> Vec<&'static str> {
    let mut broken = Vec::new();
    broken.extend(rules::broken_rules(&actionability::RULES));
    broken.extend(rules::broken_rules(&reasoning::RULES));
    broken.extend(rules::broken_rules(&outcome::RULES));
    broken.extend(rules::broken_rules(&specificity::RULES));
    broken.extend(rules::broken_rules(&ethics::EXPLOIT_RULES));
    broken.extend(rules::broken_rules(&ethics::POSITIVE_SUM_RULES));
    broken
}
