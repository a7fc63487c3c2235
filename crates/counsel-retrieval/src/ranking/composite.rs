/// The factors combined into one ranking score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeInputs {
    pub confidence: f64,
    pub context_match: f64,
    pub source_quality: f64,
    pub actionability: f64,
    /// Demonstrated effectiveness, 0.5 when unknown.
    pub effectiveness: f64,
    /// Historical helpfulness of the source, 0.5 when unknown.
    pub helpfulness: f64,
}

/// confidence × match × source quality × (0.5 + actionability)
/// × (0.5 + effectiveness) × (0.8 + 0.4 × helpfulness)
pub fn composite_score(i: &CompositeInputs) -> f64 {
    let v = unit(i.confidence)
        * unit(i.context_match)
        * i.source_quality.max(0.0)
        * (0.5 + unit(i.actionability))
        * (0.5 + unit(i.effectiveness))
        * (0.8 + 0.4 * unit(i.helpfulness));
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral() -> CompositeInputs {
        CompositeInputs {
            confidence: 1.0,
            context_match: 1.0,
            source_quality: 1.0,
            actionability: 0.5,
            effectiveness: 0.5,
            helpfulness: 0.5,
        }
    }

    #[test]
    fn neutral_factors_multiply_to_one() {
        assert!((composite_score(&neutral()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn effectiveness_moves_score_both_ways() {
        let mut good = neutral();
        good.effectiveness = 1.0;
        let mut bad = neutral();
        bad.effectiveness = 0.0;
        assert!(composite_score(&good) > composite_score(&neutral()));
        assert!(composite_score(&bad) < composite_score(&neutral()));
    }

    #[test]
    fn zero_match_zeroes_score() {
        let mut i = neutral();
        i.context_match = 0.0;
        assert_eq!(composite_score(&i), 0.0);
    }
}
