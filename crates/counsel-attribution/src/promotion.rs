//! Dual-gate promotion policy.
//!
//! Warm-up until `weak_min_samples` decisive outcomes; weak rate until
//! `strict_min_samples` strict outcomes; below `strict_floor` the insight is
//! suppressed for `retest_cooldown_secs`, then judged on strict outcomes
//! gathered since the suppression only.
//!
//! Suppression and retest resolution bump `epoch`. Merging keeps the higher
//! epoch wholesale (its strict counters were deliberately reset) and takes
//! the max of everything that is monotonic within one epoch.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use counsel_core::config::AttributionConfig;
use counsel_core::models::{InsightEffectiveness, OutcomeKind, PromotionTier};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionState {
    pub epoch: u64,
    pub weak_good: u64,
    pub weak_bad: u64,
    pub strict_good: u64,
    pub strict_bad: u64,
    pub suppressed_until: Option<DateTime<Utc>>,
    pub retest_good: u64,
    pub retest_bad: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PromotionState {
    pub fn weak_total(&self) -> u64 {
        self.weak_good + self.weak_bad
    }

    pub fn strict_total(&self) -> u64 {
        self.strict_good + self.strict_bad
    }

    pub fn weak_rate(&self) -> f64 {
        rate(self.weak_good, self.weak_bad)
    }

    pub fn strict_rate(&self) -> f64 {
        rate(self.strict_good, self.strict_bad)
    }

    fn in_retest(&self, now: DateTime<Utc>) -> bool {
        self.suppressed_until.is_some_and(|until| now >= until)
    }

    fn suppress(&mut self, now: DateTime<Utc>, config: &AttributionConfig) {
        self.epoch += 1;
        self.suppressed_until = Some(now + cooldown(config));
        self.retest_good = 0;
        self.retest_bad = 0;
    }
}

fn rate(good: u64, bad: u64) -> f64 {
    let n = good + bad;
    if n == 0 {
        0.5
    } else {
        good as f64 / n as f64
    }
}

fn cooldown(config: &AttributionConfig) -> Duration {
    Duration::seconds(config.retest_cooldown_secs.min(u64::from(u32::MAX)) as i64)
}

/// Effectiveness of an insight at `now`.
pub fn effectiveness(
    state: &PromotionState,
    config: &AttributionConfig,
    now: DateTime<Utc>,
) -> InsightEffectiveness {
    if state.weak_total() < config.weak_min_samples {
        return InsightEffectiveness::NEUTRAL;
    }
    if let Some(until) = state.suppressed_until {
        return if now < until {
            suppressed(config)
        } else {
            InsightEffectiveness {
                score: 0.5,
                suppressed: false,
                tier: PromotionTier::Retest,
            }
        };
    }
    if state.strict_total() < config.strict_min_samples {
        return InsightEffectiveness {
            score: state.weak_rate(),
            suppressed: false,
            tier: PromotionTier::Weak,
        };
    }
    if state.strict_rate() < config.strict_floor {
        return suppressed(config);
    }
    let w = config.strict_weight.clamp(0.0, 1.0);
    InsightEffectiveness {
        score: ((1.0 - w) * state.weak_rate() + w * state.strict_rate()).clamp(0.0, 1.0),
        suppressed: false,
        tier: PromotionTier::Strict,
    }
}

fn suppressed(config: &AttributionConfig) -> InsightEffectiveness {
    InsightEffectiveness {
        score: config.suppressed_effectiveness,
        suppressed: true,
        tier: PromotionTier::Suppressed,
    }
}

/// Fold one counted outcome into the state.
pub fn apply_outcome(
    state: &mut PromotionState,
    outcome: OutcomeKind,
    strict: bool,
    config: &AttributionConfig,
    now: DateTime<Utc>,
) {
    if !outcome.is_decisive() {
        return;
    }
    let good = outcome == OutcomeKind::Good;
    state.updated_at = Some(now);
    if good {
        state.weak_good += 1;
    } else {
        state.weak_bad += 1;
    }

    if state.in_retest(now) {
        if !strict {
            return;
        }
        if good {
            state.retest_good += 1;
        } else {
            state.retest_bad += 1;
        }
        if state.retest_good + state.retest_bad < config.strict_min_samples {
            return;
        }
        if rate(state.retest_good, state.retest_bad) >= config.strict_floor {
            state.epoch += 1;
            state.strict_good = state.retest_good;
            state.strict_bad = state.retest_bad;
            state.suppressed_until = None;
            state.retest_good = 0;
            state.retest_bad = 0;
        } else {
            state.suppress(now, config);
        }
        return;
    }
    if state.suppressed_until.is_some() || !strict {
        return;
    }

    if good {
        state.strict_good += 1;
    } else {
        state.strict_bad += 1;
    }
    if state.strict_total() >= config.strict_min_samples
        && state.strict_rate() < config.strict_floor
    {
        state.suppress(now, config);
    }
}

/// Merge two copies of one insight's promotion state.
pub fn merge_state(local: &PromotionState, remote: &PromotionState) -> PromotionState {
    let weak_good = local.weak_good.max(remote.weak_good);
    let weak_bad = local.weak_bad.max(remote.weak_bad);
    let updated_at = local.updated_at.max(remote.updated_at);

    let mut merged = match local.epoch.cmp(&remote.epoch) {
        std::cmp::Ordering::Greater => local.clone(),
        std::cmp::Ordering::Less => remote.clone(),
        std::cmp::Ordering::Equal => PromotionState {
            epoch: local.epoch,
            weak_good,
            weak_bad,
            strict_good: local.strict_good.max(remote.strict_good),
            strict_bad: local.strict_bad.max(remote.strict_bad),
            suppressed_until: local.suppressed_until.max(remote.suppressed_until),
            retest_good: local.retest_good.max(remote.retest_good),
            retest_bad: local.retest_bad.max(remote.retest_bad),
            updated_at,
        },
    };
    merged.weak_good = weak_good;
    merged.weak_bad = weak_bad;
    merged.updated_at = updated_at;
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn cfg() -> AttributionConfig {
        AttributionConfig {
            weak_min_samples: 2,
            strict_min_samples: 3,
            strict_floor: 0.3,
            retest_cooldown_secs: 3_600,
            strict_weight: 0.7,
            ..AttributionConfig::default()
        }
    }

    #[test]
    fn warm_up_is_neutral_regardless_of_history() {
        let mut s = PromotionState::default();
        apply_outcome(&mut s, OutcomeKind::Bad, true, &cfg(), now());
        let e = effectiveness(&s, &cfg(), now());
        assert_eq!(e.tier, PromotionTier::WarmUp);
        assert_eq!(e.score, 0.5);
    }

    #[test]
    fn weak_rate_governs_until_strict_min() {
        let mut s = PromotionState::default();
        apply_outcome(&mut s, OutcomeKind::Good, false, &cfg(), now());
        apply_outcome(&mut s, OutcomeKind::Bad, false, &cfg(), now());
        let e = effectiveness(&s, &cfg(), now());
        assert_eq!(e.tier, PromotionTier::Weak);
        assert!((e.score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn strict_blend_leans_strict() {
        let mut s = PromotionState::default();
        for _ in 0..3 {
            apply_outcome(&mut s, OutcomeKind::Good, true, &cfg(), now());
        }
        apply_outcome(&mut s, OutcomeKind::Bad, false, &cfg(), now());
        let e = effectiveness(&s, &cfg(), now());
        assert_eq!(e.tier, PromotionTier::Strict);
        // weak 3/4, strict 3/3
        assert!((e.score - (0.3 * 0.75 + 0.7)).abs() < 1e-9);
    }

    #[test]
    fn floor_suppresses_then_retest_restores() {
        let c = cfg();
        let mut s = PromotionState::default();
        for _ in 0..3 {
            apply_outcome(&mut s, OutcomeKind::Bad, true, &c, now());
        }
        assert!(effectiveness(&s, &c, now()).suppressed);
        assert_eq!(s.epoch, 1);

        let later = now() + Duration::seconds(3_601);
        assert_eq!(effectiveness(&s, &c, later).tier, PromotionTier::Retest);
        for _ in 0..3 {
            apply_outcome(&mut s, OutcomeKind::Good, true, &c, later);
        }
        let e = effectiveness(&s, &c, later);
        assert_eq!(e.tier, PromotionTier::Strict);
        assert_eq!((s.strict_good, s.strict_bad), (3, 0));
        assert_eq!(s.epoch, 2);
    }

    #[test]
    fn failed_retest_resuppresses() {
        let c = cfg();
        let mut s = PromotionState::default();
        for _ in 0..3 {
            apply_outcome(&mut s, OutcomeKind::Bad, true, &c, now());
        }
        let later = now() + Duration::seconds(3_601);
        for _ in 0..3 {
            apply_outcome(&mut s, OutcomeKind::Bad, true, &c, later);
        }
        assert!(effectiveness(&s, &c, later).suppressed);
        assert_eq!(s.suppressed_until, Some(later + Duration::seconds(3_600)));
    }

    #[test]
    fn higher_epoch_wins_but_weak_counts_survive() {
        let c = cfg();
        let mut a = PromotionState::default();
        for _ in 0..3 {
            apply_outcome(&mut a, OutcomeKind::Bad, true, &c, now());
        }
        let mut b = PromotionState::default();
        for _ in 0..5 {
            apply_outcome(&mut b, OutcomeKind::Good, false, &c, now());
        }
        let merged = merge_state(&b, &a);
        assert_eq!(merged.epoch, 1);
        assert!(merged.suppressed_until.is_some());
        assert_eq!((merged.weak_good, merged.weak_bad), (5, 3));
        assert_eq!(merge_state(&a, &b), merged);
    }
}
