//! Structured log events for the advisory facade.
//!
//! Each function emits a `tracing` event with structured fields. Lower
//! crates emit their own `escalation_decided`, `roast_verdict`,
//! `outcome_recorded`, `state_recovered` and `config_clamped` events.

/// Log advice handed back to the agent.
pub fn advice_served(tool: &str, count: usize, cache_hit: bool, elapsed_ms: u64) {
    tracing::info!(
        event = "advice_served",
        tool = %tool,
        count = count,
        cache_hit = cache_hit,
        elapsed_ms = elapsed_ms,
        "advice served"
    );
}

/// Log a tool outcome report fanned out to open retrievals.
pub fn outcome_reported(tool: &str, success: bool, attributed: usize) {
    tracing::info!(
        event = "outcome_reported",
        tool = %tool,
        success = success,
        attributed = attributed,
        "tool outcome reported"
    );
}

/// Log a learning stored into the corpus.
pub fn learning_stored(key: &str, category: &str, refined: bool) {
    tracing::info!(
        event = "learning_stored",
        key = %key,
        category = %category,
        refined = refined,
        "learning stored"
    );
}

/// Log a degradation trigger event.
pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

/// Log a component recovering from degradation.
pub fn degradation_recovered(component: &str) {
    tracing::info!(
        event = "degradation_recovered",
        component = %component,
        "degradation recovered"
    );
}

/// Log a configuration reload.
pub fn config_reloaded(profile: &str, warnings: usize) {
    tracing::info!(
        event = "config_reloaded",
        profile = %profile,
        warnings = warnings,
        "configuration reloaded"
    );
}

/// Log the result of an explicit repair.
pub fn repair_completed(sources_clamped: usize, records_repaired: usize, records_evicted: usize) {
    tracing::info!(
        event = "repair_completed",
        sources_clamped = sources_clamped,
        records_repaired = records_repaired,
        records_evicted = records_evicted,
        "repair completed"
    );
}
