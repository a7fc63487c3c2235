//! Fixture loader for Counsel golden datasets and integration scenarios.
//!
//! Fixtures live under `golden/` next to this crate's manifest, so every
//! crate in the workspace resolves the same files.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("golden")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a fixture file as raw JSON Value.
pub fn load_fixture_value(relative_path: &str) -> serde_json::Value {
    load_fixture(relative_path)
}

pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// One golden case for the quality gate.
#[derive(Debug, Clone, Deserialize)]
pub struct RoastCase {
    pub name: String,
    pub text: String,
    /// Expected verdict as its wire name (`quality`, `needs_work`, `primitive`, `duplicate`).
    pub verdict: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Golden roast cases, evaluated against a fresh gate in order.
pub fn roast_cases() -> Vec<RoastCase> {
    load_fixture("quality/roast_cases.json")
}

/// One seed learning for a test corpus.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedInsight {
    pub key: String,
    pub category: String,
    pub text: String,
    pub confidence: f64,
    #[serde(default)]
    pub domain: Option<String>,
}

/// Small mixed-domain corpus used by retrieval and advisor tests.
pub fn seed_corpus() -> Vec<SeedInsight> {
    load_fixture("corpus/seed_insights.json")
}

/// One step of a scripted attribution scenario.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LedgerStep {
    Retrieve {
        learning_id: String,
        trace_id: Option<String>,
        #[serde(default)]
        offset_secs: i64,
    },
    Outcome {
        learning_id: String,
        outcome: String,
        trace_id: Option<String>,
        #[serde(default)]
        offset_secs: i64,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerScenario {
    pub name: String,
    pub steps: Vec<LedgerStep>,
    pub expect_strict_good: u64,
    pub expect_strict_bad: u64,
    pub expect_weak_good: u64,
    pub expect_weak_bad: u64,
}

pub fn ledger_scenarios() -> Vec<LedgerScenario> {
    load_fixture("attribution/ledger_scenarios.json")
}
