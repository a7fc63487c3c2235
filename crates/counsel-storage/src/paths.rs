use std::fs;
use std::path::{Path, PathBuf};

use counsel_core::config::StorageConfig;
use counsel_core::errors::StorageError;
use counsel_core::models::SourceKind;

use crate::atomic::write_failed;

pub const INSIGHTS_FILE: &str = "insights.json";
pub const OUTCOME_LEDGER_FILE: &str = "outcome_ledger.json";
pub const EFFECTIVENESS_FILE: &str = "effectiveness.json";
pub const QUALITY_SEEN_FILE: &str = "quality_seen.json";
pub const ROUTER_WINDOW_FILE: &str = "router_window.json";
pub const SOURCES_DIR: &str = "sources";
pub const ROUTING_DECISIONS_LOG: &str = "routing_decisions.jsonl";
pub const ADVICE_GIVEN_LOG: &str = "advice_given.jsonl";
pub const ROAST_HISTORY_LOG: &str = "roast_history.jsonl";
pub const LEDGER_SNAPSHOTS_LOG: &str = "ledger_snapshots.jsonl";

/// File layout of one state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateLayout {
    root: PathBuf,
}

impl StateLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.resolved_state_dir())
    }

    /// Create the state and sources directories.
    pub fn ensure(&self) -> Result<(), StorageError> {
        let sources = self.root.join(SOURCES_DIR);
        fs::create_dir_all(&sources).map_err(|e| write_failed(&sources, e))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn insights(&self) -> PathBuf {
        self.root.join(INSIGHTS_FILE)
    }

    pub fn outcome_ledger(&self) -> PathBuf {
        self.root.join(OUTCOME_LEDGER_FILE)
    }

    pub fn effectiveness(&self) -> PathBuf {
        self.root.join(EFFECTIVENESS_FILE)
    }

    pub fn quality_seen(&self) -> PathBuf {
        self.root.join(QUALITY_SEEN_FILE)
    }

    pub fn router_window(&self) -> PathBuf {
        self.root.join(ROUTER_WINDOW_FILE)
    }

    pub fn source_notes(&self, source: SourceKind) -> PathBuf {
        self.root
            .join(SOURCES_DIR)
            .join(format!("{}.json", source.as_str()))
    }

    pub fn routing_decisions(&self) -> PathBuf {
        self.root.join(ROUTING_DECISIONS_LOG)
    }

    pub fn advice_given(&self) -> PathBuf {
        self.root.join(ADVICE_GIVEN_LOG)
    }

    pub fn roast_history(&self) -> PathBuf {
        self.root.join(ROAST_HISTORY_LOG)
    }

    pub fn ledger_snapshots(&self) -> PathBuf {
        self.root.join(LEDGER_SNAPSHOTS_LOG)
    }
}
