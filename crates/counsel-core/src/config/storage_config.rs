use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::STATE_DIR_ENV;

/// Where and how persisted state is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// State directory. `None` resolves `$COUNSEL_STATE_DIR`, then `~/.counsel/state`.
    pub state_dir: Option<PathBuf>,
    /// Attempts to take an append-log lock before giving up.
    pub lock_retries: u32,
    /// Pause between lock attempts (ms).
    pub lock_retry_delay_ms: u64,
    /// Pause before re-reading a snapshot that failed to parse (ms).
    pub corrupt_retry_delay_ms: u64,
    /// Append logs are compacted to this many lines.
    pub log_max_lines: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: None,
            lock_retries: defaults::DEFAULT_LOCK_RETRIES,
            lock_retry_delay_ms: defaults::DEFAULT_LOCK_RETRY_DELAY_MS,
            corrupt_retry_delay_ms: defaults::DEFAULT_CORRUPT_RETRY_DELAY_MS,
            log_max_lines: defaults::DEFAULT_LOG_MAX_LINES,
        }
    }
}

impl StorageConfig {
    /// Resolve the effective state directory.
    pub fn resolved_state_dir(&self) -> PathBuf {
        if let Some(dir) = &self.state_dir {
            return dir.clone();
        }
        if let Some(dir) = std::env::var_os(STATE_DIR_ENV) {
            return PathBuf::from(dir);
        }
        super::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(defaults::DEFAULT_STATE_SUBDIR)
    }
}
