use std::path::PathBuf;
use std::time::SystemTime;

use super::{ConfigSources, CounselConfig, LoadedConfig};

/// Polls config file modification times and re-resolves on change.
#[derive(Debug)]
pub struct ConfigWatcher {
    sources: ConfigSources,
    stamps: Vec<(PathBuf, Option<SystemTime>)>,
}

impl ConfigWatcher {
    pub fn new(sources: ConfigSources) -> Self {
        let stamps = Self::snapshot(&sources);
        Self { sources, stamps }
    }

    pub fn sources(&self) -> &ConfigSources {
        &self.sources
    }

    /// Whether any watched file appeared, disappeared, or changed since the last poll.
    pub fn changed(&self) -> bool {
        Self::snapshot(&self.sources) != self.stamps
    }

    /// Re-resolve when a watched file changed. Returns `None` when nothing moved.
    pub fn poll(&mut self) -> Option<LoadedConfig> {
        let current = Self::snapshot(&self.sources);
        if current == self.stamps {
            return None;
        }
        self.stamps = current;
        Some(CounselConfig::load_from(&self.sources, |key| {
            std::env::var(key).ok()
        }))
    }

    fn snapshot(sources: &ConfigSources) -> Vec<(PathBuf, Option<SystemTime>)> {
        sources
            .paths()
            .map(|p| {
                let mtime = std::fs::metadata(p).and_then(|m| m.modified()).ok();
                (p.to_path_buf(), mtime)
            })
            .collect()
    }
}
