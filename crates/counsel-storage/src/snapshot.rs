//! JSON snapshots with recovery and re-read/merge saves.

use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use counsel_core::errors::StorageError;

use crate::atomic::{read_failed, write_atomic, write_failed};

/// Pure merge of two versions of the same persisted state.
///
/// `local` is what this process wants to write, `remote` is what is on disk now.
/// Implementations must be deterministic and must never lose monotonic counts.
pub trait Mergeable {
    fn merge(local: &Self, remote: &Self) -> Self;
}

/// A snapshot read from disk.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    /// Where a corrupt file was moved before falling back to the default.
    pub recovered_from: Option<PathBuf>,
}

/// Typed access to one JSON snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotStore<T> {
    path: PathBuf,
    retry_delay: Duration,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SnapshotStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>, retry_delay: Duration) -> Self {
        Self {
            path: path.into(),
            retry_delay,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot. A missing file yields the default.
    ///
    /// A file that fails to parse is retried once after the configured delay
    /// (another process may be mid-rename); if it still fails it is moved to
    /// `<name>.corrupt-<unix_ms>` and the default is returned.
    pub fn load(&self) -> Result<Loaded<T>, StorageError> {
        match self.try_parse()? {
            Some(Ok(value)) => return Ok(Loaded::fresh(value)),
            None => return Ok(Loaded::fresh(T::default())),
            Some(Err(_)) => {}
        }

        std::thread::sleep(self.retry_delay);
        let details = match self.try_parse()? {
            Some(Ok(value)) => return Ok(Loaded::fresh(value)),
            None => return Ok(Loaded::fresh(T::default())),
            Some(Err(details)) => details,
        };

        let backup = quarantine(&self.path)?;
        tracing::warn!(
            event = "state_recovered",
            path = %self.path.display(),
            backup = %backup.display(),
            details = %details,
            "corrupt state file moved aside, using defaults"
        );
        Ok(Loaded {
            value: T::default(),
            recovered_from: Some(backup),
        })
    }

    /// Overwrite the snapshot.
    pub fn save(&self, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(value).map_err(|e| write_failed(&self.path, e))?;
        write_atomic(&self.path, &bytes)
    }

    /// `None` when the file is absent or blank; `Some(Err)` on a parse failure.
    fn try_parse(&self) -> Result<Option<Result<T, String>>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(read_failed(&self.path, e)),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(
            serde_json::from_str(&content).map_err(|e| e.to_string()),
        ))
    }
}

impl<T> SnapshotStore<T>
where
    T: Serialize + DeserializeOwned + Default + Mergeable,
{
    /// Re-read the file, merge `local` into it, write, and return the merged value.
    pub fn merge_and_save(&self, local: &T) -> Result<T, StorageError> {
        let remote = self.load()?.value;
        let merged = T::merge(local, &remote);
        self.save(&merged)?;
        Ok(merged)
    }
}

impl<T> Loaded<T> {
    fn fresh(value: T) -> Self {
        Self {
            value,
            recovered_from: None,
        }
    }
}

fn quarantine(path: &Path) -> Result<PathBuf, StorageError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state".to_string());
    let backup = path.with_file_name(format!(
        "{name}.corrupt-{}",
        chrono::Utc::now().timestamp_millis()
    ));
    fs::rename(path, &backup).map_err(|e| write_failed(&backup, e))?;
    Ok(backup)
}
