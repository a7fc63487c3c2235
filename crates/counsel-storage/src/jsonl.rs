//! Append-only JSON-lines logs guarded by an advisory file lock.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use counsel_core::config::StorageConfig;
use counsel_core::errors::StorageError;

use crate::atomic::{read_failed, write_failed};

/// Bytes read per step when tailing from the end of a log.
const TAIL_BLOCK: u64 = 8 * 1024;

/// What to do when the lock cannot be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockPolicy {
    /// Refuse the write and surface `LockUnavailable`. For records attribution depends on.
    FailClosed,
    /// Drop the line and carry on.
    BestEffort,
}

#[derive(Debug, Clone)]
pub struct AppendLog {
    path: PathBuf,
    policy: LockPolicy,
    retries: u32,
    retry_delay: Duration,
}

impl AppendLog {
    pub fn new(path: impl Into<PathBuf>, policy: LockPolicy, config: &StorageConfig) -> Self {
        Self {
            path: path.into(),
            policy,
            retries: config.lock_retries.max(1),
            retry_delay: Duration::from_millis(config.lock_retry_delay_ms),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> LockPolicy {
        self.policy
    }

    /// Serialize `record` as one line and append it.
    ///
    /// Returns `Ok(false)` when a best-effort log dropped the line.
    pub fn append<T: Serialize>(&self, record: &T) -> Result<bool, StorageError> {
        let mut line =
            serde_json::to_string(record).map_err(|e| write_failed(&self.path, e))?;
        line.push('\n');
        self.append_raw(line.as_bytes())
    }

    fn append_raw(&self, bytes: &[u8]) -> Result<bool, StorageError> {
        let outcome = self.with_lock(|file| {
            file.seek(SeekFrom::End(0))?;
            file.write_all(bytes)
        });
        match outcome {
            Ok(()) => Ok(true),
            Err(e) => self.handle_failure(e),
        }
    }

    /// Keep only the newest `max_lines` lines. Returns how many lines were dropped.
    pub fn compact(&self, max_lines: usize) -> Result<usize, StorageError> {
        if !self.path.exists() {
            return Ok(0);
        }
        let mut dropped = 0;
        let outcome = self.with_lock(|file| {
            let mut content = String::new();
            file.seek(SeekFrom::Start(0))?;
            file.read_to_string(&mut content)?;
            let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
            if lines.len() <= max_lines {
                return Ok(());
            }
            dropped = lines.len() - max_lines;
            let mut kept = lines[dropped..].join("\n");
            kept.push('\n');
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(kept.as_bytes())
        });
        match outcome {
            Ok(()) => Ok(dropped),
            Err(e) => self.handle_failure(e).map(|_| 0),
        }
    }

    /// The newest `n` non-empty lines, oldest first. Reads only the file's tail.
    pub fn tail_lines(&self, n: usize) -> Result<Vec<String>, StorageError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_failed(&self.path, e)),
        };
        let len = file
            .metadata()
            .map_err(|e| read_failed(&self.path, e))?
            .len();

        let mut pos = len;
        let mut buf: Vec<u8> = Vec::new();
        while pos > 0 {
            let step = TAIL_BLOCK.min(pos);
            pos -= step;
            let mut chunk = vec![0u8; step as usize];
            file.seek(SeekFrom::Start(pos))
                .and_then(|_| file.read_exact(&mut chunk))
                .map_err(|e| read_failed(&self.path, e))?;
            chunk.extend_from_slice(&buf);
            buf = chunk;
            if buf.iter().filter(|b| **b == b'\n').count() > n {
                break;
            }
        }

        let text = String::from_utf8_lossy(&buf);
        let mut lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if pos > 0 && !lines.is_empty() {
            // First line may start mid-record.
            lines.remove(0);
        }
        let start = lines.len().saturating_sub(n);
        Ok(lines[start..].iter().map(|l| l.to_string()).collect())
    }

    /// The newest `n` records that parse as `T`. Malformed lines are skipped.
    pub fn tail<T: DeserializeOwned>(&self, n: usize) -> Result<Vec<T>, StorageError> {
        Ok(self
            .tail_lines(n)?
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }

    /// Every record that parses as `T`.
    pub fn read_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_failed(&self.path, e)),
        };
        Ok(content
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }

    fn with_lock<F>(&self, mut op: F) -> Result<(), LockFailure>
    where
        F: FnMut(&mut File) -> std::io::Result<()>,
    {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(LockFailure::Io)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(LockFailure::Io)?;
        let mut lock = fd_lock::RwLock::new(file);

        for attempt in 1..=self.retries {
            match lock.try_write() {
                Ok(mut guard) => return op(&mut guard).map_err(LockFailure::Io),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if attempt < self.retries {
                        std::thread::sleep(self.retry_delay);
                    }
                }
                Err(e) => return Err(LockFailure::Io(e)),
            }
        }
        Err(LockFailure::Contended)
    }

    fn handle_failure(&self, failure: LockFailure) -> Result<bool, StorageError> {
        match (self.policy, failure) {
            (LockPolicy::FailClosed, LockFailure::Contended) => Err(StorageError::LockUnavailable {
                path: self.path.display().to_string(),
                attempts: self.retries,
            }),
            (LockPolicy::FailClosed, LockFailure::Io(e)) => Err(write_failed(&self.path, e)),
            (LockPolicy::BestEffort, failure) => {
                tracing::debug!(
                    path = %self.path.display(),
                    reason = %failure,
                    "best-effort log line dropped"
                );
                Ok(false)
            }
        }
    }
}

#[derive(Debug)]
enum LockFailure {
    Contended,
    Io(std::io::Error),
}

impl std::fmt::Display for LockFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contended => f.write_str("lock contended"),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}
