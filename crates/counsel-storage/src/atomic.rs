use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use counsel_core::errors::StorageError;

/// Write `bytes` to `path` through a uniquely named sibling temp file and a rename.
///
/// Readers never observe a half-written file. Concurrent writers each use their
/// own temp file; the last rename wins.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| write_failed(parent, e))?;
    }
    let tmp = temp_sibling(path);

    let result = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(write_failed(path, e));
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state".to_string());
    let unique = uuid::Uuid::new_v4().simple().to_string();
    path.with_file_name(format!(".{name}.{}.{}.tmp", std::process::id(), &unique[..12]))
}

pub(crate) fn write_failed(path: &Path, e: impl std::fmt::Display) -> StorageError {
    StorageError::WriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

pub(crate) fn read_failed(path: &Path, e: impl std::fmt::Display) -> StorageError {
    StorageError::ReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_parent_and_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn temp_names_are_unique() {
        let p = Path::new("/tmp/x/ledger.json");
        assert_ne!(temp_sibling(p), temp_sibling(p));
    }
}
