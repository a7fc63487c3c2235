/// Errors from the file-backed persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("corrupt state in {path}: {details}")]
    CorruptState { path: String, details: String },

    #[error("lock unavailable on {path} after {attempts} attempts")]
    LockUnavailable { path: String, attempts: u32 },
}
