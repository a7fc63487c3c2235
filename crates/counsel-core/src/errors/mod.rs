//! Error handling for Counsel.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod attribution_error;
pub mod config_error;
pub mod quality_error;
pub mod retrieval_error;
pub mod storage_error;

pub use attribution_error::AttributionError;
pub use config_error::ConfigError;
pub use quality_error::QualityError;
pub use retrieval_error::RetrievalError;
pub use storage_error::StorageError;

/// Top-level error for every Counsel operation.
#[derive(Debug, thiserror::Error)]
pub enum CounselError {
    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("attribution error: {0}")]
    AttributionError(#[from] AttributionError),

    #[error("quality gate error: {0}")]
    QualityError(#[from] QualityError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("unknown {kind}: {value:?}")]
    UnknownKind { kind: &'static str, value: String },

    #[error("degraded mode: {component} fell back to {fallback}")]
    DegradedMode { component: String, fallback: String },

    #[error("invariant violated: {details}")]
    InvariantViolation { details: String },
}

/// Result alias used across the workspace.
pub type CounselResult<T> = Result<T, CounselError>;
