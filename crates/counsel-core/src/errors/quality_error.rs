/// Quality gate errors. Scoring itself never fails; these cover persistence
/// of gate state.
#[derive(Debug, thiserror::Error)]
pub enum QualityError {
    #[error("invalid rule pattern {tag}: {reason}")]
    InvalidRule { tag: String, reason: String },

    #[error("roast history unavailable: {reason}")]
    HistoryUnavailable { reason: String },
}
