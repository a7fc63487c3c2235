/// Outcome attribution ledger errors.
#[derive(Debug, thiserror::Error)]
pub enum AttributionError {
    #[error("no retrieval recorded for learning {learning_id}")]
    UnknownLearning { learning_id: String },

    #[error("counter invariant violated for {scope}: {details}")]
    CounterInvariant { scope: String, details: String },

    #[error("attribution log unavailable: {reason}")]
    LogUnavailable { reason: String },
}
