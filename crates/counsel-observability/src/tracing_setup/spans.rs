//! Span definitions per facade operation.

/// Create an advise span.
#[macro_export]
macro_rules! advise_span {
    ($tool:expr, $trace_id:expr) => {
        tracing::info_span!("counsel.advise", tool = %$tool, trace_id = ?$trace_id)
    };
}

/// Create a roast span.
#[macro_export]
macro_rules! roast_span {
    ($source:expr) => {
        tracing::info_span!("counsel.roast", source = ?$source)
    };
}

/// Create an outcome span.
#[macro_export]
macro_rules! outcome_span {
    ($tool:expr, $success:expr) => {
        tracing::info_span!("counsel.outcome", tool = %$tool, success = $success)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const ADVISE: &str = "counsel.advise";
    pub const ROAST: &str = "counsel.roast";
    pub const OUTCOME: &str = "counsel.outcome";
}
