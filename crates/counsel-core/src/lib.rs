//! Core types, traits, errors, configuration, and text utilities shared by
//! every Counsel crate.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod rules;
pub mod text;
pub mod traits;

pub use config::CounselConfig;
pub use errors::{CounselError, CounselResult};
pub use models::{
    AdviceFlags, AdviceId, AdviceQuery, AdviceRequest, CandidateAdvice, Insight, OutcomeKind,
    RetrievalMode, RoutingDecision, SourceKind, Verdict,
};
