//! Lexical-semantic fusion scoring. Pure functions, no persisted state.

pub mod bm25;
pub mod overlap;
pub mod scorer;

pub use scorer::{FusionDoc, FusionScore, FusionScorer};
