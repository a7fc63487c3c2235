//! # counsel-quality
//!
//! Gate between captured learnings and the insight corpus.
//!
//! Incoming text → too-short check → duplicate check (normalized hash) →
//! noise battery → dimension scoring → optional structural refinement →
//! verdict. Every roast is appended to a bounded history feeding the
//! quality-rate metric.

pub mod dimensions;
pub mod engine;
pub mod history;
pub mod noise;
pub mod refine;
pub mod seen;

pub use engine::{QualityGate, RoastOutcome};
pub use history::{QualityRate, RoastContext, RoastHistory, RoastRecord};
pub use seen::SeenHashes;
