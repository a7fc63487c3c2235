//! # counsel-advisor
//!
//! The advisory facade. Owns one of every engine and wires them together:
//!
//! ```text
//! Advisor
//! ├── RankingEngine ── CorpusAdapter → RetrievalRouter
//! │                 ├─ ToolCautionAdapter ─┐
//! │                 └─ NoteAdapter × 5     │
//! ├── AttributionLedger ◄──────────────────┘ (effectiveness oracle)
//! ├── QualityGate
//! └── ConfigWatcher (hot reload)
//! ```

pub mod advisor;
pub mod options;
pub mod response;

pub use advisor::Advisor;
pub use options::AdvisorOptions;
pub use response::{AdviceResponse, LearnOutcome};
