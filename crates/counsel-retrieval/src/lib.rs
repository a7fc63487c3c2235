//! # counsel-retrieval
//!
//! Advisory retrieval: fast candidate gathering, then ranking.
//!
//! ```text
//! RankingEngine
//! ├── AdviceCache (moka, TTL + LRU)
//! ├── Source adapters
//! │   ├── CorpusAdapter → RetrievalRouter
//! │   │   ├── Prefilter (DashMap token cache)
//! │   │   ├── FusionScorer (BM25 + overlap + semantic)
//! │   │   ├── Complexity rules, facet planner
//! │   │   └── EscalationLimiter (rolling rate cap)
//! │   ├── ToolCautionAdapter
//! │   └── NoteAdapter (session, chips, distillations, surprises, skill hints)
//! └── Ranking: domain guard → composite score → dedupe → top-K
//! ```

pub mod adapters;
pub mod cache;
pub mod engine;
pub mod fusion;
pub mod providers;
pub mod ranking;
pub mod router;

pub use cache::AdviceCache;
pub use engine::{RankedAdvice, RankingEngine};
pub use fusion::FusionScorer;
pub use router::RetrievalRouter;
