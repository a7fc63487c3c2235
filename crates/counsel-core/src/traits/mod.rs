pub mod adapter;
pub mod corpus;
pub mod domain;
pub mod effectiveness;
pub mod similarity;

pub use adapter::{AdapterOutput, ISourceAdapter};
pub use corpus::IInsightCorpus;
pub use domain::{IDomainClassifier, KeywordDomainClassifier};
pub use effectiveness::{IEffectivenessOracle, NeutralOracle};
pub use similarity::{ISimilarityProvider, SimilarityHit};
