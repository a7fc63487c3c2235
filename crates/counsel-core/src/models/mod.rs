pub mod advice;
pub mod effectiveness;
pub mod insight;
pub mod note;
pub mod outcome;
pub mod quality;
pub mod request;
pub mod routing;
pub mod source;

pub use advice::{AdviceId, CandidateAdvice};
pub use effectiveness::{InsightEffectiveness, PromotionTier, ToolOutcomeStats};
pub use insight::Insight;
pub use note::Note;
pub use outcome::OutcomeKind;
pub use quality::{QualityDimensions, QualityScore, Verdict};
pub use request::{AdviceFlags, AdviceQuery, AdviceRequest};
pub use routing::{EscalationReason, RetrievalMode, RoutingDecision, SuppressionReason};
pub use source::SourceKind;
