//! Retrieval router: primary pass, escalation policy, facet expansion.

pub mod complexity;
pub mod engine;
pub mod facets;
pub mod prefilter;
pub mod rate_limiter;

pub use engine::{RetrievalRouter, RouteOutcome, RouterHit};
pub use prefilter::Prefilter;
pub use rate_limiter::{EscalationLimiter, EscalationWindow, WindowEntry};
