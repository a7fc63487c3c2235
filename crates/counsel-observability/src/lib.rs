//! # counsel-observability
//!
//! Structured tracing setup with span macros and event helpers, degradation
//! tracking for collaborator failures, and summaries over the routing
//! decision log.

pub mod degradation;
pub mod routing_summary;
pub mod tracing_setup;

pub use degradation::{Component, DegradationTracker, Outage};
pub use routing_summary::{summarize_decisions, summarize_log, RoutingSummary};
pub use tracing_setup::{init_json_tracing, init_tracing, init_tracing_with_filter};
