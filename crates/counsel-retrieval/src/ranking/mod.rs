pub mod actionability;
pub mod composite;
pub mod dedup;
pub mod domain_guard;

pub use actionability::actionability;
pub use composite::{composite_score, CompositeInputs};
pub use dedup::dedupe;
