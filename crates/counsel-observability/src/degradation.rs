//! Outages of the advisor's collaborators.
//!
//! Each component has at most one open outage. Repeated failures while it is
//! open only bump its counter; recovery closes it into a bounded history.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use counsel_core::models::SourceKind;

use crate::tracing_setup::events;

/// Collaborators the advisor keeps serving without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// One advice source adapter.
    Source(SourceKind),
    /// Ledger writes and the given-log.
    Attribution,
    /// Retrieval-count updates on the insight corpus.
    Corpus,
    /// The external similarity provider.
    Similarity,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(kind) => write!(f, "source:{kind}"),
            Self::Attribution => f.write_str("attribution_ledger"),
            Self::Corpus => f.write_str("insight_corpus"),
            Self::Similarity => f.write_str("similarity_provider"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outage {
    pub component: Component,
    /// Most recent failure message.
    pub failure: String,
    /// What the advisor did instead.
    pub fallback: String,
    pub since: DateTime<Utc>,
    pub failures: u32,
    pub recovered_at: Option<DateTime<Utc>>,
}

impl Outage {
    pub fn is_open(&self) -> bool {
        self.recovered_at.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct DegradationTracker {
    open: BTreeMap<Component, Outage>,
    closed: VecDeque<Outage>,
    max_closed: usize,
}

impl Default for DegradationTracker {
    fn default() -> Self {
        Self::with_history(256)
    }
}

impl DegradationTracker {
    pub fn with_history(max_closed: usize) -> Self {
        Self {
            open: BTreeMap::new(),
            closed: VecDeque::new(),
            max_closed: max_closed.max(1),
        }
    }

    /// Note a failure of `component`. Returns `true` when this opened a new outage.
    pub fn fail(&mut self, component: Component, failure: impl Into<String>, fallback: &str) -> bool {
        let failure = failure.into();
        if let Some(outage) = self.open.get_mut(&component) {
            outage.failures = outage.failures.saturating_add(1);
            outage.failure = failure;
            tracing::debug!(component = %component, failures = outage.failures, "still degraded");
            return false;
        }
        events::degradation_triggered(&component.to_string(), &failure, fallback);
        self.open.insert(
            component,
            Outage {
                component,
                failure,
                fallback: fallback.to_string(),
                since: Utc::now(),
                failures: 1,
                recovered_at: None,
            },
        );
        true
    }

    /// Close the open outage of `component`, if any.
    pub fn recover(&mut self, component: Component) -> Option<&Outage> {
        let mut outage = self.open.remove(&component)?;
        outage.recovered_at = Some(Utc::now());
        events::degradation_recovered(&component.to_string());
        if self.closed.len() == self.max_closed {
            self.closed.pop_front();
        }
        self.closed.push_back(outage);
        self.closed.back()
    }

    /// Reconcile source outages with the sources that failed on the last call.
    pub fn observe_sources(&mut self, failed: &[String]) {
        for kind in SourceKind::ALL {
            let component = Component::Source(kind);
            if failed.iter().any(|f| f == kind.as_str()) {
                self.fail(component, "source failed", "source skipped");
            } else {
                self.recover(component);
            }
        }
    }

    pub fn is_degraded(&self, component: Component) -> bool {
        self.open.contains_key(&component)
    }

    /// Open outages, oldest first.
    pub fn active(&self) -> Vec<Outage> {
        let mut active: Vec<Outage> = self.open.values().cloned().collect();
        active.sort_by_key(|o| o.since);
        active
    }

    /// Recovered outages, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Outage> {
        self.closed.iter()
    }
}
