use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A durable learning stored in the insight corpus.
///
/// The advisory core only reads and writes the scalar fields; the corpus owns
/// everything else about the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub key: String,
    pub category: String,
    pub text: String,
    pub confidence: f64,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub times_retrieved: u64,
    #[serde(default)]
    pub times_helpful: u64,
    #[serde(default)]
    pub times_unhelpful: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Insight {
    pub fn new(
        key: impl Into<String>,
        category: impl Into<String>,
        text: impl Into<String>,
        confidence: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            category: category.into(),
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
            evidence: Vec::new(),
            domain: None,
            times_retrieved: 0,
            times_helpful: 0,
            times_unhelpful: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Observed helpfulness with a neutral prior until two outcomes exist.
    pub fn reliability(&self) -> f64 {
        let total = self.times_helpful + self.times_unhelpful;
        if total < 2 {
            return 0.5;
        }
        self.times_helpful as f64 / total as f64
    }

    /// Merge a concurrently written copy of the same insight.
    ///
    /// Counters only move forward; text fields follow the newer `updated_at`.
    pub fn merge(&self, other: &Insight) -> Insight {
        let (newer, older) = if other.updated_at > self.updated_at {
            (other, self)
        } else {
            (self, other)
        };
        let mut merged = newer.clone();
        merged.times_retrieved = self.times_retrieved.max(other.times_retrieved);
        merged.times_helpful = self.times_helpful.max(other.times_helpful);
        merged.times_unhelpful = self.times_unhelpful.max(other.times_unhelpful);
        merged.created_at = self.created_at.min(other.created_at);
        if merged.domain.is_none() {
            merged.domain = older.domain.clone();
        }
        for item in &older.evidence {
            if !merged.evidence.contains(item) {
                merged.evidence.push(item.clone());
            }
        }
        merged
    }
}
