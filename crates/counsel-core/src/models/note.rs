use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text;

/// A short piece of guidance kept by one of the non-corpus sources
/// (session memory, domain chips, distillations, surprises, skill hints).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub key: Option<String>,
    pub text: String,
    pub confidence: f64,
    #[serde(default)]
    pub domain: Option<String>,
    /// Restricts the note to one tool when set.
    #[serde(default)]
    pub tool: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            key: None,
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
            domain: None,
            tool: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    /// Identity used when merging note files: the key, else the normalized text hash.
    pub fn identity(&self) -> String {
        match &self.key {
            Some(k) if !k.trim().is_empty() => format!("key:{k}"),
            _ => format!("text:{}", text::dedup_hash(&self.text)),
        }
    }

    /// Whether the note applies to `tool`. Untagged notes apply everywhere.
    pub fn applies_to_tool(&self, tool: &str) -> bool {
        self.tool
            .as_deref()
            .map_or(true, |t| t.eq_ignore_ascii_case(tool))
    }
}
