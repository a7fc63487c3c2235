use std::fmt;

use serde::{Deserialize, Serialize};

use super::SourceKind;
use crate::constants::ADVICE_ID_HEX_LEN;
use crate::text;

/// Deterministic identifier of a piece of advice.
///
/// Derived from the source class plus the insight key when one exists, so the
/// id survives text edits and process restarts. Keyless advice hashes its
/// normalized text instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdviceId(String);

impl AdviceId {
    pub fn derive(source: SourceKind, insight_key: Option<&str>, text: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"counsel-advice:v1|");
        hasher.update(source.as_str().as_bytes());
        match insight_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => {
                hasher.update(b"|key:");
                hasher.update(key.as_bytes());
            }
            None => {
                hasher.update(b"|text:");
                hasher.update(text::normalize_whitespace(&text.to_lowercase()).as_bytes());
            }
        }
        let hex = hasher.finalize().to_hex();
        Self(format!("adv_{}", &hex.as_str()[..ADVICE_ID_HEX_LEN]))
    }

    /// Wrap an id read back from persisted state.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One ranked candidate returned by a retrieval call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAdvice {
    pub advice_id: AdviceId,
    pub insight_key: Option<String>,
    pub text: String,
    /// Stored confidence of the underlying learning, [0.0, 1.0].
    pub confidence: f64,
    pub source: SourceKind,
    /// How well the learning matches the current query, [0.0, 1.0].
    pub context_match: f64,
    pub rationale: String,
    /// Domain tag used by the cross-domain guard.
    pub domain: Option<String>,
    /// Composite ranking score, filled in by the ranking engine.
    pub score: f64,
}

impl CandidateAdvice {
    pub fn new(
        source: SourceKind,
        insight_key: Option<String>,
        text: impl Into<String>,
        confidence: f64,
        context_match: f64,
    ) -> Self {
        let text = text.into();
        let advice_id = AdviceId::derive(source, insight_key.as_deref(), &text);
        Self {
            advice_id,
            insight_key,
            text,
            confidence: clamp_unit(confidence),
            source,
            context_match: clamp_unit(context_match),
            rationale: String::new(),
            domain: None,
            score: 0.0,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn with_domain(mut self, domain: Option<String>) -> Self {
        self.domain = domain.filter(|d| !d.trim().is_empty());
        self
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_stable_for_same_key_even_if_text_changes() {
        let a = AdviceId::derive(SourceKind::Corpus, Some("insight:42"), "old wording");
        let b = AdviceId::derive(SourceKind::Corpus, Some("insight:42"), "new wording");
        assert_eq!(a, b);
    }

    #[test]
    fn source_class_participates_in_id() {
        let a = AdviceId::derive(SourceKind::Corpus, Some("k"), "x");
        let b = AdviceId::derive(SourceKind::Session, Some("k"), "x");
        assert_ne!(a, b);
    }

    #[test]
    fn keyless_ids_ignore_whitespace_and_case() {
        let a = AdviceId::derive(SourceKind::Session, None, "Run  tests first");
        let b = AdviceId::derive(SourceKind::Session, None, "run tests   first");
        assert_eq!(a, b);
    }

    #[test]
    fn candidate_clamps_scores() {
        let c = CandidateAdvice::new(SourceKind::Corpus, None, "x", 1.7, -0.2);
        assert_eq!(c.confidence, 1.0);
        assert_eq!(c.context_match, 0.0);
    }
}
