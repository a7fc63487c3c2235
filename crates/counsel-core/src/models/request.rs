use serde::{Deserialize, Serialize};

use super::SourceKind;
use crate::text;

/// Keys probed, in order, when extracting an input hint from tool input.
const INPUT_HINT_KEYS: &[&str] = &[
    "file_path",
    "path",
    "command",
    "pattern",
    "url",
    "query",
    "notebook_path",
];

/// Maximum characters kept from the input hint.
const INPUT_HINT_MAX_CHARS: usize = 160;

/// Caller-controlled switches for one advice call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceFlags {
    /// Explicit high-risk marker. Exempts the call from the escalation rate cap.
    pub high_risk: bool,
    /// Skip the advice cache for this call.
    pub bypass_cache: bool,
    /// Override the configured maximum number of returned items.
    pub max_items: Option<usize>,
    /// Sources to leave out of this call.
    pub exclude_sources: Vec<SourceKind>,
}

/// An `advise()` call as received from the agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdviceRequest {
    pub tool: String,
    #[serde(default)]
    pub input: serde_json::Value,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub flags: AdviceFlags,
}

impl AdviceRequest {
    pub fn new(tool: impl Into<String>, input: serde_json::Value, context: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            input,
            context: context.into(),
            trace_id: None,
            flags: AdviceFlags::default(),
        }
    }

    pub fn with_trace(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_flags(mut self, flags: AdviceFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Short, stable description of the tool input (file path, command, ...).
    pub fn input_hint(&self) -> String {
        let raw = match &self.input {
            serde_json::Value::Object(map) => INPUT_HINT_KEYS
                .iter()
                .find_map(|k| map.get(*k).and_then(|v| v.as_str()))
                .unwrap_or_default()
                .to_string(),
            serde_json::Value::String(s) => s.clone(),
            _ => String::new(),
        };
        text::truncate_chars(&text::normalize_whitespace(&raw), INPUT_HINT_MAX_CHARS)
    }
}

/// What a source adapter sees for one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceQuery {
    pub tool: String,
    pub context: String,
    pub input_hint: String,
    /// Domain of the query itself, when a classifier recognised one.
    pub domain: Option<String>,
    pub high_risk: bool,
    pub trace_id: Option<String>,
}

impl AdviceQuery {
    pub fn from_request(request: &AdviceRequest, domain: Option<String>) -> Self {
        Self {
            tool: request.tool.trim().to_string(),
            context: text::normalize_whitespace(&request.context),
            input_hint: request.input_hint(),
            domain,
            high_risk: request.flags.high_risk,
            trace_id: request.trace_id.clone(),
        }
    }

    /// Free text used for lexical and semantic matching.
    pub fn search_text(&self) -> String {
        [self.tool.as_str(), self.context.as_str(), self.input_hint.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}
