use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use counsel_storage::Mergeable;

/// One routing call. `escalated` marks a capped escalation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowEntry {
    pub id: String,
    pub at: DateTime<Utc>,
    pub escalated: bool,
}

/// Persisted tail of recent routing calls, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EscalationWindow {
    #[serde(default)]
    pub recent: VecDeque<WindowEntry>,
    /// Calls kept. Zero defers to the other side of a merge.
    #[serde(default)]
    pub capacity: usize,
}

impl EscalationWindow {
    fn trim(&mut self) {
        if self.capacity == 0 {
            return;
        }
        while self.recent.len() > self.capacity {
            self.recent.pop_front();
        }
    }
}

impl Mergeable for EscalationWindow {
    /// Union of both processes' calls by id, in time order, trimmed to capacity.
    fn merge(local: &Self, remote: &Self) -> Self {
        let mut by_id: BTreeMap<&str, &WindowEntry> = BTreeMap::new();
        for entry in remote.recent.iter().chain(&local.recent) {
            by_id.insert(entry.id.as_str(), entry);
        }
        let mut entries: Vec<WindowEntry> = by_id.into_values().cloned().collect();
        entries.sort_by(|a, b| a.at.cmp(&b.at).then_with(|| a.id.cmp(&b.id)));
        let capacity = if local.capacity > 0 {
            local.capacity
        } else {
            remote.capacity
        };
        let mut merged = EscalationWindow {
            recent: entries.into(),
            capacity,
        };
        merged.trim();
        merged
    }
}

/// Rolling escalation-rate cap over the last `size` calls.
///
/// An escalation is allowed only if, counting it, no window of `size`
/// consecutive calls holds more than `floor(cap * size)` escalations.
#[derive(Debug, Clone)]
pub struct EscalationLimiter {
    window: EscalationWindow,
    cap: f64,
}

impl EscalationLimiter {
    pub fn new(size: usize, cap: f64) -> Self {
        Self::from_window(EscalationWindow::default(), size, cap)
    }

    pub fn from_window(mut window: EscalationWindow, size: usize, cap: f64) -> Self {
        window.capacity = size.max(1);
        window.trim();
        Self { window, cap }
    }

    pub fn reload(&mut self, size: usize, cap: f64) {
        self.window.capacity = size.max(1);
        self.cap = cap;
        self.window.trim();
    }

    fn size(&self) -> usize {
        self.window.capacity
    }

    /// Escalations permitted per full window.
    pub fn budget(&self) -> usize {
        (self.cap.clamp(0.0, 1.0) * self.size() as f64 + 1e-9).floor() as usize
    }

    pub fn allows(&self) -> bool {
        let lookback = self.size() - 1;
        let skip = self.window.recent.len().saturating_sub(lookback);
        let recent = self
            .window
            .recent
            .iter()
            .skip(skip)
            .filter(|e| e.escalated)
            .count();
        recent < self.budget()
    }

    /// Record one call. Exempt escalations are recorded as not escalated.
    pub fn record(&mut self, counted_escalation: bool) {
        self.window.recent.push_back(WindowEntry {
            id: uuid::Uuid::new_v4().simple().to_string(),
            at: Utc::now(),
            escalated: counted_escalation,
        });
        self.window.trim();
    }

    /// Fraction of capped escalations in the current window.
    pub fn rate(&self) -> f64 {
        if self.window.recent.is_empty() {
            return 0.0;
        }
        let n = self.window.recent.iter().filter(|e| e.escalated).count();
        n as f64 / self.window.recent.len() as f64
    }

    pub fn window(&self) -> &EscalationWindow {
        &self.window
    }

    /// Fold in calls another process recorded.
    pub fn absorb(&mut self, remote: &EscalationWindow) {
        self.window = EscalationWindow::merge(&self.window, remote);
    }
}
