//! Advisor: owns every engine and exposes the agent-facing operations.
//!
//! One `Advisor` per process. All state shared with other processes goes
//! through the state directory, so several advisors (hooks, CLIs, the agent
//! itself) can run against the same directory at once.

use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, warn};

use counsel_attribution::counters::normalize_tool;
use counsel_attribution::{
    AdviceGivenRecord, AttributionLedger, EffectivenessReport, OutcomeEvent, RepairReport,
    RetrievalEvent, SourceAttributionReport,
};
use counsel_core::config::defaults::DEFAULT_NOTE_MIN_MATCH;
use counsel_core::config::{warn_once, ConfigSources, ConfigWatcher, CounselConfig};
use counsel_core::errors::{CounselError, CounselResult};
use counsel_core::models::{AdviceRequest, Insight, Note, OutcomeKind, SourceKind};
use counsel_core::traits::{
    IDomainClassifier, IInsightCorpus, ISimilarityProvider, ISourceAdapter,
    KeywordDomainClassifier,
};
use counsel_observability::tracing_setup::events;
use counsel_observability::{
    advise_span, outcome_span, roast_span, Component, DegradationTracker, Outage, RoutingSummary,
};
use counsel_quality::{QualityGate, QualityRate, RoastContext, RoastOutcome};
use counsel_retrieval::adapters::{CorpusAdapter, NoteAdapter, ToolCautionAdapter};
use counsel_retrieval::providers::HttpSimilarityProvider;
use counsel_retrieval::{RankingEngine, RetrievalRouter};
use counsel_storage::{AppendLog, JsonFileCorpus, LockPolicy, NoteStore, SnapshotStore, StateLayout};

use crate::options::AdvisorOptions;
use crate::response::{AdviceResponse, LearnOutcome};

/// Hex characters of the dedup hash used in generated corpus keys.
const LEARNED_KEY_HASH_LEN: usize = 12;


pub struct Advisor {
    config: RwLock<CounselConfig>,
    watcher: Option<Mutex<ConfigWatcher>>,
    layout: StateLayout,
    corpus: Arc<dyn IInsightCorpus>,
    classifier: Arc<dyn IDomainClassifier>,
    router: Arc<RetrievalRouter>,
    tool_caution: Arc<ToolCautionAdapter>,
    note_adapters: Vec<Arc<NoteAdapter>>,
    notes: NoteStore,
    ranking: RankingEngine,
    ledger: Arc<AttributionLedger>,
    quality: QualityGate,
    decision_log: Option<AppendLog>,
    degradations: Mutex<DegradationTracker>,
}

impl Advisor {
    /// Resolve configuration, open the state directory, and wire the engines.
    pub fn open(options: AdvisorOptions) -> CounselResult<Self> {
        let (config, watcher) = match options.config {
            Some(mut config) => {
                warn_once(&config.sanitize());
                (config, None)
            }
            None => {
                let sources = ConfigSources::discover(options.project_root.as_deref());
                let loaded = CounselConfig::load_from(&sources, |key| std::env::var(key).ok());
                warn_once(&loaded.warnings);
                (loaded.config, Some(Mutex::new(ConfigWatcher::new(sources))))
            }
        };
        if options.init_tracing {
            counsel_observability::init_tracing(&config.observability);
        }

        let layout = StateLayout::from_config(&config.storage);
        layout.ensure()?;
        let delay = Duration::from_millis(config.storage.corrupt_retry_delay_ms);
        let mut degradations = DegradationTracker::default();

        let corpus: Arc<dyn IInsightCorpus> = match options.corpus {
            Some(corpus) => corpus,
            None => Arc::new(JsonFileCorpus::open(layout.insights(), delay)?),
        };
        let classifier = options
            .classifier
            .unwrap_or_else(|| {
                Arc::new(KeywordDomainClassifier::default()) as Arc<dyn IDomainClassifier>
            });

        let ledger = Arc::new(
            AttributionLedger::open(&layout, config.attribution.clone(), &config.storage)?
                .with_corpus(Arc::clone(&corpus))
                .with_helpfulness_min(config.ranking.helpfulness_min_followed),
        );

        let mut router = RetrievalRouter::new(config.router.clone(), config.fusion.clone())
            .with_window_store(SnapshotStore::new(layout.router_window(), delay));
        let decision_log = config.observability.decision_log.then(|| {
            AppendLog::new(layout.routing_decisions(), LockPolicy::BestEffort, &config.storage)
        });
        if let Some(log) = &decision_log {
            router = router.with_decision_log(log.clone());
        }
        if let Some(provider) = similarity_provider(options.similarity, &config, &mut degradations) {
            router = router.with_provider(provider);
        }
        let router = Arc::new(router);

        let notes = NoteStore::new(layout.clone(), delay);
        let tool_caution = Arc::new(ToolCautionAdapter::new(
            ledger.clone(),
            config.ranking.clone(),
        ));
        let note_adapters: Vec<Arc<NoteAdapter>> = SourceKind::ALL
            .into_iter()
            .filter(|kind| kind.is_note_source())
            .map(|kind| {
                Arc::new(NoteAdapter::new(
                    kind,
                    notes.clone(),
                    config.fusion.clone(),
                    DEFAULT_NOTE_MIN_MATCH,
                ))
            })
            .collect();

        let mut adapters: Vec<Arc<dyn ISourceAdapter>> = vec![
            Arc::new(CorpusAdapter::new(Arc::clone(&corpus), Arc::clone(&router)))
                as Arc<dyn ISourceAdapter>,
            Arc::clone(&tool_caution) as Arc<dyn ISourceAdapter>,
        ];
        adapters.extend(
            note_adapters
                .iter()
                .map(|a| Arc::clone(a) as Arc<dyn ISourceAdapter>),
        );
        let ranking = RankingEngine::new(
            adapters,
            ledger.clone(),
            Arc::clone(&classifier),
            config.ranking.clone(),
            &config.cache,
        );

        let quality = QualityGate::new(config.quality.clone())
            .with_seen_store(SnapshotStore::new(layout.quality_seen(), delay))
            .with_history_log(
                AppendLog::new(layout.roast_history(), LockPolicy::BestEffort, &config.storage),
                config.storage.log_max_lines,
            );

        debug!(state_dir = %layout.root().display(), profile = %config.profile.as_str(), "advisor opened");
        Ok(Self {
            config: RwLock::new(config),
            watcher,
            layout,
            corpus,
            classifier,
            router,
            tool_caution,
            note_adapters,
            notes,
            ranking,
            ledger,
            quality,
            decision_log,
            degradations: Mutex::new(degradations),
        })
    }

    pub fn config(&self) -> CounselConfig {
        self.config.read().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }

    pub fn ledger(&self) -> &AttributionLedger {
        &self.ledger
    }

    pub fn router(&self) -> &RetrievalRouter {
        &self.router
    }

    pub fn ranking(&self) -> &RankingEngine {
        &self.ranking
    }

    // ── advice ───────────────────────────────────────────────────────────

    /// Ranked advice for a tool call. Never fails: failing sources are
    /// skipped, and a ledger that cannot be written only clears
    /// `attribution_logged`.
    pub fn advise(&self, request: &AdviceRequest) -> AdviceResponse {
        self.serve(request, true)
    }

    /// Text of the top advice for `tool`, or an empty string.
    ///
    /// A peek: nothing is logged as given and no attribution attempt opens,
    /// so quick advice never moves effectiveness counters.
    pub fn get_quick_advice(&self, tool: &str) -> String {
        let request = AdviceRequest::new(tool, serde_json::Value::Null, "");
        self.serve(&request, false)
            .top_text()
            .map(str::to_string)
            .unwrap_or_default()
    }

    fn serve(&self, request: &AdviceRequest, attribute: bool) -> AdviceResponse {
        let _span = advise_span!(request.tool, request.trace_id).entered();
        let started = Instant::now();
        self.reload_if_changed();

        let ranked = self.ranking.advise(request);
        self.track_source_health(&ranked.degraded_sources);
        let attribution_logged =
            attribute && self.log_served(request, &ranked.advice, ranked.cache_hit);

        events::advice_served(
            &request.tool,
            ranked.advice.len(),
            ranked.cache_hit,
            started.elapsed().as_millis() as u64,
        );
        AdviceResponse {
            advice: ranked.advice,
            cache_hit: ranked.cache_hit,
            routing: ranked.routing,
            attribution_logged,
            degraded_sources: ranked.degraded_sources,
        }
    }

    /// Whether `tool` warrants caution, with the reason.
    ///
    /// A failure rate over the caution threshold wins; otherwise the most
    /// confident surprise note tagged with the tool.
    pub fn should_be_careful(&self, tool: &str) -> (bool, String) {
        if let Some((text, _)) = self.tool_caution.caution_for(tool) {
            return (true, text);
        }
        match self.notes.load(SourceKind::Surprise) {
            Ok(notes) => notes
                .into_iter()
                .filter(|n| n.tool.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(tool.trim())))
                .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
                .map_or((false, String::new()), |n| (true, n.text)),
            Err(e) => {
                warn!(tool = %tool, error = %e, "surprise notes unavailable");
                (false, String::new())
            }
        }
    }

    // ── outcomes ─────────────────────────────────────────────────────────

    /// Report how a tool call went. Attributes the outcome to every open
    /// retrieval for `tool` (those under `trace_id` first) and returns how
    /// many were attributed.
    pub fn report_outcome(
        &self,
        tool: &str,
        success: bool,
        trace_id: Option<&str>,
    ) -> CounselResult<usize> {
        let _span = outcome_span!(tool, success).entered();
        self.ledger.record_tool_outcome(tool, success)?;

        let now = Utc::now();
        let outcome = if success { OutcomeKind::Good } else { OutcomeKind::Bad };
        let evidence = format!("{} {}", tool.trim(), if success { "succeeded" } else { "failed" });
        let mut attributed = 0;
        for record in self.ledger.open_retrievals(tool, trace_id, now)? {
            let mut event = OutcomeEvent::new(record.learning_id.clone(), outcome)
                .with_evidence(evidence.clone())
                .at(now);
            if let Some(trace) = trace_id {
                event = event.with_trace(trace);
            }
            if self.ledger.track_outcome(event)?.stale {
                continue;
            }
            self.ledger.mark_followed(&record.learning_id, success)?;
            attributed += 1;
        }

        if !success {
            // Effectiveness and tool caution moved; cached rankings are stale.
            self.ranking.cache().invalidate_all();
        }
        events::outcome_reported(tool, success, attributed);
        Ok(attributed)
    }

    // ── quality ──────────────────────────────────────────────────────────

    pub fn roast(&self, text: &str, ctx: &RoastContext) -> RoastOutcome {
        let _span = roast_span!(ctx.source).entered();
        self.reload_if_changed();
        self.quality.roast(text, ctx)
    }

    /// Roast `text` and store it in the corpus when the verdict is `quality`.
    /// The refined text is stored when refinement ran.
    pub fn learn(&self, text: &str, category: &str, ctx: &RoastContext) -> CounselResult<LearnOutcome> {
        let roast = self.roast(text, ctx);
        if !roast.verdict().admits() {
            return Ok(LearnOutcome {
                roast,
                stored_key: None,
            });
        }

        let category = category.trim();
        let hash_len = roast.dedup_hash.len().min(LEARNED_KEY_HASH_LEN);
        let key = format!("{category}:{}", &roast.dedup_hash[..hash_len]);
        let mut insight = Insight::new(
            key.clone(),
            category,
            roast.text.clone(),
            learned_confidence(&roast, self.quality.config().ethics_enabled),
        );
        if let Some(domain) = self.classifier.classify(&roast.text) {
            insight = insight.with_domain(domain);
        }
        if let Some(trace) = &ctx.trace_id {
            insight.evidence.push(format!("trace:{trace}"));
        }
        self.corpus.set(&insight)?;
        self.ranking.cache().invalidate_all();

        events::learning_stored(&key, category, roast.refined);
        Ok(LearnOutcome {
            roast,
            stored_key: Some(key),
        })
    }

    /// Add a note to one of the note-backed sources.
    pub fn add_note(&self, source: SourceKind, note: Note) -> CounselResult<()> {
        if !source.is_note_source() {
            return Err(CounselError::UnknownKind {
                kind: "note source",
                value: source.as_str().to_string(),
            });
        }
        self.notes.add(source, note)?;
        self.ranking.cache().invalidate_all();
        Ok(())
    }

    // ── reports ──────────────────────────────────────────────────────────

    pub fn get_effectiveness_report(&self) -> EffectivenessReport {
        if let Err(e) = self.ledger.refresh() {
            warn!(error = %e, "ledger refresh failed, reporting in-memory state");
        }
        self.ledger.get_effectiveness_report()
    }

    /// Attribution by source over the `limit` most recent records. `window_secs`
    /// overrides the strict window; `require_trace` demands a trace match for
    /// the strict bucket.
    pub fn get_source_attribution(
        &self,
        limit: usize,
        window_secs: Option<u64>,
        require_trace: bool,
    ) -> SourceAttributionReport {
        if let Err(e) = self.ledger.refresh() {
            warn!(error = %e, "ledger refresh failed, reporting in-memory state");
        }
        self.ledger.get_source_attribution(limit, window_secs, require_trace)
    }

    /// Summary of the last `n` routing decisions. Empty when the decision
    /// log is disabled.
    pub fn routing_summary(&self, n: usize) -> CounselResult<RoutingSummary> {
        match &self.decision_log {
            Some(log) => Ok(counsel_observability::summarize_log(log, n)?),
            None => Ok(RoutingSummary::default()),
        }
    }

    pub fn quality_rate(&self) -> QualityRate {
        self.quality.quality_rate()
    }

    pub fn active_degradations(&self) -> Vec<Outage> {
        self.degradations
            .lock()
            .map(|t| t.active())
            .unwrap_or_default()
    }

    // ── maintenance ──────────────────────────────────────────────────────

    /// Repair counters and the ledger. Idempotent.
    pub fn repair(&self) -> CounselResult<RepairReport> {
        let report = self.ledger.repair()?;
        events::repair_completed(
            report.counters.sources_clamped.len(),
            report.records_repaired,
            report.records_evicted,
        );
        Ok(report)
    }

    /// Swap in a new configuration. Storage and observability settings take
    /// effect on the next `open`.
    pub fn reload(&self, mut config: CounselConfig) {
        let clamped = config.sanitize();
        warn_once(&clamped);
        self.apply(config, clamped.len());
    }

    fn reload_if_changed(&self) {
        let Some(watcher) = &self.watcher else {
            return;
        };
        let polled = match watcher.lock() {
            Ok(mut w) => w.poll(),
            Err(_) => None,
        };
        if let Some(loaded) = polled {
            warn_once(&loaded.warnings);
            self.apply(loaded.config, loaded.warnings.len());
        }
    }

    fn apply(&self, config: CounselConfig, warnings: usize) {
        self.router.reload(config.router.clone(), config.fusion.clone());
        self.ranking.reload(config.ranking.clone(), &config.cache);
        self.tool_caution.reload(config.ranking.clone());
        for adapter in &self.note_adapters {
            adapter.reload(config.fusion.clone());
        }
        self.quality.reload(config.quality.clone());
        self.ledger.reload(
            config.attribution.clone(),
            config.ranking.helpfulness_min_followed,
        );
        self.ranking.cache().invalidate_all();

        events::config_reloaded(config.profile.as_str(), warnings);
        if let Ok(mut current) = self.config.write() {
            *current = config;
        }
    }

    // ── internals ────────────────────────────────────────────────────────

    fn track_source_health(&self, degraded: &[String]) {
        if let Ok(mut tracker) = self.degradations.lock() {
            tracker.observe_sources(degraded);
        }
    }

    fn degrade(&self, component: Component, failure: String, fallback: &str) {
        if let Ok(mut tracker) = self.degradations.lock() {
            tracker.fail(component, failure, fallback);
        }
    }

    fn recover(&self, component: Component) {
        if let Ok(mut tracker) = self.degradations.lock() {
            tracker.recover(component);
        }
    }

    /// Start attribution attempts for served advice and log it as given.
    /// Cache hits are served advice too. Returns whether the ledger took it.
    fn log_served(
        &self,
        request: &AdviceRequest,
        advice: &[counsel_core::models::CandidateAdvice],
        cache_hit: bool,
    ) -> bool {
        if advice.is_empty() {
            return true;
        }
        let now = Utc::now();
        let tool = normalize_tool(&request.tool);

        let retrievals: Vec<RetrievalEvent> = advice
            .iter()
            .map(|a| RetrievalEvent {
                learning_id: a.advice_id.to_string(),
                content: a.text.clone(),
                insight_key: a.insight_key.clone(),
                source: Some(a.source),
                trace_id: request.trace_id.clone(),
                tool: Some(tool.clone()),
                at: Some(now),
            })
            .collect();
        let given: Vec<AdviceGivenRecord> = advice
            .iter()
            .map(|a| AdviceGivenRecord {
                at: now,
                advice_id: a.advice_id.to_string(),
                source: a.source,
                insight_key: a.insight_key.clone(),
                tool: tool.clone(),
                trace_id: request.trace_id.clone(),
                cache_hit,
            })
            .collect();

        let logged = self
            .ledger
            .log_advice_given(&given)
            .and_then(|()| self.ledger.track_retrievals(&retrievals));
        let logged = match logged {
            Ok(()) => {
                self.recover(Component::Attribution);
                true
            }
            Err(e) => {
                self.degrade(Component::Attribution, e.to_string(), "advice served unattributed");
                false
            }
        };

        let keys: Vec<String> = advice
            .iter()
            .filter(|a| a.source == SourceKind::Corpus)
            .filter_map(|a| a.insight_key.clone())
            .collect();
        if !keys.is_empty() {
            match self.corpus.record_retrieval(&keys) {
                Ok(()) => self.recover(Component::Corpus),
                Err(e) => self.degrade(Component::Corpus, e.to_string(), "retrieval counts not updated"),
            }
        }
        logged
    }
}

/// The provider passed in, else the HTTP provider when a URL is configured.
fn similarity_provider(
    explicit: Option<Arc<dyn ISimilarityProvider>>,
    config: &CounselConfig,
    degradations: &mut DegradationTracker,
) -> Option<Arc<dyn ISimilarityProvider>> {
    if explicit.is_some() {
        return explicit;
    }
    let url = config.router.similarity_url.as_deref()?;
    let timeout = Duration::from_millis(config.router.similarity_timeout_ms);
    match HttpSimilarityProvider::new(url, timeout) {
        Ok(provider) => Some(Arc::new(provider) as Arc<dyn ISimilarityProvider>),
        Err(e) => {
            degradations.fail(Component::Similarity, e.to_string(), "lexical retrieval only");
            None
        }
    }
}

/// Stored confidence of a learned insight: its quality total over the maximum.
fn learned_confidence(roast: &RoastOutcome, ethics_enabled: bool) -> f64 {
    let dimensions: u32 = if ethics_enabled { 6 } else { 5 };
    (f64::from(roast.score.total) / f64::from(dimensions * 2)).clamp(0.0, 1.0)
}
