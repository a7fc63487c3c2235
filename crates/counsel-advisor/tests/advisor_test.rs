//! Facade tests: end-to-end advise → outcome → effectiveness, learning,
//! caution, routing policy, and hot reload against a temp state directory.

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use counsel_advisor::{Advisor, AdvisorOptions};
use counsel_core::config::{CounselConfig, StorageConfig};
use counsel_core::models::{
    AdviceFlags, AdviceRequest, Insight, Note, RetrievalMode, SourceKind, Verdict,
};
use counsel_core::traits::IInsightCorpus;
use counsel_observability::Component;
use counsel_quality::RoastContext;
use counsel_storage::{AppendLog, InMemoryCorpus, LockPolicy};

fn corpus() -> Arc<InMemoryCorpus> {
    Arc::new(InMemoryCorpus::with_insights(
        test_fixtures::seed_corpus().into_iter().map(|s| {
            let i = Insight::new(s.key, s.category, s.text, s.confidence);
            match s.domain {
                Some(d) => i.with_domain(d),
                None => i,
            }
        }),
    ))
}

fn config(dir: &TempDir) -> CounselConfig {
    CounselConfig {
        storage: StorageConfig {
            state_dir: Some(dir.path().to_path_buf()),
            corrupt_retry_delay_ms: 1,
            ..StorageConfig::default()
        },
        ..CounselConfig::default()
    }
}

fn open_with(config: CounselConfig, corpus: Arc<InMemoryCorpus>) -> Advisor {
    Advisor::open(AdvisorOptions::with_config(config).corpus(corpus)).unwrap()
}

fn open(dir: &TempDir) -> (Advisor, Arc<InMemoryCorpus>) {
    let corpus = corpus();
    (open_with(config(dir), Arc::clone(&corpus)), corpus)
}

fn edit_request() -> AdviceRequest {
    AdviceRequest::new("Edit", json!({"file_path": "a.py"}), "fix bug")
}

fn add_edit_note(advisor: &Advisor) {
    advisor
        .add_note(
            SourceKind::Session,
            Note::new(
                "Before you fix a bug in a.py, rerun the failing test because the fix may hide the cause.",
                0.9,
            )
            .with_key("session:fix-bug-rerun")
            .with_tool("Edit"),
        )
        .unwrap();
}

#[test]
fn roast_separates_quality_from_telemetry() {
    let dir = TempDir::new().unwrap();
    let (advisor, _) = open(&dir);
    let ctx = RoastContext::default();

    let good = advisor.roast("User prefers dark theme because it reduces eye strain", &ctx);
    assert_eq!(good.verdict(), Verdict::Quality);
    let telemetry = advisor.roast("Read task succeeded with Read tool", &ctx);
    assert_eq!(telemetry.verdict(), Verdict::Primitive);
}

#[test]
fn cached_advice_still_logs_each_retrieval() {
    let dir = TempDir::new().unwrap();
    let (advisor, _) = open(&dir);
    add_edit_note(&advisor);

    let first = advisor.advise(&edit_request());
    let second = advisor.advise(&edit_request());

    assert!(!first.advice.is_empty());
    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(first.advice, second.advice);
    assert!(first.attribution_logged && second.attribution_logged);

    for item in &first.advice {
        let record = advisor.ledger().record(item.advice_id.as_str()).unwrap();
        assert_eq!(record.retrieval_count, 2);
        assert_eq!(record.tool.as_deref(), Some("edit"));
    }
    let given = AppendLog::new(
        advisor.layout().advice_given(),
        LockPolicy::BestEffort,
        &advisor.config().storage,
    );
    let lines = given.tail_lines(100).unwrap();
    assert_eq!(lines.len(), first.advice.len() * 2);
}

#[test]
fn embeddings_only_never_escalates_even_when_high_risk() {
    let dir = TempDir::new().unwrap();
    let mut cfg = config(&dir);
    cfg.router.mode = RetrievalMode::EmbeddingsOnly;
    let advisor = open_with(cfg, corpus());

    let request = AdviceRequest::new(
        "Bash",
        json!({"command": "./deploy.sh"}),
        "compare the deploy health check versus the rollback plan and then migrate the database schema",
    )
    .with_flags(AdviceFlags {
        high_risk: true,
        ..AdviceFlags::default()
    });
    let response = advisor.advise(&request);

    let routing = response.routing.expect("corpus adapter ran");
    assert!(!routing.escalated);
    assert_eq!(routing.facets_run, 0);

    let summary = advisor.routing_summary(10).unwrap();
    assert_eq!(summary.count, 1);
    assert_eq!(summary.escalated, 0);
}

#[test]
fn outcome_is_attributed_once_per_retrieval() {
    let dir = TempDir::new().unwrap();
    let (advisor, _) = open(&dir);
    add_edit_note(&advisor);

    let response = advisor.advise(&edit_request().with_trace("trace-1"));
    let served = response.advice.len();
    assert!(served > 0);

    assert_eq!(advisor.report_outcome("Edit", true, Some("trace-1")).unwrap(), served);
    assert_eq!(advisor.report_outcome("Edit", true, Some("trace-1")).unwrap(), 0);

    let report = advisor.get_effectiveness_report();
    assert_eq!(report.totals.given, served as u64);
    assert_eq!(report.totals.followed, served as u64);
    assert_eq!(report.totals.helpful, served as u64);
    assert_eq!(report.open_records, 0);

    let attribution = advisor.get_source_attribution(50, None, true);
    let session = attribution
        .sources
        .iter()
        .find(|s| s.source == "session")
        .unwrap();
    assert_eq!((session.strict_acted_on, session.strict_good), (1, 1));
}

#[test]
fn repeated_failures_make_a_tool_risky() {
    let dir = TempDir::new().unwrap();
    let (advisor, _) = open(&dir);
    assert_eq!(advisor.should_be_careful("Bash"), (false, String::new()));

    for _ in 0..3 {
        advisor.report_outcome("Bash", false, None).unwrap();
    }
    let (careful, reason) = advisor.should_be_careful("Bash");
    assert!(careful);
    assert!(reason.contains("failed 3 of its last 3"));

    let quick = advisor.get_quick_advice("Bash");
    assert!(!quick.is_empty());
}

#[test]
fn surprise_notes_flag_a_tool() {
    let dir = TempDir::new().unwrap();
    let (advisor, _) = open(&dir);
    advisor
        .add_note(
            SourceKind::Surprise,
            Note::new("WebFetch returned a cached page last time; verify the timestamp.", 0.8)
                .with_tool("WebFetch"),
        )
        .unwrap();

    let (careful, reason) = advisor.should_be_careful("webfetch");
    assert!(careful);
    assert!(reason.contains("cached page"));
    assert!(!advisor.should_be_careful("Read").0);
}

#[test]
fn notes_only_go_to_note_sources() {
    let dir = TempDir::new().unwrap();
    let (advisor, _) = open(&dir);
    assert!(advisor
        .add_note(SourceKind::Corpus, Note::new("not a note source", 0.5))
        .is_err());
}

#[test]
fn learn_stores_quality_text_only() {
    let dir = TempDir::new().unwrap();
    let (advisor, corpus) = open(&dir);
    let before = corpus.len().unwrap();
    let ctx = RoastContext::traced("trace-learn");

    let stored = advisor
        .learn(
            "Run the linter before committing because CI rejects lint errors",
            "workflow",
            &ctx,
        )
        .unwrap();
    let key = stored.stored_key.expect("quality learning stored");
    assert!(key.starts_with("workflow:"));
    let insight = corpus.get(&key).unwrap().unwrap();
    assert_eq!(insight.text, stored.roast.text);
    assert!(insight.confidence > 0.0);

    let rejected = advisor
        .learn("Read task succeeded with Read tool", "workflow", &ctx)
        .unwrap();
    assert!(rejected.stored_key.is_none());
    assert_eq!(corpus.len().unwrap(), before + 1);
}

#[test]
fn reload_reaches_the_quality_gate() {
    let dir = TempDir::new().unwrap();
    let (advisor, _) = open(&dir);
    let ctx = RoastContext::default();
    assert_eq!(
        advisor
            .roast("User prefers dark theme because it reduces eye strain", &ctx)
            .verdict(),
        Verdict::Quality
    );

    let mut cfg = advisor.config();
    cfg.quality.quality_threshold = 12;
    advisor.reload(cfg);

    assert_eq!(advisor.config().quality.quality_threshold, 12);
    let after = advisor.roast("Run the linter before committing because CI rejects lint errors", &ctx);
    assert_ne!(after.verdict(), Verdict::Quality);
}

#[test]
fn repair_is_idempotent_through_the_facade() {
    let dir = TempDir::new().unwrap();
    let (advisor, _) = open(&dir);
    add_edit_note(&advisor);
    advisor.advise(&edit_request());
    advisor.report_outcome("Edit", false, None).unwrap();

    advisor.repair().unwrap();
    assert!(advisor.repair().unwrap().is_clean());
}

#[test]
fn two_advisors_share_one_state_directory() {
    let dir = TempDir::new().unwrap();
    let (a, _) = open(&dir);
    add_edit_note(&a);
    let served = a.advise(&edit_request().with_trace("shared")).advice.len();
    assert!(served > 0);

    let (b, _) = open(&dir);
    assert_eq!(b.report_outcome("Edit", true, Some("shared")).unwrap(), served);
    assert_eq!(a.report_outcome("Edit", true, Some("shared")).unwrap(), 0);
}

#[test]
fn keyless_note_is_suppressed_after_repeated_strict_failures() {
    let dir = TempDir::new().unwrap();
    let mut cfg = config(&dir);
    cfg.ranking.min_rank_score = 0.0;
    let advisor = open_with(cfg, corpus());
    let text = "Before you fix a bug in a.py, rerun the failing test because the fix may hide the cause.";
    advisor
        .add_note(SourceKind::Session, Note::new(text, 0.9).with_tool("Edit"))
        .unwrap();

    let mut advice_id = None;
    for i in 0..3 {
        let trace = format!("keyless-{i}");
        let response = advisor.advise(&edit_request().with_trace(trace.as_str()));
        let note = response
            .advice
            .iter()
            .find(|a| a.text == text)
            .expect("note served until suppressed");
        assert!(note.insight_key.is_none());
        advice_id = Some(note.advice_id.to_string());
        advisor.report_outcome("Edit", false, Some(trace.as_str())).unwrap();
    }

    let advice_id = advice_id.unwrap();
    let state = advisor.ledger().promotion_state(&advice_id).unwrap();
    assert_eq!(state.strict_bad, 3);
    assert!(advisor.ledger().get_insight_effectiveness(&advice_id).suppressed);

    let after = advisor.advise(&edit_request().with_trace("keyless-after"));
    assert!(after.advice.iter().all(|a| a.text != text));
}

#[test]
fn held_given_log_leaves_nothing_to_follow() {
    let dir = TempDir::new().unwrap();
    let mut cfg = config(&dir);
    cfg.storage.lock_retries = 1;
    cfg.storage.lock_retry_delay_ms = 1;
    let advisor = open_with(cfg, corpus());
    add_edit_note(&advisor);

    let holder_file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(advisor.layout().advice_given())
        .unwrap();
    let mut holder = fd_lock::RwLock::new(holder_file);
    let guard = holder.write().unwrap();

    let response = advisor.advise(&edit_request().with_trace("locked"));
    assert!(!response.advice.is_empty());
    assert!(!response.attribution_logged);
    for item in &response.advice {
        assert!(advisor.ledger().record(item.advice_id.as_str()).is_none());
    }
    drop(guard);

    assert_eq!(advisor.report_outcome("Edit", true, Some("locked")).unwrap(), 0);
    let totals = advisor.ledger().counters().totals();
    assert_eq!((totals.given, totals.followed, totals.helpful), (0, 0, 0));
    assert!(advisor
        .active_degradations()
        .iter()
        .any(|o| o.component == Component::Attribution));

    assert!(advisor.advise(&edit_request().with_trace("unlocked")).attribution_logged);
    assert!(advisor.active_degradations().is_empty());
}

#[test]
fn clamped_config_warns_once_across_advisors() {
    let dir = TempDir::new().unwrap();
    let mut cfg = config(&dir);
    cfg.quality.quality_threshold = 99;

    let a = open_with(cfg.clone(), corpus());
    let b = open_with(cfg, corpus());
    assert_eq!(a.config().quality.quality_threshold, 12);
    assert_eq!(b.config().quality.quality_threshold, 12);
    assert!(!counsel_core::config::warn_once(&["quality.quality_threshold".to_string()]));
}

#[test]
fn quick_advice_opens_no_attribution() {
    let dir = TempDir::new().unwrap();
    let (advisor, _) = open(&dir);
    for _ in 0..3 {
        advisor.report_outcome("Bash", false, None).unwrap();
    }

    assert!(!advisor.get_quick_advice("Bash").is_empty());
    assert_eq!(advisor.ledger().record_count(), 0);
    assert_eq!(advisor.ledger().counters().totals().given, 0);
}
