use chrono::{Duration, Utc};
use counsel_core::models::*;
use counsel_core::text;
use counsel_core::traits::{IDomainClassifier, IEffectivenessOracle, IInsightCorpus, KeywordDomainClassifier, NeutralOracle};
use counsel_core::CounselResult;
use std::collections::HashMap;
use std::sync::Mutex;

#[test]
fn source_kind_parses_hyphenated_and_rejects_unknown() {
    assert_eq!("tool-caution".parse::<SourceKind>().unwrap(), SourceKind::ToolCaution);
    assert_eq!("skill_hint".parse::<SourceKind>().unwrap(), SourceKind::SkillHint);
    assert!("rumour".parse::<SourceKind>().is_err());
    for kind in SourceKind::ALL {
        assert_eq!(kind.as_str().parse::<SourceKind>().unwrap(), kind);
    }
}

#[test]
fn outcome_kind_is_closed() {
    assert_eq!("good".parse::<OutcomeKind>().unwrap(), OutcomeKind::Good);
    assert!("great".parse::<OutcomeKind>().is_err());
    assert_eq!(OutcomeKind::from_success(false), OutcomeKind::Bad);
    assert!(!OutcomeKind::Neutral.is_decisive());
    assert_eq!(OutcomeKind::default(), OutcomeKind::Unset);
}

#[test]
fn advice_ids_differ_for_different_keyless_text() {
    let a = AdviceId::derive(SourceKind::Session, None, "run migrations before tests");
    let b = AdviceId::derive(SourceKind::Session, None, "run tests before migrations");
    assert_ne!(a, b);
    assert!(a.as_str().starts_with("adv_"));
}

#[test]
fn numeric_variants_share_a_dedup_hash() {
    assert_eq!(text::dedup_hash("saved 3 files"), text::dedup_hash("saved 7 files"));
    assert_ne!(text::dedup_hash("saved 3 files"), text::dedup_hash("deleted 3 files"));
}

#[test]
fn verdict_rank_orders_quality_highest() {
    assert!(Verdict::Quality.rank() > Verdict::NeedsWork.rank());
    assert!(Verdict::NeedsWork.rank() > Verdict::Primitive.rank());
    assert!(Verdict::Primitive.rank() > Verdict::Duplicate.rank());
    assert!(Verdict::Quality.admits());
    assert!(!Verdict::NeedsWork.admits());
}

#[test]
fn insight_merge_takes_max_counters_and_newest_text() {
    let mut old = Insight::new("k", "wisdom", "old text", 0.6);
    old.times_helpful = 5;
    old.times_retrieved = 9;
    let mut new = old.clone();
    new.text = "new text".into();
    new.times_helpful = 2;
    new.times_unhelpful = 1;
    new.updated_at = old.updated_at + Duration::seconds(5);

    let merged = old.merge(&new);
    assert_eq!(merged.text, "new text");
    assert_eq!(merged.times_helpful, 5);
    assert_eq!(merged.times_unhelpful, 1);
    assert_eq!(merged.times_retrieved, 9);
    assert_eq!(new.merge(&old), merged);
}

#[test]
fn request_hint_and_query_text() {
    let req = AdviceRequest::new(
        "Edit",
        serde_json::json!({"file_path": "src/a.py", "old_string": "x"}),
        "fix bug",
    );
    assert_eq!(req.input_hint(), "src/a.py");
    let q = AdviceQuery::from_request(&req, None);
    assert_eq!(q.search_text(), "Edit fix bug src/a.py");
}

#[test]
fn tool_outcome_rate() {
    let stats = ToolOutcomeStats { good: 1, bad: 3 };
    assert_eq!(stats.total(), 4);
    assert!((stats.bad_rate() - 0.75).abs() < 1e-9);
    assert_eq!(ToolOutcomeStats::default().bad_rate(), 0.0);
}

#[test]
fn neutral_oracle_is_neutral() {
    let o = NeutralOracle;
    assert_eq!(o.insight_effectiveness("any"), InsightEffectiveness::NEUTRAL);
    assert_eq!(o.source_helpfulness(SourceKind::Corpus), 0.5);
}

#[test]
fn keyword_classifier_is_usable_as_trait_object() {
    let c: Box<dyn IDomainClassifier> = Box::new(KeywordDomainClassifier::default());
    assert_eq!(c.classify("docker deploy pipeline").as_deref(), Some("deployment"));
}

#[derive(Default)]
struct MapCorpus(Mutex<HashMap<String, Insight>>);

impl IInsightCorpus for MapCorpus {
    fn get(&self, key: &str) -> CounselResult<Option<Insight>> {
        Ok(self.0.lock().unwrap().get(key).cloned())
    }
    fn set(&self, insight: &Insight) -> CounselResult<()> {
        self.0.lock().unwrap().insert(insight.key.clone(), insight.clone());
        Ok(())
    }
    fn scan(&self) -> CounselResult<Vec<Insight>> {
        Ok(self.0.lock().unwrap().values().cloned().collect())
    }
}

#[test]
fn default_record_outcome_updates_counters() {
    let corpus = MapCorpus::default();
    corpus.set(&Insight::new("k1", "wisdom", "text", 0.7)).unwrap();
    assert!(corpus.record_outcome("k1", OutcomeKind::Good).unwrap());
    assert!(corpus.record_outcome("k1", OutcomeKind::Bad).unwrap());
    assert!(corpus.record_outcome("k1", OutcomeKind::Neutral).unwrap());
    assert!(!corpus.record_outcome("missing", OutcomeKind::Good).unwrap());
    corpus.record_retrieval(&["k1".to_string(), "nope".to_string()]).unwrap();

    let k1 = corpus.get("k1").unwrap().unwrap();
    assert_eq!((k1.times_helpful, k1.times_unhelpful, k1.times_retrieved), (1, 1, 1));
    assert!(k1.updated_at <= Utc::now());
    assert_eq!(corpus.len().unwrap(), 1);
}
