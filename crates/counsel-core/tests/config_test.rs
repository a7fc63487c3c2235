use std::fs;

use counsel_core::config::*;
use counsel_core::errors::ConfigError;
use counsel_core::models::{RetrievalMode, SourceKind};

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn defaults_are_balanced_auto() {
    let cfg = CounselConfig::default();
    assert_eq!(cfg.profile, RetrievalProfile::Balanced);
    assert_eq!(cfg.router.mode, RetrievalMode::Auto);
    assert_eq!(cfg.router.deadline_ms, defaults::DEFAULT_ESCALATION_DEADLINE_MS);
    assert_eq!(cfg.attribution.strict_min_samples, 3);
    assert!((cfg.attribution.strict_floor - 0.3).abs() < f64::EPSILON);
    assert_eq!(cfg.quality.quality_threshold, 5);
}

#[test]
fn partial_toml_keeps_other_defaults() {
    let cfg = CounselConfig::from_toml("[router]\nrate_cap = 0.2\n").unwrap();
    assert!((cfg.router.rate_cap - 0.2).abs() < f64::EPSILON);
    assert_eq!(cfg.router.primary_limit, defaults::DEFAULT_PRIMARY_LIMIT);
    assert_eq!(cfg.cache.ttl_secs, defaults::DEFAULT_CACHE_TTL_SECS);
}

#[test]
fn unknown_keys_are_ignored() {
    let cfg = CounselConfig::from_toml(
        "mystery = 1\n[router]\nwarp_drive = true\ndeadline_ms = 900\n[future_section]\nx = 2\n",
    )
    .unwrap();
    assert_eq!(cfg.router.deadline_ms, 900);
}

#[test]
fn out_of_range_values_are_clamped() {
    let mut cfg = CounselConfig::default();
    cfg.router.rate_cap = 1.5;
    cfg.fusion.bm25_k1 = -1.0;
    cfg.ranking.max_items = 0;
    cfg.attribution.strict_floor = f64::NAN;
    let clamped = cfg.sanitize();
    assert_eq!(cfg.router.rate_cap, 1.0);
    assert_eq!(cfg.fusion.bm25_k1, 0.01);
    assert_eq!(cfg.ranking.max_items, 1);
    assert_eq!(cfg.attribution.strict_floor, 0.0);
    assert!(clamped.contains(&"router.rate_cap".to_string()));
    assert!(clamped.contains(&"attribution.strict_floor".to_string()));
    assert_eq!(clamped.len(), 4);
}

#[test]
fn sanitize_is_idempotent() {
    let mut cfg = CounselConfig::from_toml("[router]\nrate_cap = 9.0\n").unwrap();
    assert_eq!(cfg.router.rate_cap, 1.0);
    assert!(cfg.sanitize().is_empty());
}

#[test]
fn needs_work_threshold_never_exceeds_quality_threshold() {
    let cfg = CounselConfig::from_toml(
        "[quality]\nquality_threshold = 3\nneeds_work_threshold = 5\n",
    )
    .unwrap();
    assert_eq!(cfg.quality.needs_work_threshold, 3);
}

#[test]
fn profile_seeds_router_and_explicit_keys_win() {
    let cfg = CounselConfig::from_toml("profile = \"deep\"\n[router]\nmax_facets = 2\n").unwrap();
    assert_eq!(cfg.profile, RetrievalProfile::Deep);
    assert_eq!(cfg.router.mode, RetrievalMode::HybridAgentic);
    assert_eq!(cfg.router.deadline_ms, 2_500);
    assert_eq!(cfg.router.max_facets, 2);

    let fast = CounselConfig::from_toml("profile = \"fast\"").unwrap();
    assert_eq!(fast.router.mode, RetrievalMode::EmbeddingsOnly);
}

#[test]
fn unknown_profile_is_an_error_for_strict_parse() {
    let err = CounselConfig::from_toml("profile = \"turbo\"").unwrap_err();
    assert!(matches!(err, ConfigError::UnknownProfile { .. }));
}

#[test]
fn source_quality_overrides_builtin_table() {
    let cfg = CounselConfig::from_toml("[ranking.source_quality]\nsession = 1.3\n").unwrap();
    assert_eq!(cfg.ranking.source_quality_multiplier(SourceKind::Session), 1.3);
    assert_eq!(cfg.ranking.source_quality_multiplier(SourceKind::ToolCaution), 1.1);
}

#[test]
fn project_layer_beats_user_layer() {
    let dir = tempfile::tempdir().unwrap();
    let user = dir.path().join("user.toml");
    let project = dir.path().join("counsel.toml");
    fs::write(&user, "[router]\nrate_cap = 0.2\ndeadline_ms = 900\n").unwrap();
    fs::write(&project, "[router]\nrate_cap = 0.3\n").unwrap();

    let sources = ConfigSources {
        user: Some(user),
        project: Some(project),
    };
    let loaded = CounselConfig::load_from(&sources, no_env);
    assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);
    assert!((loaded.config.router.rate_cap - 0.3).abs() < f64::EPSILON);
    assert_eq!(loaded.config.router.deadline_ms, 900);
}

#[test]
fn malformed_layer_is_skipped_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let user = dir.path().join("user.toml");
    let project = dir.path().join("counsel.toml");
    fs::write(&user, "[cache]\nttl_secs = 30\n").unwrap();
    fs::write(&project, "this is = = not toml").unwrap();

    let loaded = CounselConfig::load_from(
        &ConfigSources {
            user: Some(user),
            project: Some(project),
        },
        no_env,
    );
    assert_eq!(loaded.warnings.len(), 1);
    assert_eq!(loaded.config.cache.ttl_secs, 30);
}

#[test]
fn wrongly_typed_layer_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("counsel.toml");
    fs::write(&project, "[router]\nrate_cap = \"high\"\n").unwrap();

    let loaded = CounselConfig::load_from(
        &ConfigSources {
            user: None,
            project: Some(project),
        },
        no_env,
    );
    assert!(!loaded.warnings.is_empty());
    assert_eq!(loaded.config.router.rate_cap, defaults::DEFAULT_RATE_CAP);
}

#[test]
fn env_overrides_beat_files_and_are_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("counsel.toml");
    fs::write(&project, "[router]\nmode = \"hybrid_agentic\"\n").unwrap();

    let env = |key: &str| match key {
        "COUNSEL_MODE" => Some("embeddings_only".to_string()),
        "COUNSEL_RATE_CAP" => Some("7".to_string()),
        "COUNSEL_DEADLINE_MS" => Some("soon".to_string()),
        _ => None,
    };
    let loaded = CounselConfig::load_from(
        &ConfigSources {
            user: None,
            project: Some(project),
        },
        env,
    );
    assert_eq!(loaded.config.router.mode, RetrievalMode::EmbeddingsOnly);
    assert_eq!(loaded.config.router.rate_cap, 1.0);
    assert_eq!(
        loaded.config.router.deadline_ms,
        defaults::DEFAULT_ESCALATION_DEADLINE_MS
    );
    assert_eq!(loaded.warnings.len(), 2);
}

#[test]
fn env_profile_applies_before_file_keys() {
    let env = |key: &str| (key == "COUNSEL_PROFILE").then(|| "fast".to_string());
    let loaded = CounselConfig::load_from(&ConfigSources::default(), env);
    assert_eq!(loaded.config.profile, RetrievalProfile::Fast);
    assert_eq!(loaded.config.router.max_facets, 1);
}

#[test]
fn toml_round_trip_preserves_values() {
    let mut cfg = CounselConfig::default();
    cfg.router.rate_cap = 0.25;
    cfg.ranking.source_quality.insert(SourceKind::SkillHint, 0.6);
    let text = cfg.to_toml().unwrap();
    let back = CounselConfig::from_toml(&text).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn watcher_notices_new_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("counsel.toml");
    let mut watcher = ConfigWatcher::new(ConfigSources {
        user: None,
        project: Some(project.clone()),
    });
    assert!(!watcher.changed());
    assert!(watcher.poll().is_none());

    fs::write(&project, "[cache]\nenabled = false\n").unwrap();
    assert!(watcher.changed());
    let loaded = watcher.poll().expect("reload after change");
    assert!(!loaded.config.cache.enabled);
    assert!(watcher.poll().is_none());
}

#[test]
fn config_warnings_are_emitted_at_most_once() {
    let warnings = vec!["quality.quality_threshold clamped to 12".to_string()];
    warn_once(&warnings);
    assert!(!warn_once(&warnings));
    assert!(!warn_once(&[]));
}
