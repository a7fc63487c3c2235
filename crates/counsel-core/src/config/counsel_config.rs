//! Top-level configuration with layered resolution.

use std::path::{Path, PathBuf};
use std::sync::Once;

use serde::{Deserialize, Serialize};

use super::{
    AttributionConfig, CacheConfig, FusionConfig, ObservabilityConfig, QualityConfig,
    RankingConfig, RetrievalProfile, RouterConfig, StorageConfig,
};
use crate::errors::ConfigError;

static CONFIG_WARNING: Once = Once::new();

/// File name looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "counsel.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`COUNSEL_*`)
/// 2. Project config (`counsel.toml` in the project root)
/// 3. User config (`~/.counsel/config.toml`)
/// 4. Retrieval profile
/// 5. Compiled defaults
///
/// Unknown keys are ignored. A layer that fails to parse is skipped with a
/// warning. Out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CounselConfig {
    pub profile: RetrievalProfile,
    pub storage: StorageConfig,
    pub router: RouterConfig,
    pub fusion: FusionConfig,
    pub ranking: RankingConfig,
    pub cache: CacheConfig,
    pub quality: QualityConfig,
    pub attribution: AttributionConfig,
    pub observability: ObservabilityConfig,
}

/// The files a configuration is resolved from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSources {
    pub user: Option<PathBuf>,
    pub project: Option<PathBuf>,
}

impl ConfigSources {
    /// User config under the home directory plus `counsel.toml` in `project_root`.
    pub fn discover(project_root: Option<&Path>) -> Self {
        Self {
            user: super::home_dir().map(|h| h.join(".counsel").join("config.toml")),
            project: project_root.map(|root| root.join(PROJECT_CONFIG_FILE)),
        }
    }

    /// Existing files in ascending priority.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.user.iter().chain(self.project.iter()).map(PathBuf::as_path)
    }
}

/// A resolved configuration plus everything that had to be corrected on the way.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: CounselConfig,
    pub warnings: Vec<String>,
}

impl CounselConfig {
    /// Resolve configuration for a project. Never fails; problems are logged once.
    pub fn load(project_root: Option<&Path>) -> Self {
        let loaded = Self::load_from(
            &ConfigSources::discover(project_root),
            |key| std::env::var(key).ok(),
        );
        warn_once(&loaded.warnings);
        loaded.config
    }

    /// Resolve from explicit sources with an injectable environment.
    pub fn load_from<F>(sources: &ConfigSources, env: F) -> LoadedConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();
        let mut merged = toml::Table::new();

        for path in sources.paths() {
            if !path.exists() {
                continue;
            }
            let layer = match read_table(path) {
                Ok(layer) => layer,
                Err(e) => {
                    warnings.push(e.to_string());
                    continue;
                }
            };
            let mut candidate = merged.clone();
            merge_tables(&mut candidate, layer);
            match Self::resolve(candidate.clone()) {
                Ok(_) => merged = candidate,
                Err(e) => warnings.push(format!("{}: {e}", path.display())),
            }
        }

        if let Some(profile) = env("COUNSEL_PROFILE") {
            let mut candidate = merged.clone();
            candidate.insert("profile".to_string(), toml::Value::String(profile));
            match Self::resolve(candidate.clone()) {
                Ok(_) => merged = candidate,
                Err(e) => warnings.push(format!("COUNSEL_PROFILE: {e}")),
            }
        }

        let mut config = match Self::resolve(merged) {
            Ok(config) => config,
            Err(e) => {
                warnings.push(e.to_string());
                Self::default()
            }
        };
        config.apply_env_overrides(&env, &mut warnings);
        for field in config.sanitize() {
            warnings.push(format!("{field} out of range, clamped"));
        }
        LoadedConfig { config, warnings }
    }

    /// Parse a single TOML document on top of defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml_str.parse().map_err(|e: toml::de::Error| {
            ConfigError::ParseError {
                path: "<string>".to_string(),
                message: e.to_string(),
            }
        })?;
        let mut config = Self::resolve(table)?;
        config.sanitize();
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialize>".to_string(),
            message: e.to_string(),
        })
    }

    /// Defaults, then the profile, then the merged file layers.
    fn resolve(merged: toml::Table) -> Result<Self, ConfigError> {
        let profile = match merged.get("profile").and_then(toml::Value::as_str) {
            Some(name) => name.parse::<RetrievalProfile>()?,
            None => RetrievalProfile::default(),
        };

        let mut base = Self {
            profile,
            ..Self::default()
        };
        profile.apply(&mut base.router);

        let mut combined = match toml::Value::try_from(&base) {
            Ok(toml::Value::Table(t)) => t,
            Ok(_) => toml::Table::new(),
            Err(e) => {
                return Err(ConfigError::ParseError {
                    path: "<defaults>".to_string(),
                    message: e.to_string(),
                })
            }
        };
        merge_tables(&mut combined, merged);
        combined.insert(
            "profile".to_string(),
            toml::Value::String(profile.as_str().to_string()),
        );

        toml::Value::Table(combined)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged>".to_string(),
                message: e.to_string(),
            })
    }

    fn apply_env_overrides<F>(&mut self, env: &F, warnings: &mut Vec<String>)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse_into<T: std::str::FromStr>(
            key: &str,
            raw: Option<String>,
            slot: &mut T,
            warnings: &mut Vec<String>,
        ) {
            if let Some(raw) = raw {
                match raw.trim().parse::<T>() {
                    Ok(v) => *slot = v,
                    Err(_) => warnings.push(format!("{key}: cannot parse {raw:?}")),
                }
            }
        }

        if let Some(raw) = env("COUNSEL_MODE") {
            match raw.parse() {
                Ok(mode) => self.router.mode = mode,
                Err(_) => warnings.push(format!("COUNSEL_MODE: unknown mode {raw:?}")),
            }
        }
        parse_into("COUNSEL_RATE_CAP", env("COUNSEL_RATE_CAP"), &mut self.router.rate_cap, warnings);
        parse_into(
            "COUNSEL_DEADLINE_MS",
            env("COUNSEL_DEADLINE_MS"),
            &mut self.router.deadline_ms,
            warnings,
        );
        parse_into(
            "COUNSEL_FAST_PATH_BUDGET_MS",
            env("COUNSEL_FAST_PATH_BUDGET_MS"),
            &mut self.router.fast_path_budget_ms,
            warnings,
        );
        parse_into(
            "COUNSEL_CACHE_ENABLED",
            env("COUNSEL_CACHE_ENABLED"),
            &mut self.cache.enabled,
            warnings,
        );
        parse_into(
            "COUNSEL_CACHE_TTL_SECS",
            env("COUNSEL_CACHE_TTL_SECS"),
            &mut self.cache.ttl_secs,
            warnings,
        );
        parse_into(
            "COUNSEL_STRICT_WINDOW_SECS",
            env("COUNSEL_STRICT_WINDOW_SECS"),
            &mut self.attribution.strict_window_secs,
            warnings,
        );
        if let Some(level) = env("COUNSEL_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(url) = env("COUNSEL_SIMILARITY_URL") {
            let url = url.trim().to_string();
            self.router.similarity_url = (!url.is_empty()).then_some(url);
        }
    }

    /// Clamp every out-of-range value. Returns the dotted names of fields that changed.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut clamped = Vec::new();
        let c = &mut clamped;

        let r = &mut self.router;
        clamp_ord("router.primary_limit", &mut r.primary_limit, 1, 100, c);
        clamp_ord("router.min_results", &mut r.min_results, 0, 50, c);
        clamp_f64("router.min_top_score", &mut r.min_top_score, 0.0, 1.0, c);
        clamp_ord("router.complexity_threshold", &mut r.complexity_threshold, 1, 10, c);
        clamp_ord("router.complex_query_tokens", &mut r.complex_query_tokens, 2, 200, c);
        clamp_ord("router.fast_path_budget_ms", &mut r.fast_path_budget_ms, 1, 60_000, c);
        clamp_ord("router.deadline_ms", &mut r.deadline_ms, 1, 60_000, c);
        clamp_ord("router.max_facets", &mut r.max_facets, 0, 10, c);
        clamp_ord("router.facet_terms", &mut r.facet_terms, 1, 8, c);
        clamp_f64("router.rate_cap", &mut r.rate_cap, 0.0, 1.0, c);
        clamp_ord("router.rate_window", &mut r.rate_window, 1, 10_000, c);
        clamp_ord("router.prefilter_threshold", &mut r.prefilter_threshold, 1, 1_000_000, c);
        clamp_ord("router.prefilter_max", &mut r.prefilter_max, 1, 100_000, c);
        clamp_f64("router.min_fused_score", &mut r.min_fused_score, 0.0, 1.0, c);
        clamp_ord("router.similarity_timeout_ms", &mut r.similarity_timeout_ms, 1, 60_000, c);

        let f = &mut self.fusion;
        clamp_f64("fusion.bm25_k1", &mut f.bm25_k1, 0.01, 3.0, c);
        clamp_f64("fusion.bm25_b", &mut f.bm25_b, 0.0, 1.0, c);
        clamp_f64("fusion.bm25_weight", &mut f.bm25_weight, 0.0, 1.0, c);
        clamp_f64("fusion.semantic_weight", &mut f.semantic_weight, 0.0, 1.0, c);
        clamp_ord("fusion.parallel_threshold", &mut f.parallel_threshold, 1, 1_000_000, c);

        let k = &mut self.ranking;
        clamp_ord("ranking.max_items", &mut k.max_items, 1, 50, c);
        clamp_f64("ranking.min_rank_score", &mut k.min_rank_score, 0.0, 1.0, c);
        clamp_f64("ranking.dedup_similarity", &mut k.dedup_similarity, 0.1, 1.0, c);
        for (source, value) in k.source_quality.iter_mut() {
            let field = format!("ranking.source_quality.{source}");
            clamp_f64(&field, value, 0.0, 3.0, c);
        }
        clamp_ord("ranking.tool_caution_min_samples", &mut k.tool_caution_min_samples, 1, 1_000, c);
        clamp_f64("ranking.tool_caution_bad_rate", &mut k.tool_caution_bad_rate, 0.0, 1.0, c);
        clamp_ord("ranking.helpfulness_min_followed", &mut k.helpfulness_min_followed, 0, 1_000, c);

        let ca = &mut self.cache;
        clamp_ord("cache.ttl_secs", &mut ca.ttl_secs, 1, 86_400, c);
        clamp_ord("cache.max_entries", &mut ca.max_entries, 1, 100_000, c);

        let q = &mut self.quality;
        clamp_ord("quality.quality_threshold", &mut q.quality_threshold, 1, 12, c);
        let qt = q.quality_threshold;
        clamp_ord("quality.needs_work_threshold", &mut q.needs_work_threshold, 1, qt, c);
        clamp_ord("quality.history_max", &mut q.history_max, 1, 100_000, c);
        clamp_ord("quality.seen_max", &mut q.seen_max, 1, 1_000_000, c);
        clamp_ord("quality.quality_rate_window", &mut q.quality_rate_window, 1, 100_000, c);
        clamp_ord("quality.max_samples_per_trace", &mut q.max_samples_per_trace, 1, 1_000, c);
        clamp_f64("quality.novelty_similarity", &mut q.novelty_similarity, 0.0, 1.0, c);
        clamp_ord("quality.min_chars", &mut q.min_chars, 0, 200, c);

        let a = &mut self.attribution;
        clamp_ord("attribution.strict_window_secs", &mut a.strict_window_secs, 1, 604_800, c);
        clamp_ord("attribution.weak_min_samples", &mut a.weak_min_samples, 1, 1_000, c);
        clamp_ord("attribution.strict_min_samples", &mut a.strict_min_samples, 1, 1_000, c);
        clamp_f64("attribution.strict_floor", &mut a.strict_floor, 0.0, 1.0, c);
        clamp_ord(
            "attribution.retest_cooldown_secs",
            &mut a.retest_cooldown_secs,
            60,
            2_592_000,
            c,
        );
        clamp_f64("attribution.strict_weight", &mut a.strict_weight, 0.0, 1.0, c);
        clamp_f64(
            "attribution.suppressed_effectiveness",
            &mut a.suppressed_effectiveness,
            0.0,
            1.0,
            c,
        );
        clamp_ord("attribution.max_records", &mut a.max_records, 10, 1_000_000, c);
        clamp_ord(
            "attribution.outcome_lookback_secs",
            &mut a.outcome_lookback_secs,
            1,
            604_800,
            c,
        );

        clamped
    }
}

/// Emit configuration warnings at most once per process. Returns whether
/// this call emitted them.
pub fn warn_once(warnings: &[String]) -> bool {
    if warnings.is_empty() {
        return false;
    }
    let mut emitted = false;
    CONFIG_WARNING.call_once(|| {
        tracing::warn!(
            event = "config_clamped",
            count = warnings.len(),
            details = %warnings.join("; "),
            "configuration corrected"
        );
        emitted = true;
    });
    emitted
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.display().to_string(),
    })?;
    content
        .parse::<toml::Table>()
        .map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Deep-merge `overlay` into `base`. Tables merge key by key; anything else replaces.
pub(crate) fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

fn clamp_f64(field: &str, value: &mut f64, lo: f64, hi: f64, clamped: &mut Vec<String>) {
    let fixed = if value.is_nan() { lo } else { value.clamp(lo, hi) };
    if fixed != *value {
        *value = fixed;
        clamped.push(field.to_string());
    }
}

fn clamp_ord<T: PartialOrd + Copy>(field: &str, value: &mut T, lo: T, hi: T, clamped: &mut Vec<String>) {
    let fixed = if *value < lo {
        lo
    } else if *value > hi {
        hi
    } else {
        *value
    };
    if fixed != *value {
        *value = fixed;
        clamped.push(field.to_string());
    }
}
