// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_STATE_SUBDIR: &str = ".counsel/state";
pub const DEFAULT_LOCK_RETRIES: u32 = 5;
pub const DEFAULT_LOCK_RETRY_DELAY_MS: u64 = 10;
pub const DEFAULT_CORRUPT_RETRY_DELAY_MS: u64 = 50;
pub const DEFAULT_LOG_MAX_LINES: usize = 20_000;

// --- Router ---
pub const DEFAULT_PRIMARY_LIMIT: usize = 8;
pub const DEFAULT_MIN_RESULTS: usize = 2;
pub const DEFAULT_MIN_TOP_SCORE: f64 = 0.35;
pub const DEFAULT_COMPLEXITY_THRESHOLD: u32 = 2;
pub const DEFAULT_COMPLEX_QUERY_TOKENS: usize = 14;
pub const DEFAULT_FAST_PATH_BUDGET_MS: u64 = 250;
pub const DEFAULT_ESCALATION_DEADLINE_MS: u64 = 1_200;
pub const DEFAULT_MAX_FACETS: usize = 3;
pub const DEFAULT_FACET_TERMS: usize = 2;
pub const DEFAULT_RATE_CAP: f64 = 0.35;
pub const DEFAULT_RATE_WINDOW: usize = 40;
pub const DEFAULT_PREFILTER_THRESHOLD: usize = 400;
pub const DEFAULT_PREFILTER_MAX: usize = 120;
pub const DEFAULT_MIN_FUSED_SCORE: f64 = 0.08;
pub const DEFAULT_SIMILARITY_TIMEOUT_MS: u64 = 800;
/// Fused score a note needs before it becomes a candidate.
pub const DEFAULT_NOTE_MIN_MATCH: f64 = 0.1;

// --- Fusion ---
pub const DEFAULT_BM25_K1: f64 = 1.2;
pub const DEFAULT_BM25_B: f64 = 0.75;
pub const DEFAULT_BM25_WEIGHT: f64 = 0.7;
pub const DEFAULT_SEMANTIC_WEIGHT: f64 = 0.6;
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

// --- Ranking ---
pub const DEFAULT_MAX_ITEMS: usize = 5;
pub const DEFAULT_MIN_RANK_SCORE: f64 = 0.08;
pub const DEFAULT_DEDUP_SIMILARITY: f64 = 0.8;
pub const DEFAULT_TOOL_CAUTION_MIN_SAMPLES: usize = 3;
pub const DEFAULT_TOOL_CAUTION_BAD_RATE: f64 = 0.4;
pub const DEFAULT_HELPFULNESS_MIN_FOLLOWED: u64 = 3;

// --- Cache ---
pub const DEFAULT_CACHE_ENABLED: bool = true;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 120;
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 256;

// --- Quality gate ---
pub const DEFAULT_QUALITY_THRESHOLD: u32 = 5;
pub const DEFAULT_NEEDS_WORK_THRESHOLD: u32 = 3;
pub const DEFAULT_ETHICS_ENABLED: bool = true;
pub const DEFAULT_AUTO_REFINE: bool = true;
pub const DEFAULT_ROAST_HISTORY_MAX: usize = 500;
pub const DEFAULT_QUALITY_RATE_WINDOW: usize = 200;
pub const DEFAULT_MAX_SAMPLES_PER_TRACE: usize = 3;
pub const DEFAULT_NOVELTY_SIMILARITY: f64 = 0.6;
pub const DEFAULT_MIN_LEARNING_CHARS: usize = 12;
pub const DEFAULT_SEEN_HASHES_MAX: usize = 5_000;

// --- Attribution ---
pub const DEFAULT_STRICT_WINDOW_SECS: u64 = 1_800; // 30 minutes
pub const DEFAULT_WEAK_MIN_SAMPLES: u64 = 1;
pub const DEFAULT_STRICT_MIN_SAMPLES: u64 = 3;
pub const DEFAULT_STRICT_FLOOR: f64 = 0.3;
pub const DEFAULT_RETEST_COOLDOWN_SECS: u64 = 86_400; // 24 hours
pub const DEFAULT_STRICT_WEIGHT: f64 = 0.7;
pub const DEFAULT_SUPPRESSED_EFFECTIVENESS: f64 = 0.05;
pub const DEFAULT_MAX_LEDGER_RECORDS: usize = 5_000;
pub const DEFAULT_OUTCOME_LOOKBACK_SECS: u64 = 3_600;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
pub const DEFAULT_DECISION_LOG: bool = true;
