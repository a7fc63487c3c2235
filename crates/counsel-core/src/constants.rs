/// Counsel system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hex characters of the blake3 digest kept in an advice id (96 bits).
pub const ADVICE_ID_HEX_LEN: usize = 24;

/// Hex characters of the blake3 digest kept in a dedup hash.
pub const DEDUP_HASH_HEX_LEN: usize = 32;

/// Characters of the query kept in logged routing decisions.
pub const QUERY_PREVIEW_CHARS: usize = 120;

/// Environment variable that overrides the state directory.
pub const STATE_DIR_ENV: &str = "COUNSEL_STATE_DIR";

/// Environment variable holding the tracing filter.
pub const LOG_ENV: &str = "COUNSEL_LOG";
