//! Tracing setup: structured logging with span definitions and event helpers.

pub mod events;
pub mod spans;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use counsel_core::config::ObservabilityConfig;

/// Environment variable holding a filter directive, e.g. `counsel=debug`.
pub const LOG_ENV: &str = "COUNSEL_LOG";

static INIT: Once = Once::new();

/// Install the global subscriber once per process.
///
/// `COUNSEL_LOG` wins over `config.log_level`. A subscriber installed by the
/// host process is left alone.
pub fn init_tracing(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr);
        let installed = if config.json_logs {
            builder
                .json()
                .with_file(true)
                .with_line_number(true)
                .try_init()
        } else {
            builder.try_init()
        };
        if installed.is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    });
}

/// Initialize tracing with a custom filter string (for tests or embedding).
pub fn init_tracing_with_filter(filter: &str) {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_target(true)
            .with_test_writer()
            .try_init();
    });
}

/// Install a JSON subscriber for machine-consumed logs.
///
/// Filter comes from `COUNSEL_LOG`, defaulting to `counsel=info`.
pub fn init_json_tracing() {
    init_tracing(&ObservabilityConfig {
        json_logs: true,
        log_level: "counsel=info".to_string(),
        ..ObservabilityConfig::default()
    });
}
