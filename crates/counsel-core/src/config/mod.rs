pub mod attribution_config;
pub mod cache_config;
pub mod counsel_config;
pub mod defaults;
pub mod fusion_config;
pub mod observability_config;
pub mod profile;
pub mod quality_config;
pub mod ranking_config;
pub mod router_config;
pub mod storage_config;
pub mod watcher;

pub use attribution_config::AttributionConfig;
pub use cache_config::CacheConfig;
pub use counsel_config::{warn_once, ConfigSources, CounselConfig, LoadedConfig, PROJECT_CONFIG_FILE};
pub use fusion_config::FusionConfig;
pub use observability_config::ObservabilityConfig;
pub use profile::RetrievalProfile;
pub use quality_config::QualityConfig;
pub use ranking_config::RankingConfig;
pub use router_config::RouterConfig;
pub use storage_config::StorageConfig;
pub use watcher::ConfigWatcher;

/// Cross-platform home directory resolution.
pub(crate) fn home_dir() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from)
}
