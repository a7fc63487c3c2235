use std::path::PathBuf;
use std::sync::Arc;

use counsel_core::config::CounselConfig;
use counsel_core::traits::{IDomainClassifier, IInsightCorpus, ISimilarityProvider};

/// Options for opening an [`crate::Advisor`].
#[derive(Default)]
pub struct AdvisorOptions {
    /// Explicit configuration. When `None`, configuration is resolved from
    /// the user and project files and hot-reloaded when they change.
    pub config: Option<CounselConfig>,
    /// Directory holding the project `counsel.toml`.
    pub project_root: Option<PathBuf>,
    /// Insight corpus. Defaults to the JSON file in the state directory.
    pub corpus: Option<Arc<dyn IInsightCorpus>>,
    /// Similarity provider. Defaults to the HTTP provider when
    /// `router.similarity_url` is set, else lexical only.
    pub similarity: Option<Arc<dyn ISimilarityProvider>>,
    /// Domain classifier. Defaults to the keyword classifier.
    pub classifier: Option<Arc<dyn IDomainClassifier>>,
    /// Install the global tracing subscriber.
    pub init_tracing: bool,
}

impl AdvisorOptions {
    pub fn with_config(config: CounselConfig) -> Self {
        Self {
            config: Some(config),
            ..Self::default()
        }
    }

    pub fn corpus(mut self, corpus: Arc<dyn IInsightCorpus>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    pub fn similarity(mut self, provider: Arc<dyn ISimilarityProvider>) -> Self {
        self.similarity = Some(provider);
        self
    }
}
