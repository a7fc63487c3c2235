use std::collections::HashMap;
use std::sync::Arc;

use counsel_core::errors::CounselResult;
use counsel_core::models::{AdviceQuery, CandidateAdvice, Insight, SourceKind};
use counsel_core::traits::{AdapterOutput, IInsightCorpus, ISourceAdapter};

use crate::router::RetrievalRouter;

/// Confidence given to provider hits that have no corpus record.
const UNKNOWN_INSIGHT_CONFIDENCE: f64 = 0.5;

/// The insight corpus, reached through the retrieval router.
pub struct CorpusAdapter {
    corpus: Arc<dyn IInsightCorpus>,
    router: Arc<RetrievalRouter>,
}

impl CorpusAdapter {
    pub fn new(corpus: Arc<dyn IInsightCorpus>, router: Arc<RetrievalRouter>) -> Self {
        Self { corpus, router }
    }
}

impl ISourceAdapter for CorpusAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Corpus
    }

    fn gather(&self, query: &AdviceQuery) -> CounselResult<AdapterOutput> {
        let insights = self.corpus.scan()?;
        let outcome = self.router.route(query, &insights);
        let by_key: HashMap<&str, &Insight> =
            insights.iter().map(|i| (i.key.as_str(), i)).collect();

        let candidates = outcome
            .hits
            .iter()
            .map(|hit| {
                let insight = by_key.get(hit.key.as_str());
                let confidence = insight.map_or(UNKNOWN_INSIGHT_CONFIDENCE, |i| i.confidence);
                let domain = insight.and_then(|i| i.domain.clone());
                CandidateAdvice::new(
                    SourceKind::Corpus,
                    Some(hit.key.clone()),
                    hit.text.clone(),
                    confidence,
                    hit.score,
                )
                .with_domain(domain)
                .with_rationale(match hit.semantic {
                    Some(sem) => format!("fused match {:.2} (semantic {:.2})", hit.score, sem),
                    None => format!("lexical match {:.2}", hit.score),
                })
            })
            .collect();

        Ok(AdapterOutput {
            candidates,
            routing: Some(outcome.decision),
        })
    }
}
