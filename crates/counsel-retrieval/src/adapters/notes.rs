use std::sync::RwLock;

use counsel_core::config::FusionConfig;
use counsel_core::errors::CounselResult;
use counsel_core::models::{AdviceQuery, CandidateAdvice, SourceKind};
use counsel_core::traits::{AdapterOutput, ISourceAdapter};
use counsel_storage::NoteStore;

use crate::fusion::{FusionDoc, FusionScorer};

/// Match bonus for a note tagged with the exact tool being used.
const TOOL_TAG_BONUS: f64 = 0.2;

/// Serves one file-backed note source (session, chips, distillations, surprises, skill hints).
pub struct NoteAdapter {
    kind: SourceKind,
    store: NoteStore,
    scorer: RwLock<FusionScorer>,
    min_match: f64,
}

impl NoteAdapter {
    pub fn new(kind: SourceKind, store: NoteStore, fusion: FusionConfig, min_match: f64) -> Self {
        Self {
            kind,
            store,
            scorer: RwLock::new(FusionScorer::new(fusion)),
            min_match,
        }
    }

    pub fn reload(&self, fusion: FusionConfig) {
        if let Ok(mut s) = self.scorer.write() {
            s.reload(fusion);
        }
    }
}

impl ISourceAdapter for NoteAdapter {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn gather(&self, query: &AdviceQuery) -> CounselResult<AdapterOutput> {
        let notes: Vec<_> = self
            .store
            .load(self.kind)?
            .into_iter()
            .filter(|n| n.applies_to_tool(&query.tool))
            .collect();
        if notes.is_empty() {
            return Ok(AdapterOutput::default());
        }

        let scorer = self.scorer.read().map(|s| s.clone()).unwrap_or_default();
        let docs: Vec<FusionDoc<'_>> = notes.iter().map(|n| FusionDoc::lexical(&n.text)).collect();
        let scores = scorer.score_batch(&query.search_text(), &docs);

        let candidates = notes
            .into_iter()
            .zip(scores)
            .filter_map(|(note, score)| {
                let bonus = if note.tool.is_some() { TOOL_TAG_BONUS } else { 0.0 };
                let matched = (score.fused + bonus).min(1.0);
                if matched < self.min_match {
                    return None;
                }
                Some(
                    CandidateAdvice::new(self.kind, note.key.clone(), note.text.clone(), note.confidence, matched)
                        .with_domain(note.domain.clone())
                        .with_rationale(format!("{} note, match {:.2}", self.kind, matched)),
                )
            })
            .collect();
        Ok(AdapterOutput::from_candidates(candidates))
    }
}
