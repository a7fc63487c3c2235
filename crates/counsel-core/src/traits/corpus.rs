use crate::errors::CounselResult;
use crate::models::{Insight, OutcomeKind};

/// Key-value insight store. The advisory core touches scalar fields only.
pub trait IInsightCorpus: Send + Sync {
    fn get(&self, key: &str) -> CounselResult<Option<Insight>>;
    fn set(&self, insight: &Insight) -> CounselResult<()>;
    fn scan(&self) -> CounselResult<Vec<Insight>>;

    fn len(&self) -> CounselResult<usize> {
        Ok(self.scan()?.len())
    }

    fn is_empty(&self) -> CounselResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Bump the reliability counters of `key`. Returns `false` when the key is unknown.
    fn record_outcome(&self, key: &str, outcome: OutcomeKind) -> CounselResult<bool> {
        let Some(mut insight) = self.get(key)? else {
            return Ok(false);
        };
        match outcome {
            OutcomeKind::Good => insight.times_helpful += 1,
            OutcomeKind::Bad => insight.times_unhelpful += 1,
            OutcomeKind::Neutral | OutcomeKind::Unset => return Ok(true),
        }
        insight.updated_at = chrono::Utc::now();
        self.set(&insight)?;
        Ok(true)
    }

    /// Bump `times_retrieved` on every known key.
    fn record_retrieval(&self, keys: &[String]) -> CounselResult<()> {
        for key in keys {
            if let Some(mut insight) = self.get(key)? {
                insight.times_retrieved += 1;
                self.set(&insight)?;
            }
        }
        Ok(())
    }
}
