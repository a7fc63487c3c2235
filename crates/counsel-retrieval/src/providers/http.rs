//! HTTP similarity provider.
//!
//! POSTs `{query, subset, limit}` to `<base_url>/similarity` and expects
//! `{"hits": [{key, text, semantic_sim, trigger_conf}]}`. Every request carries
//! a hard timeout; callers treat failures as "no semantic scores".

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use counsel_core::errors::{CounselResult, RetrievalError};
use counsel_core::traits::{ISimilarityProvider, SimilarityHit};

pub struct HttpSimilarityProvider {
    name: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct SimilarityRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    subset: Option<&'a [String]>,
    limit: usize,
}

#[derive(Deserialize)]
struct SimilarityResponse {
    #[serde(default)]
    hits: Vec<SimilarityHit>,
}

impl HttpSimilarityProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> CounselResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| RetrievalError::ProviderUnavailable {
                provider: "http".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            name: "http".to_string(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl ISimilarityProvider for HttpSimilarityProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn similarity(
        &self,
        query: &str,
        subset: Option<&[String]>,
        limit: usize,
    ) -> CounselResult<Vec<SimilarityHit>> {
        let url = format!("{}/similarity", self.base_url);
        let body = SimilarityRequest {
            query,
            subset,
            limit,
        };
        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_timeout() {
                RetrievalError::ProviderTimeout {
                    provider: self.name.clone(),
                    timeout_ms: self.timeout.as_millis() as u64,
                }
            } else {
                RetrievalError::ProviderUnavailable {
                    provider: self.name.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        if !response.status().is_success() {
            return Err(RetrievalError::ProviderUnavailable {
                provider: self.name.clone(),
                reason: format!("status {}", response.status()),
            }
            .into());
        }

        let parsed: SimilarityResponse =
            response
                .json()
                .map_err(|e| RetrievalError::ProviderUnavailable {
                    provider: self.name.clone(),
                    reason: format!("bad response body: {e}"),
                })?;
        debug!(provider = %self.name, hits = parsed.hits.len(), "similarity answered");

        let mut hits: Vec<SimilarityHit> = parsed
            .hits
            .into_iter()
            .filter(|h| !h.key.is_empty())
            .map(|mut h| {
                h.semantic_sim = unit(h.semantic_sim);
                h.trigger_conf = unit(h.trigger_conf);
                h
            })
            .collect();
        hits.truncate(limit);
        Ok(hits)
    }
}

fn unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
