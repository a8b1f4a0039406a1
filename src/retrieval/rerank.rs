//! Cross-encoder rerank adapter
//!
//! Narrows the fused list to a scoring prefix, trims each document to a
//! character budget, and asks the external rerank provider for relevance
//! scores in one batched call. Fused scores and ranks on the returned
//! candidates are left untouched so both stages stay observable.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::RerankConfig;
use crate::error::{ProviderKind, SearchError};
use crate::providers::RerankProvider;
use crate::types::{Candidate, RerankOutcome};

/// Resolved options for one rerank pass
#[derive(Debug, Clone)]
pub struct RerankOptions {
    pub model: String,
    /// How many fused candidates to submit for scoring
    pub pre_rerank_k: usize,
    /// Final output size
    pub top_k: usize,
    /// Per-document character budget for the scoring payload
    pub max_doc_chars: usize,
}

impl RerankOptions {
    pub fn from_config(config: &RerankConfig, top_k: usize) -> Self {
        Self {
            model: config.model.clone(),
            pre_rerank_k: config.pre_rerank_k,
            top_k,
            max_doc_chars: config.max_doc_chars,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RerankAdapter {
    provider: Arc<dyn RerankProvider>,
}

impl RerankAdapter {
    pub fn new(provider: Arc<dyn RerankProvider>) -> Self {
        Self { provider }
    }

    /// Rerank the head of a fused candidate list.
    ///
    /// Only the first `pre_rerank_k` candidates are scored. If every
    /// trimmed document is empty the provider is skipped entirely and the
    /// first `top_k` candidates come back in fused order — a degraded but
    /// safe fallback, not an error. Provider entries whose index does not
    /// resolve to a submitted document are dropped.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        opts: &RerankOptions,
    ) -> Result<RerankOutcome, SearchError> {
        let started = Instant::now();

        let mut pool = candidates;
        pool.truncate(opts.pre_rerank_k);

        // Order matters: the provider returns indices into this array
        let docs: Vec<String> = pool
            .iter()
            .map(|c| truncate_chars(c.text.as_deref().unwrap_or(""), opts.max_doc_chars).to_string())
            .collect();

        if docs.iter().all(|d| d.is_empty()) {
            warn!("all rerank payloads empty, returning fused order");
            pool.truncate(opts.top_k);
            return Ok(RerankOutcome {
                reranked: pool,
                latency_ms: started.elapsed().as_millis() as u64,
                model: opts.model.clone(),
            });
        }

        let batch_top_k = opts.top_k.min(docs.len());
        let signals = self
            .provider
            .score(query, &docs, batch_top_k, &opts.model)
            .await
            .map_err(|e| SearchError::upstream(ProviderKind::Rerank, e))?;

        debug!(
            "rerank: {} signals for {} submitted documents",
            signals.len(),
            docs.len()
        );

        let mut scored: Vec<Candidate> = Vec::with_capacity(signals.len());
        for signal in &signals {
            let Some(base) = pool.get(signal.index) else {
                warn!(
                    "dropping rerank signal with unresolvable index {} (batch size {})",
                    signal.index,
                    pool.len()
                );
                continue;
            };
            let mut candidate = base.clone();
            candidate.rerank_score = Some(signal.relevance_score);
            scored.push(candidate);
        }

        scored.sort_by(|a, b| {
            b.rerank_score
                .unwrap_or(0.0)
                .total_cmp(&a.rerank_score.unwrap_or(0.0))
        });
        scored.truncate(opts.top_k);
        for (i, candidate) in scored.iter_mut().enumerate() {
            candidate.rerank_rank = Some(i + 1);
        }

        Ok(RerankOutcome {
            reranked: scored,
            latency_ms: started.elapsed().as_millis() as u64,
            model: opts.model.clone(),
        })
    }
}

/// Suffix cut at a character budget, safe on multi-byte input
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
