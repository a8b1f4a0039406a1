//! Hybrid search orchestrator
//!
//! Linear pipeline per request: validate, fan out to the lexical and
//! vector adapters concurrently, fuse the two rankings, optionally rerank
//! the fused head, then assign final response ranks.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::SearchError;
use crate::filter::FilterPredicate;
use crate::providers::{EmbeddingProvider, LexicalIndex, RerankProvider, VectorIndex};
use crate::retrieval::fusion::{fuse, FusionParams};
use crate::retrieval::lexical::LexicalRetriever;
use crate::retrieval::rerank::{RerankAdapter, RerankOptions};
use crate::retrieval::vector::VectorRetriever;
use crate::types::{Candidate, SearchRequest, SearchStrategy};

/// Top-level coordinator for hybrid retrieval.
///
/// All collaborators are injected at construction; the searcher holds no
/// process-wide state and is cheap to clone.
#[derive(Debug, Clone)]
pub struct HybridSearcher {
    lexical: LexicalRetriever,
    vector: VectorRetriever,
    reranker: RerankAdapter,
    config: Config,
}

impl HybridSearcher {
    pub fn new(
        lexical_index: Arc<dyn LexicalIndex>,
        vector_index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        rerank_provider: Arc<dyn RerankProvider>,
        config: Config,
    ) -> Self {
        Self {
            lexical: LexicalRetriever::new(lexical_index),
            vector: VectorRetriever::new(vector_index, embedder),
            reranker: RerankAdapter::new(rerank_provider),
            config,
        }
    }

    /// Dispatch a request to the selected retrieval strategy.
    pub async fn retrieve(
        &self,
        strategy: SearchStrategy,
        request: &SearchRequest,
    ) -> Result<Vec<Candidate>, SearchError> {
        match strategy {
            SearchStrategy::Lexical => self.search_lexical(request).await,
            SearchStrategy::Vector => self.search_vector(request).await,
            SearchStrategy::Hybrid => self.hybrid_search(request).await,
        }
    }

    /// Lexical-only retrieval: no fusion, no reranking.
    pub async fn search_lexical(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<Candidate>, SearchError> {
        request.validate()?;
        if request.query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let predicate = FilterPredicate::translate(&request.filters);
        let mut results = self
            .lexical
            .retrieve(&request.query, request.top_k, &predicate)
            .await?;
        finalize_ranks(&mut results);
        Ok(results)
    }

    /// Vector-only retrieval: no fusion, no reranking.
    pub async fn search_vector(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<Candidate>, SearchError> {
        request.validate()?;
        if request.query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let predicate = FilterPredicate::translate(&request.filters);
        let mut results = self
            .vector
            .retrieve(&request.query, request.top_k, &predicate)
            .await?;
        finalize_ranks(&mut results);
        Ok(results)
    }

    /// Full hybrid retrieval: concurrent fan-out, fusion, optional rerank.
    ///
    /// An empty or whitespace-only query returns an empty result without
    /// invoking any collaborator. Fan-out is fail-fast: the first error
    /// from either retrieval aborts the request — a hybrid result computed
    /// from half the sources is not served.
    pub async fn hybrid_search(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<Candidate>, SearchError> {
        request.validate()?;
        if request.query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let predicate = FilterPredicate::translate(&request.filters);

        let (lexical_hits, vector_hits) = tokio::try_join!(
            self.lexical
                .retrieve(&request.query, request.top_k, &predicate),
            self.vector
                .retrieve(&request.query, request.top_k, &predicate),
        )?;
        debug!(
            "fan-out complete: {} lexical, {} vector",
            lexical_hits.len(),
            vector_hits.len()
        );

        let params = FusionParams::new(&self.config.fusion, request.fusion, request.top_k);
        let fused = fuse(&lexical_hits, &vector_hits, &params);

        let mut results = if request.rerank && !fused.is_empty() {
            let opts = self.rerank_options(request, fused.len());
            let outcome = self.reranker.rerank(&request.query, fused, &opts).await?;
            info!(
                "rerank pass: model={}, {} results, {}ms",
                outcome.model,
                outcome.reranked.len(),
                outcome.latency_ms
            );
            outcome.reranked
        } else {
            fused
        };

        finalize_ranks(&mut results);

        info!(
            "hybrid search for '{}': {} results in {}ms",
            truncate_for_log(&request.query, 50),
            results.len(),
            started.elapsed().as_millis()
        );

        Ok(results)
    }

    /// Resolve rerank options from config defaults plus request overrides.
    /// The scoring prefix never exceeds the fused output size.
    fn rerank_options(&self, request: &SearchRequest, fused_len: usize) -> RerankOptions {
        let mut opts = RerankOptions::from_config(&self.config.rerank, request.top_k);
        if let Some(pre_rerank_k) = request.pre_rerank_k {
            opts.pre_rerank_k = pre_rerank_k;
        }
        if let Some(max_doc_chars) = request.max_doc_chars {
            opts.max_doc_chars = max_doc_chars;
        }
        if let Some(model) = &request.model {
            opts.model = model.clone();
        }
        opts.pre_rerank_k = opts.pre_rerank_k.min(fused_len);
        opts
    }
}

/// Assign the final 1-based response rank to each candidate in order.
fn finalize_ranks(results: &mut [Candidate]) {
    for (i, candidate) in results.iter_mut().enumerate() {
        candidate.rank = Some(i + 1);
    }
}

/// Truncate a string for log lines, appending "..." if cut.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let suffix = "...";
    let target = max_len.saturating_sub(suffix.len());
    let mut end = target;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &s[..end], suffix)
}
