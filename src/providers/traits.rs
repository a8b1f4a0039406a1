//! Collaborator trait definitions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::filter::FilterPredicate;
use crate::types::{IndexRow, QueryVector};

/// Errors produced by collaborator clients
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The request could not be completed
    #[error("request failed: {0}")]
    Request(String),

    /// Rate limited by the service
    #[error("rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited {
        /// Suggested retry delay in milliseconds, if the service provided one
        retry_after_ms: Option<u64>,
    },

    /// Network or HTTP error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with something the client cannot decode
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Client configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for collaborator calls
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Resolves a query string to a fixed-dimension embedding vector
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed a single query string
    async fn embed(&self, text: &str) -> ProviderResult<QueryVector>;

    /// Output dimensionality of this provider's vectors
    fn dimensions(&self) -> usize;
}

/// Term-match search over the lexical index
#[async_trait]
pub trait LexicalIndex: Send + Sync + Debug {
    /// Return up to `k` rows ranked by lexical relevance, best first.
    async fn search(
        &self,
        query: &str,
        k: usize,
        filter: &FilterPredicate,
    ) -> ProviderResult<Vec<IndexRow>>;
}

/// Approximate nearest-neighbor search over the vector index
#[async_trait]
pub trait VectorIndex: Send + Sync + Debug {
    /// Return up to `k` rows ranked by similarity, best first. `pool` is the
    /// ANN candidate pool size (>= k in a tuned deployment).
    async fn search(
        &self,
        vector: &[f32],
        k: usize,
        pool: usize,
        filter: &FilterPredicate,
    ) -> ProviderResult<Vec<IndexRow>>;
}

/// One scored entry returned by a rerank provider. `index` refers to the
/// submitted documents array, not to any candidate id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankSignal {
    pub index: usize,
    pub relevance_score: f32,
}

/// Cross-encoder relevance scoring over a batch of documents
#[async_trait]
pub trait RerankProvider: Send + Sync + Debug {
    /// Score `documents` against `query`, returning up to `top_k` entries.
    /// Higher relevance score means more relevant.
    async fn score(
        &self,
        query: &str,
        documents: &[String],
        top_k: usize,
        model: &str,
    ) -> ProviderResult<Vec<RerankSignal>>;
}
