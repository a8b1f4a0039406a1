//! Vector retrieval adapter

use std::sync::Arc;

use tracing::debug;

use crate::error::{ProviderKind, SearchError};
use crate::filter::FilterPredicate;
use crate::providers::{EmbeddingProvider, VectorIndex};
use crate::types::{Candidate, SearchSource};

/// Resolves the query to an embedding and executes an approximate
/// nearest-neighbor search against the vector index.
#[derive(Debug, Clone)]
pub struct VectorRetriever {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl VectorRetriever {
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { index, embedder }
    }

    /// Retrieve up to `k` candidates for `query`.
    ///
    /// An embedding failure is fatal for this call and propagates as an
    /// upstream error. The ANN candidate pool size defaults to `k`.
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
        filter: &FilterPredicate,
    ) -> Result<Vec<Candidate>, SearchError> {
        if query.trim().is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| SearchError::upstream(ProviderKind::Embedding, e))?;

        let expected = self.embedder.dimensions();
        if embedding.len() != expected {
            return Err(SearchError::response_shape(
                ProviderKind::Embedding,
                format!("expected {} dimensions, got {}", expected, embedding.len()),
            ));
        }

        let rows = self
            .index
            .search(&embedding, k, k, filter)
            .await
            .map_err(|e| SearchError::upstream(ProviderKind::VectorIndex, e))?;

        debug!("vector search: {} rows", rows.len());

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| Candidate::from_row(row, SearchSource::Vector, i + 1))
            .collect())
    }
}
