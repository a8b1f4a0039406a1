//! Lexical retrieval adapter

use std::sync::Arc;

use tracing::debug;

use crate::error::{ProviderKind, SearchError};
use crate::filter::FilterPredicate;
use crate::providers::LexicalIndex;
use crate::types::{Candidate, SearchSource};

/// Executes term-match queries against the lexical index and shapes the
/// rows into ranked candidates.
#[derive(Debug, Clone)]
pub struct LexicalRetriever {
    index: Arc<dyn LexicalIndex>,
}

impl LexicalRetriever {
    pub fn new(index: Arc<dyn LexicalIndex>) -> Self {
        Self { index }
    }

    /// Retrieve up to `k` candidates for `query`.
    ///
    /// An empty or whitespace-only query short-circuits to an empty result
    /// without touching the backend. Ranks are 1-based in backend order;
    /// the backend is trusted to have sorted by relevance already.
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
        filter: &FilterPredicate,
    ) -> Result<Vec<Candidate>, SearchError> {
        if query.trim().is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let rows = self
            .index
            .search(query, k, filter)
            .await
            .map_err(|e| SearchError::upstream(ProviderKind::LexicalIndex, e))?;

        debug!("lexical search: {} rows", rows.len());

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| Candidate::from_row(row, SearchSource::Lexical, i + 1))
            .collect())
    }
}
