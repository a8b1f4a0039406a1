//! Error taxonomy for the retrieval pipeline
//!
//! An empty or whitespace-only query is a valid no-op (empty result), not an
//! error, so it has no variant here. Provider failures are never retried in
//! this crate; they propagate to the caller with the failing collaborator
//! identified.

use std::fmt;

use crate::providers::ProviderError;

/// The collaborator a failure originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Embedding,
    LexicalIndex,
    VectorIndex,
    Rerank,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embedding => "embedding provider",
            Self::LexicalIndex => "lexical index",
            Self::VectorIndex => "vector index",
            Self::Rerank => "rerank provider",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the retrieval pipeline
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Malformed request parameters (caller's fault)
    #[error("invalid request: {0}")]
    Validation(String),

    /// A collaborator call failed
    #[error("{provider} call failed: {source}")]
    Upstream {
        provider: ProviderKind,
        #[source]
        source: ProviderError,
    },

    /// A collaborator returned data the pipeline cannot interpret
    #[error("{provider} returned an unusable response: {message}")]
    ResponseShape {
        provider: ProviderKind,
        message: String,
    },
}

impl SearchError {
    pub fn upstream(provider: ProviderKind, source: ProviderError) -> Self {
        Self::Upstream { provider, source }
    }

    pub fn response_shape(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::ResponseShape {
            provider,
            message: message.into(),
        }
    }
}
