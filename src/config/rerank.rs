//! Rerank pass configuration

use serde::{Deserialize, Serialize};

/// Defaults for the rerank pass; a request can override each field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankConfig {
    /// How many fused candidates to submit for scoring
    #[serde(default = "default_pre_rerank_k")]
    pub pre_rerank_k: usize,
    /// Per-document character budget for the scoring payload
    #[serde(default = "default_max_doc_chars")]
    pub max_doc_chars: usize,
    /// Default rerank model
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_pre_rerank_k() -> usize {
    50
}

fn default_max_doc_chars() -> usize {
    1500
}

fn default_model() -> String {
    "rerank-2.5-lite".to_string()
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            pre_rerank_k: default_pre_rerank_k(),
            max_doc_chars: default_max_doc_chars(),
            model: default_model(),
        }
    }
}
