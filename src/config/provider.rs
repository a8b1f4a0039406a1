//! Provider client configuration

use serde::{Deserialize, Serialize};

/// Configuration for the OpenAI-compatible embedding provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingProviderConfig {
    /// API endpoint (e.g. "https://api.openai.com/v1/embeddings")
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    /// API key (optional, falls back to the EMBEDDING_API_KEY env var)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model name
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Embedding dimensions
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_endpoint() -> String {
    "https://api.openai.com/v1/embeddings".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_dimensions() -> usize {
    1536
}

fn default_timeout() -> u64 {
    30
}

impl Default for EmbeddingProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_embedding_endpoint(),
            api_key: None,
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Configuration for the rerank provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankProviderConfig {
    /// API endpoint (e.g. "https://api.voyageai.com/v1/rerank")
    #[serde(default = "default_rerank_endpoint")]
    pub endpoint: String,
    /// API key (optional, falls back to the RERANK_API_KEY env var)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_rerank_endpoint() -> String {
    "https://api.voyageai.com/v1/rerank".to_string()
}

impl Default for RerankProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_rerank_endpoint(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}
