//! Configuration for the retrieval pipeline

mod fusion;
mod logging;
mod provider;
mod rerank;

pub use fusion::FusionConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use provider::{EmbeddingProviderConfig, RerankProviderConfig};
pub use rerank::RerankConfig;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::types::MAX_TOP_K;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Embedding provider client
    #[serde(default)]
    pub embedding: EmbeddingProviderConfig,
    /// Rerank provider client
    #[serde(default)]
    pub rerank_provider: RerankProviderConfig,
    /// Fusion parameters
    #[serde(default)]
    pub fusion: FusionConfig,
    /// Rerank pass defaults
    #[serde(default)]
    pub rerank: RerankConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass rather than playing whack-a-mole.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Embedding provider validation
        if self.embedding.dimensions == 0 {
            errors.push("embedding dimensions must be positive".to_string());
        }
        if self.embedding.dimensions > 4096 {
            errors.push("embedding dimensions must be <= 4096".to_string());
        }
        if Url::parse(&self.embedding.endpoint).is_err() {
            errors.push(format!(
                "embedding endpoint is not a valid URL: '{}'",
                self.embedding.endpoint
            ));
        }
        if self.embedding.timeout_secs == 0 {
            errors.push("embedding timeout_secs must be positive".to_string());
        }

        // Rerank provider validation
        if Url::parse(&self.rerank_provider.endpoint).is_err() {
            errors.push(format!(
                "rerank endpoint is not a valid URL: '{}'",
                self.rerank_provider.endpoint
            ));
        }
        if self.rerank_provider.timeout_secs == 0 {
            errors.push("rerank timeout_secs must be positive".to_string());
        }

        // Fusion validation
        if self.fusion.rrf_k0 <= 0.0 {
            errors.push("rrf_k0 must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.fusion.weight_lexical) {
            errors.push("weight_lexical must be between 0.0 and 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.fusion.weight_vector) {
            errors.push("weight_vector must be between 0.0 and 1.0".to_string());
        }

        // Rerank pass validation
        if self.rerank.pre_rerank_k == 0 || self.rerank.pre_rerank_k > MAX_TOP_K {
            errors.push(format!(
                "pre_rerank_k must be between 1 and {}",
                MAX_TOP_K
            ));
        }
        if self.rerank.max_doc_chars == 0 {
            errors.push("max_doc_chars must be positive".to_string());
        }
        if self.rerank.model.is_empty() {
            errors.push("rerank model must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}
