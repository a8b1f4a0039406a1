//! Fusion configuration

use serde::{Deserialize, Serialize};

/// Parameters for the fusion strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// RRF smoothing constant
    #[serde(default = "default_rrf_k0")]
    pub rrf_k0: f32,
    /// Lexical weight for weighted fusion
    #[serde(default = "default_weight_lexical")]
    pub weight_lexical: f32,
    /// Vector weight for weighted fusion
    #[serde(default = "default_weight_vector")]
    pub weight_vector: f32,
}

fn default_rrf_k0() -> f32 {
    60.0
}

fn default_weight_lexical() -> f32 {
    0.4
}

fn default_weight_vector() -> f32 {
    0.6
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            rrf_k0: default_rrf_k0(),
            weight_lexical: default_weight_lexical(),
            weight_vector: default_weight_vector(),
        }
    }
}
