//! Core types shared across the retrieval pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::filter::SearchFilter;

/// Opaque, stable document identifier (unique within the document store)
pub type DocId = String;

/// Dense query embedding
pub type QueryVector = Vec<f32>;

/// A retrieval source contributing a ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    Lexical,
    Vector,
}

impl SearchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Vector => "vector",
        }
    }
}

impl fmt::Display for SearchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ranked row as returned by a search backend.
///
/// Both index backends produce the same row shape; `score` carries the
/// backend's native relevance score (lexical match score or vector
/// similarity), which is not comparable across backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRow {
    pub id: DocId,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

/// A document surfaced by one or more retrieval sources.
///
/// Built transiently per request. Per-source rank/score fields are present
/// only for sources that actually returned the document; absence is
/// distinct from a zero score. Fused and rerank fields coexist so both
/// stages stay observable in the final output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: DocId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
    /// 1-based rank per contributing source
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub source_ranks: HashMap<SearchSource, usize>,
    /// Raw score per contributing source (scales are not comparable)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub source_scores: HashMap<SearchSource, f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fused_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fused_rank: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_rank: Option<usize>,
    /// Position in the final response sequence, assigned by the orchestrator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
}

impl Candidate {
    /// Build a candidate from a backend row, recording the 1-based rank the
    /// backend returned it at. A missing backend score defaults to 0.
    pub fn from_row(row: IndexRow, source: SearchSource, rank: usize) -> Self {
        let mut source_ranks = HashMap::new();
        source_ranks.insert(source, rank);
        let mut source_scores = HashMap::new();
        source_scores.insert(source, row.score.unwrap_or(0.0));

        Self {
            id: row.id,
            text: row.text,
            title: row.title,
            tags: row.tags,
            created_at: row.created_at,
            meta: row.meta,
            source_ranks,
            source_scores,
            fused_score: None,
            fused_rank: None,
            rerank_score: None,
            rerank_rank: None,
            rank: None,
        }
    }
}

/// Fusion strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FusionMethod {
    #[default]
    Rrf,
    Weighted,
}

/// Which retrieval path to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    Lexical,
    Vector,
    #[default]
    Hybrid,
}

/// Upper bound accepted for `top_k` and `pre_rerank_k`
pub const MAX_TOP_K: usize = 100;

/// A search request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub filters: SearchFilter,
    #[serde(default)]
    pub fusion: FusionMethod,
    #[serde(default)]
    pub rerank: bool,
    /// How many fused candidates to submit for reranking (config default: 50)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_rerank_k: Option<usize>,
    /// Per-document character budget for rerank payloads (config default: 1500)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_doc_chars: Option<usize>,
    /// Rerank model override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

fn default_top_k() -> usize {
    10
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
            filters: SearchFilter::default(),
            fusion: FusionMethod::default(),
            rerank: false,
            pre_rerank_k: None,
            max_doc_chars: None,
            model: None,
        }
    }

    /// Validate request bounds, collecting every violation into one report.
    pub fn validate(&self) -> Result<(), crate::error::SearchError> {
        let mut errors: Vec<String> = Vec::new();

        if self.top_k == 0 || self.top_k > MAX_TOP_K {
            errors.push(format!(
                "top_k must be between 1 and {}, got {}",
                MAX_TOP_K, self.top_k
            ));
        }
        if let Some(pre_rerank_k) = self.pre_rerank_k {
            if pre_rerank_k == 0 || pre_rerank_k > MAX_TOP_K {
                errors.push(format!(
                    "pre_rerank_k must be between 1 and {}, got {}",
                    MAX_TOP_K, pre_rerank_k
                ));
            }
        }
        if let Some(max_doc_chars) = self.max_doc_chars {
            if max_doc_chars == 0 {
                errors.push("max_doc_chars must be positive".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(crate::error::SearchError::Validation(errors.join("; ")))
        }
    }
}

/// Result of a rerank pass
#[derive(Debug, Clone)]
pub struct RerankOutcome {
    pub reranked: Vec<Candidate>,
    pub latency_ms: u64,
    pub model: String,
}
