//! Rankfuse: Hybrid Retrieval Orchestration
//!
//! Retrieves candidates for a query from two independent ranking sources
//! and combines them into a single deterministic ordering, featuring:
//! - Concurrent lexical + vector fan-out with fail-fast semantics
//! - Rank fusion via Reciprocal Rank Fusion or min-max-weighted scoring
//! - Optional cross-encoder reranking over the fused head
//! - Backend-agnostic filter translation shared by both sources
//! - Trait seams for all four external collaborators, with HTTP reference
//!   clients for the embedding and rerank providers

pub mod config;
pub mod error;
pub mod filter;
pub mod providers;
pub mod retrieval;
pub mod types;

pub use config::Config;
pub use error::{ProviderKind, SearchError};
pub use filter::{FilterClause, FilterPredicate, SearchFilter};
pub use retrieval::HybridSearcher;
pub use types::*;
