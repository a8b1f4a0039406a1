//! Hybrid retrieval pipeline
//!
//! Combines:
//! - Lexical (term-match) retrieval
//! - Dense vector retrieval
//! - Rank fusion (RRF or min-max-weighted scoring)
//! - Optional cross-encoder reranking over the fused head

mod fusion;
mod hybrid;
mod lexical;
mod rerank;
mod vector;

pub use fusion::{fuse, FusionParams};
pub use hybrid::HybridSearcher;
pub use lexical::LexicalRetriever;
pub use rerank::{RerankAdapter, RerankOptions};
pub use vector::VectorRetriever;
