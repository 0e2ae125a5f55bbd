//! Optional similarity service for column matching.
//!
//! The intent classifier matches column names against query tokens. When a
//! [`SimilarityScorer`] is supplied it also accepts columns whose name is
//! semantically close to the whole query. Without one, matching falls back
//! to exact tokens.
//!
//! # Providers
//!
//! - [`EmbeddingSimilarity`]: cosine similarity over any
//!   [`EmbeddingProvider`], caching embeddings of repeated texts.
//!
//! - `LocalEmbeddingProvider`: ONNX embeddings via fastembed-rs. Only
//!   available with the `local-embeddings` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use askdata::embedding::{EmbeddingSimilarity, LocalEmbeddingProvider};
//!
//! let provider = LocalEmbeddingProvider::new("BAAI/bge-small-en-v1.5")?;
//! let scorer = EmbeddingSimilarity::new(provider, 1024);
//! let score = scorer.similarity("how much do people earn", "salary")?;
//! ```

#[cfg(feature = "local-embeddings")]
mod local;
mod similarity;
mod traits;

#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbeddingProvider;
pub use similarity::{cosine_similarity, EmbeddingSimilarity};
pub use traits::{EmbeddingProvider, SimilarityScorer};

use std::sync::Arc;

use crate::config::EmbeddingConfig;
use crate::error::Result;

/// Build the similarity scorer described by the configuration.
///
/// Returns `Ok(None)` when similarity matching is disabled or the crate was
/// built without an embedding backend.
pub fn create_scorer(config: &EmbeddingConfig) -> Result<Option<Arc<dyn SimilarityScorer>>> {
    if !config.enabled {
        return Ok(None);
    }

    #[cfg(feature = "local-embeddings")]
    {
        let provider = LocalEmbeddingProvider::new(&config.model)?;
        let scorer = EmbeddingSimilarity::new(provider, config.cache_capacity);
        Ok(Some(Arc::new(scorer)))
    }

    #[cfg(not(feature = "local-embeddings"))]
    {
        tracing::warn!(
            model = %config.model,
            "Similarity matching requested but built without `local-embeddings`; using exact column matching"
        );
        Ok(None)
    }
}
