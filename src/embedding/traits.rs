//! Embedding and similarity trait definitions.

use crate::error::Result;

/// Something that turns text into vectors.
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for text, one vector per input.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Return the embedding dimension.
    fn dimension(&self) -> usize;
}

/// Scores how closely a column name matches a whole query.
pub trait SimilarityScorer: Send + Sync {
    /// Similarity of `candidate` to `query`, normally in `[-1.0, 1.0]`.
    fn similarity(&self, query: &str, candidate: &str) -> Result<f32>;

    /// Score several candidates against one query.
    fn similarities(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>> {
        candidates
            .iter()
            .map(|c| self.similarity(query, c))
            .collect()
    }
}
