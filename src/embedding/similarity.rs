//! Embedding-backed similarity with a cache for repeated texts.
//!
//! Column names are embedded once per session and reused across queries,
//! so the cache is keyed by text and bounded by entry count.

use std::collections::HashMap;
use std::sync::Arc;

use moka::sync::Cache;

use super::traits::{EmbeddingProvider, SimilarityScorer};
use crate::error::{EmbeddingError, Result};

/// Cosine similarity over embeddings from any provider.
pub struct EmbeddingSimilarity<P> {
    provider: P,
    cache: Cache<String, Arc<Vec<f32>>>,
}

impl<P: EmbeddingProvider> EmbeddingSimilarity<P> {
    /// Wrap a provider, caching up to `capacity` embeddings.
    pub fn new(provider: P, capacity: u64) -> Self {
        Self {
            provider,
            cache: Cache::new(capacity),
        }
    }

    /// Number of cached embeddings.
    pub fn cached_entries(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    fn embeddings(&self, texts: &[&str]) -> Result<Vec<Arc<Vec<f32>>>> {
        let mut found: HashMap<&str, Arc<Vec<f32>>> = HashMap::with_capacity(texts.len());
        let mut missing: Vec<String> = Vec::new();
        for text in texts {
            if found.contains_key(text) {
                continue;
            }
            match self.cache.get(*text) {
                Some(vector) => {
                    found.insert(*text, vector);
                }
                None if !missing.iter().any(|m| m == text) => missing.push(text.to_string()),
                None => {}
            }
        }

        if !missing.is_empty() {
            let vectors = self.provider.embed(&missing)?;
            if vectors.len() != missing.len() {
                return Err(EmbeddingError::Inference(format!(
                    "provider returned {} embeddings for {} texts",
                    vectors.len(),
                    missing.len()
                ))
                .into());
            }
            for (text, vector) in missing.iter().zip(vectors) {
                if vector.len() != self.provider.dimension() {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: self.provider.dimension(),
                        got: vector.len(),
                    }
                    .into());
                }
                let vector = Arc::new(vector);
                self.cache.insert(text.clone(), Arc::clone(&vector));
                if let Some(key) = texts.iter().find(|t| **t == text.as_str()) {
                    found.insert(*key, vector);
                }
            }
        }

        texts
            .iter()
            .map(|t| {
                found.get(t).cloned().ok_or_else(|| {
                    EmbeddingError::Inference(format!("no embedding for '{}'", t)).into()
                })
            })
            .collect()
    }
}

impl<P: EmbeddingProvider> SimilarityScorer for EmbeddingSimilarity<P> {
    fn similarity(&self, query: &str, candidate: &str) -> Result<f32> {
        let vectors = self.embeddings(&[query, candidate])?;
        Ok(cosine_similarity(&vectors[0], &vectors[1]))
    }

    fn similarities(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>> {
        let mut texts = Vec::with_capacity(candidates.len() + 1);
        texts.push(query);
        texts.extend_from_slice(candidates);

        let vectors = self.embeddings(&texts)?;
        Ok(vectors[1..]
            .iter()
            .map(|v| cosine_similarity(&vectors[0], v))
            .collect())
    }
}

/// Cosine similarity; zero for zero-length vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
