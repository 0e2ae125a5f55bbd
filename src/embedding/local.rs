//! Column-name embeddings from a local ONNX model via fastembed-rs.

use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::EmbeddingProvider;
use crate::error::{EmbeddingError, Result};

/// Models small enough to embed column names on the fly.
/// Each entry is (accepted names, model, output dimension).
const SUPPORTED_MODELS: &[(&[&str], EmbeddingModel, usize)] = &[
    (
        &["BAAI/bge-small-en-v1.5", "bge-small-en-v1.5"],
        EmbeddingModel::BGESmallENV15,
        384,
    ),
    (
        &["BAAI/bge-base-en-v1.5", "bge-base-en-v1.5"],
        EmbeddingModel::BGEBaseENV15,
        768,
    ),
    (
        &["sentence-transformers/all-MiniLM-L6-v2", "all-MiniLM-L6-v2"],
        EmbeddingModel::AllMiniLML6V2,
        384,
    ),
];

/// Embeds query text and column names with a locally cached model.
///
/// The model is downloaded on first construction. Inference takes a lock, so
/// concurrent callers are serialised.
pub struct LocalEmbeddingProvider {
    model: Mutex<TextEmbedding>,
    dimension: usize,
}

impl LocalEmbeddingProvider {
    pub fn new(model_name: &str) -> Result<Self> {
        let (model, dimension) = lookup_model(model_name)?;
        let options = InitOptions::new(model).with_show_download_progress(false);
        let text_model = TextEmbedding::try_new(options).map_err(|e| {
            EmbeddingError::ModelNotFound(format!("failed to load {}: {}", model_name, e))
        })?;

        tracing::info!(model = model_name, dimension, "Column similarity model ready");
        Ok(Self {
            model: Mutex::new(text_model),
            dimension,
        })
    }
}

fn lookup_model(model_name: &str) -> Result<(EmbeddingModel, usize)> {
    SUPPORTED_MODELS
        .iter()
        .find(|(names, _, _)| names.contains(&model_name))
        .map(|(_, model, dimension)| (model.clone(), *dimension))
        .ok_or_else(|| {
            let known: Vec<&str> = SUPPORTED_MODELS.iter().map(|(names, _, _)| names[0]).collect();
            EmbeddingError::ModelNotFound(format!(
                "unsupported model '{}', expected one of: {}",
                model_name,
                known.join(", ")
            ))
            .into()
        })
}

impl EmbeddingProvider for LocalEmbeddingProvider {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut model = self
            .model
            .lock()
            .map_err(|_| EmbeddingError::Inference("model lock poisoned".to_string()))?;
        model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::Inference(e.to_string()).into())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
