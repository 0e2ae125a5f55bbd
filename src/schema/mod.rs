//! Schema inference for tabular datasets.
//!
//! This module provides:
//! - Semantic type inference per column
//! - Column statistics, pairwise correlations and quality metrics
//! - Column grouping and chart suggestions

mod inference;
mod suggest;
mod types;

pub use inference::{analyze, DataAnalysis, SchemaInferencer, DEFAULT_SAMPLE_SIZE};
pub use suggest::SUGGESTION_GROUPS;
pub use types::*;
