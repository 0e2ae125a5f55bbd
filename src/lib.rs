//! askdata: natural-language questions over tabular data
//!
//! Loads a CSV dataset, infers a semantic schema for it, and answers free-text
//! questions with a statistic, a filtered subset, a comparison table or a
//! chart specification.

pub mod config;
pub mod dataset;
pub mod embedding;
pub mod error;
pub mod query;
pub mod schema;
pub mod session;
pub mod stats;

pub use config::Config;
pub use dataset::{ColumnKind, Dataset, Value};
pub use embedding::{create_scorer, EmbeddingProvider, EmbeddingSimilarity, SimilarityScorer};
pub use error::{AskDataError, ConfigError, DatasetError, EmbeddingError, Result};
pub use query::{
    Aggregation, ChartKind, ChartSpec, ComparisonTable, Condition, ConditionValue, ErrorKind,
    IntentClassifier, Literal, Operator, QueryError, QueryExecutor, QueryIntent, QueryResult,
    QueryType, SimilarityPolicy,
};
pub use schema::{analyze, ColumnSchema, DataAnalysis, SchemaInferencer, SemanticType};
pub use session::{HistoryEntry, Session};
