//! Types produced by schema inference.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::Value;

// ============================================================================
// Semantic Type
// ============================================================================

/// Inferred meaning of a column's values, independent of storage kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Numeric,
    CategoricalNumeric,
    Binary,
    Categorical,
    Text,
    DateString,
    Datetime,
    Unknown,
}

impl SemanticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::CategoricalNumeric => "categorical_numeric",
            Self::Binary => "binary",
            Self::Categorical => "categorical",
            Self::Text => "text",
            Self::DateString => "date_string",
            Self::Datetime => "datetime",
            Self::Unknown => "unknown",
        }
    }

    /// Types that carry numeric summary statistics.
    pub fn is_numeric_like(&self) -> bool {
        matches!(self, Self::Numeric | Self::CategoricalNumeric)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Datetime | Self::DateString)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Column Statistics
// ============================================================================

/// Summary statistics for numeric-like columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
}

/// Frequency summary for categorical columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalStats {
    /// Up to ten most frequent values, most frequent first.
    pub value_counts: Vec<(Value, usize)>,
    pub most_common: Value,
    pub least_common: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStatistics {
    Numeric(NumericStats),
    Categorical(CategoricalStats),
    #[default]
    None,
}

// ============================================================================
// Column Schema
// ============================================================================

/// Everything inferred about one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub semantic_type: SemanticType,
    pub unique_count: usize,
    pub null_count: usize,
    pub null_percentage: f64,
    /// First five non-null values.
    pub sample_values: Vec<Value>,
    pub statistics: ColumnStatistics,
}

/// Column schemas in dataset order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: Vec<ColumnSchema>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnSchema>) -> Self {
        Self { columns }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Names of columns with the given semantic type, in schema order.
    pub fn names_of<'a>(
        &'a self,
        pred: impl Fn(SemanticType) -> bool + 'a,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.columns
            .iter()
            .filter(move |c| pred(c.semantic_type))
            .map(|c| c.name.as_str())
    }
}

// ============================================================================
// Relationships and Quality
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    NumericCorrelation,
}

/// Pairwise relationship between two columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRelationship {
    pub first: String,
    pub second: String,
    /// `None` when one of the columns has no variance.
    pub correlation: Option<f64>,
    pub kind: RelationshipKind,
}

/// Whole-dataset quality metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub total_rows: usize,
    pub total_columns: usize,
    pub null_percentage: f64,
    pub duplicate_rows: usize,
    pub column_types: BTreeMap<String, SemanticType>,
}

// ============================================================================
// Suggestions
// ============================================================================

/// A chart worth drawing, derived from column types alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationSuggestion {
    pub kind: crate::query::ChartKind,
    pub title: String,
    pub x: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}
