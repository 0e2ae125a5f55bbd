//! Schema inference.
//!
//! Classifies every column into a [`SemanticType`] from a bounded sample of
//! its values, then computes per-column statistics, pairwise correlations
//! and dataset quality metrics.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use polars::prelude::{ChunkAgg, ChunkQuantile, Column, Float64Chunked};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::types::*;
use crate::dataset::{column_values, numbers, ColumnKind, Dataset, Value};
use crate::stats;

/// Default number of non-null values examined per column.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

const SAMPLE_VALUES: usize = 5;
const TOP_VALUE_COUNTS: usize = 10;

// ============================================================================
// Data Analysis
// ============================================================================

/// Result of analysing a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataAnalysis {
    pub schema: Schema,
    /// Keyed `"{first}_{second}"`, both orderings present.
    pub relationships: BTreeMap<String, ColumnRelationship>,
    pub quality_metrics: QualityMetrics,
}

/// Analyse a dataset with the default sample size.
pub fn analyze(dataset: &Dataset) -> DataAnalysis {
    SchemaInferencer::default().analyze(dataset)
}

// ============================================================================
// Schema Inferencer
// ============================================================================

/// Infers semantic types and statistics for datasets.
#[derive(Debug, Clone)]
pub struct SchemaInferencer {
    sample_size: usize,
}

impl Default for SchemaInferencer {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaInferencer {
    pub fn new() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }

    /// Create an inferencer that samples `sample_size` values per column.
    pub fn with_sample_size(sample_size: usize) -> Self {
        Self {
            sample_size: sample_size.max(1),
        }
    }

    /// Analyse a dataset. Pure: the same data always yields the same result.
    pub fn analyze(&self, dataset: &Dataset) -> DataAnalysis {
        let schema = Schema::new(
            dataset
                .columns()
                .iter()
                .map(|c| self.column_schema(c, dataset.row_count()))
                .collect(),
        );
        let relationships = relationships(dataset, &schema);
        let quality_metrics = quality_metrics(dataset, &schema);

        tracing::debug!(
            columns = schema.len(),
            relationships = relationships.len(),
            "Analysed dataset"
        );

        DataAnalysis {
            schema,
            relationships,
            quality_metrics,
        }
    }

    fn column_schema(&self, column: &Column, row_count: usize) -> ColumnSchema {
        let cells = column_values(column);
        let present: Vec<&Value> = cells.iter().filter(|v| !v.is_null()).collect();
        let semantic_type = self.classify(ColumnKind::of_column(column), &present);
        let null_count = column.null_count();
        let null_percentage = if row_count == 0 {
            0.0
        } else {
            null_count as f64 / row_count as f64 * 100.0
        };

        ColumnSchema {
            name: column.name().to_string(),
            semantic_type,
            unique_count: column
                .as_materialized_series()
                .drop_nulls()
                .n_unique()
                .unwrap_or_else(|_| present.iter().collect::<HashSet<_>>().len()),
            null_count,
            null_percentage,
            sample_values: present.iter().take(SAMPLE_VALUES).map(|v| (*v).clone()).collect(),
            statistics: column_statistics(column, &present, semantic_type),
        }
    }

    /// Semantic type of a column, decided from its first `sample_size`
    /// non-null values.
    pub fn infer_type(&self, column: &Column) -> SemanticType {
        let cells = column_values(column);
        let present: Vec<&Value> = cells.iter().filter(|v| !v.is_null()).collect();
        self.classify(ColumnKind::of_column(column), &present)
    }

    fn classify(&self, kind: ColumnKind, present: &[&Value]) -> SemanticType {
        let sample = &present[..present.len().min(self.sample_size)];
        if sample.is_empty() {
            return SemanticType::Unknown;
        }

        if kind == ColumnKind::DateTime {
            return SemanticType::Datetime;
        }

        let distinct = sample.iter().collect::<HashSet<_>>().len();
        let few_distinct = (distinct as f64) < sample.len() as f64 * 0.5;

        if matches!(kind, ColumnKind::Number | ColumnKind::Boolean) {
            return if distinct <= 2 {
                SemanticType::Binary
            } else if few_distinct {
                SemanticType::CategoricalNumeric
            } else {
                SemanticType::Numeric
            };
        }

        if few_distinct {
            return SemanticType::Categorical;
        }

        if is_date_string_sample(sample) {
            return SemanticType::DateString;
        }

        SemanticType::Text
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// At least half of the sampled text values start with a date.
fn is_date_string_sample(sample: &[&Value]) -> bool {
    let texts: Vec<&str> = sample.iter().filter_map(|v| v.as_str()).collect();
    if texts.is_empty() {
        return false;
    }
    DATE_STRING_PATTERNS.iter().any(|pattern| {
        let matched = texts.iter().filter(|t| pattern.is_match(t)).count();
        matched as f64 >= texts.len() as f64 * 0.5
    })
}

fn column_statistics(
    column: &Column,
    present: &[&Value],
    semantic_type: SemanticType,
) -> ColumnStatistics {
    if semantic_type.is_numeric_like() {
        return numbers(column)
            .and_then(|values| numeric_stats(&values))
            .map(ColumnStatistics::Numeric)
            .unwrap_or_default();
    }
    if semantic_type == SemanticType::Categorical {
        return categorical_stats(present)
            .map(ColumnStatistics::Categorical)
            .unwrap_or_default();
    }
    ColumnStatistics::None
}

fn numeric_stats(values: &Float64Chunked) -> Option<NumericStats> {
    Some(NumericStats {
        mean: values.mean()?,
        median: values.median()?,
        std: stats::std_dev(values, 0)?,
        min: values.min()?,
        max: values.max()?,
        q1: stats::quantile(values, 0.25)?,
        q3: stats::quantile(values, 0.75)?,
    })
}

/// Value counts ordered by count descending, ties by value ascending.
fn value_counts(present: &[&Value]) -> Vec<(Value, usize)> {
    let mut counts: HashMap<&Value, usize> = HashMap::new();
    for value in present {
        *counts.entry(*value).or_default() += 1;
    }

    let mut counts: Vec<(Value, usize)> =
        counts.into_iter().map(|(v, n)| (v.clone(), n)).collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.sort_cmp(&b.0)));
    counts
}

fn categorical_stats(present: &[&Value]) -> Option<CategoricalStats> {
    let mut counts = value_counts(present);
    let most_common = counts.first()?.0.clone();
    let least_common = counts.last()?.0.clone();
    counts.truncate(TOP_VALUE_COUNTS);

    Some(CategoricalStats {
        value_counts: counts,
        most_common,
        least_common,
    })
}

fn relationships(dataset: &Dataset, schema: &Schema) -> BTreeMap<String, ColumnRelationship> {
    let numeric: Vec<(&str, Float64Chunked)> = schema
        .names_of(|t| t.is_numeric_like())
        .filter_map(|name| Some((name, numbers(dataset.column(name)?)?)))
        .collect();

    let mut out = BTreeMap::new();
    for (first, xs) in &numeric {
        for (second, ys) in &numeric {
            if first == second {
                continue;
            }
            out.insert(
                format!("{}_{}", first, second),
                ColumnRelationship {
                    first: first.to_string(),
                    second: second.to_string(),
                    correlation: stats::pearson(xs, ys),
                    kind: RelationshipKind::NumericCorrelation,
                },
            );
        }
    }
    out
}

fn quality_metrics(dataset: &Dataset, schema: &Schema) -> QualityMetrics {
    let cells = dataset.row_count() * dataset.column_count();
    let null_percentage = if cells == 0 {
        0.0
    } else {
        dataset.null_count() as f64 / cells as f64 * 100.0
    };

    QualityMetrics {
        total_rows: dataset.row_count(),
        total_columns: dataset.column_count(),
        null_percentage,
        duplicate_rows: dataset.duplicate_row_count(),
        column_types: schema
            .iter()
            .map(|c| (c.name.clone(), c.semantic_type))
            .collect(),
    }
}

// ============================================================================
// Regex Patterns
// ============================================================================

static DATE_STRING_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("Invalid regex"),
        Regex::new(r"^\d{2}/\d{2}/\d{4}").expect("Invalid regex"),
        Regex::new(r"^\d{2}-\d{2}-\d{4}").expect("Invalid regex"),
        Regex::new(r"^\d{2}\.\d{2}\.\d{4}").expect("Invalid regex"),
    ]
});

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use polars::prelude::{df, NamedFrom, Series};

    fn employees() -> Dataset {
        Dataset::new(
            df! {
                "age" => &[25i64, 30, 35, 40, 45],
                "salary" => &[50000.0f64, 60000.0, 70000.0, 80000.0, 90000.0],
                "department" => &["IT", "HR", "IT", "Finance", "HR"],
                "experience" => &[2.0f64, 5.0, 8.0, 12.0, 15.0],
            }
            .unwrap(),
        )
        .unwrap()
    }

    fn floats(name: &str, values: &[f64]) -> Column {
        Series::new(name.into(), values).into()
    }

    fn texts(name: &str, values: &[&str]) -> Column {
        Series::new(name.into(), values).into()
    }

    #[test]
    fn test_every_column_has_one_schema_entry() {
        let ds = employees();
        let analysis = analyze(&ds);
        let names: Vec<&str> = analysis.schema.names().collect();
        assert_eq!(names, ds.column_names());
    }

    #[test]
    fn test_numeric_type_and_stats() {
        let analysis = analyze(&employees());
        let salary = analysis.schema.get("salary").unwrap();
        assert_eq!(salary.semantic_type, SemanticType::Numeric);
        assert_eq!(salary.unique_count, 5);

        let ColumnStatistics::Numeric(stats) = &salary.statistics else {
            panic!("expected numeric stats");
        };
        assert_eq!(stats.mean, 70000.0);
        assert_eq!(stats.median, 70000.0);
        assert_eq!(stats.q1, 60000.0);
        assert_eq!(stats.q3, 80000.0);
        assert!((stats.std - 14142.135_623_7).abs() < 1e-4);
    }

    #[test]
    fn test_binary_and_categorical_numeric() {
        let inferencer = SchemaInferencer::new();
        let flag = floats("flag", &[0.0, 1.0, 1.0, 0.0, 1.0]);
        assert_eq!(inferencer.infer_type(&flag), SemanticType::Binary);

        let rating = floats("rating", &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0, 2.0]);
        assert_eq!(inferencer.infer_type(&rating), SemanticType::CategoricalNumeric);

        let active: Column = Series::new("active".into(), &[true, false]).into();
        assert_eq!(inferencer.infer_type(&active), SemanticType::Binary);
    }

    #[test]
    fn test_categorical_and_text() {
        let inferencer = SchemaInferencer::new();
        let dept = texts("dept", &["IT", "IT", "HR", "IT", "HR"]);
        assert_eq!(inferencer.infer_type(&dept), SemanticType::Categorical);

        let names = texts("name", &["ann", "bob", "cid"]);
        assert_eq!(inferencer.infer_type(&names), SemanticType::Text);
    }

    #[test]
    fn test_date_strings() {
        let inferencer = SchemaInferencer::new();
        let dates = texts("hired", &["2024-01-05", "05/02/2023", "2023-03-01", "note"]);
        assert_eq!(inferencer.infer_type(&dates), SemanticType::DateString);

        let dotted = texts("d", &["01.02.2024", "02.02.2024", "03.02.2024"]);
        assert_eq!(inferencer.infer_type(&dotted), SemanticType::DateString);
    }

    #[test]
    fn test_datetime_and_unknown() {
        let inferencer = SchemaInferencer::new();
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let col: Column = Series::new("ts".into(), &[ts]).into();
        assert_eq!(inferencer.infer_type(&col), SemanticType::Datetime);

        let empty: Column = Series::new("nothing".into(), &[None::<f64>, None]).into();
        assert_eq!(inferencer.infer_type(&empty), SemanticType::Unknown);
    }

    #[test]
    fn test_sample_bounds_inference() {
        let mut values: Vec<f64> = vec![1.0; 10];
        values.extend((0..50).map(f64::from));
        let col = floats("x", &values);
        assert_eq!(
            SchemaInferencer::with_sample_size(10).infer_type(&col),
            SemanticType::Binary
        );
        assert_eq!(SchemaInferencer::new().infer_type(&col), SemanticType::Numeric);
    }

    #[test]
    fn test_categorical_stats() {
        let cells = column_values(&texts(
            "dept",
            &["IT", "HR", "IT", "Finance", "HR", "IT", "Ops", "Ops"],
        ));
        let present: Vec<&Value> = cells.iter().collect();
        let stats = categorical_stats(&present).unwrap();
        assert_eq!(stats.most_common, Value::from("IT"));
        assert_eq!(stats.value_counts[0], (Value::from("IT"), 3));
        assert_eq!(stats.value_counts[1], (Value::from("HR"), 2));
        assert_eq!(stats.least_common, Value::from("Finance"));
    }

    #[test]
    fn test_relationships_symmetric() {
        let analysis = analyze(&employees());
        let ab = &analysis.relationships["age_salary"];
        let ba = &analysis.relationships["salary_age"];
        assert_eq!(ab.correlation, ba.correlation);
        assert!((ab.correlation.unwrap() - 1.0).abs() < 1e-9);
        assert!(!analysis.relationships.contains_key("age_age"));
        assert!(!analysis.relationships.contains_key("age_department"));
        // 3 numeric columns -> 6 ordered pairs
        assert_eq!(analysis.relationships.len(), 6);
    }

    #[test]
    fn test_quality_metrics() {
        let ds = Dataset::new(
            df! {
                "a" => &[Some(1.0f64), Some(1.0), None],
                "b" => &["x", "x", "y"],
            }
            .unwrap(),
        )
        .unwrap();
        let analysis = analyze(&ds);
        assert_eq!(analysis.schema.get("a").unwrap().unique_count, 1);

        let quality = analysis.quality_metrics;
        assert_eq!(quality.total_rows, 3);
        assert_eq!(quality.total_columns, 2);
        assert_eq!(quality.duplicate_rows, 1);
        assert!((quality.null_percentage - 100.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_inference_is_deterministic() {
        let ds = employees();
        assert_eq!(analyze(&ds), analyze(&ds));
    }
}
