//! Types for the natural language query system.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Value};

// ============================================================================
// Query Type
// ============================================================================

/// High-level kind of question being asked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// A single aggregate over one column
    Statistical,
    /// Rows matching one or more conditions
    Filter,
    /// Several columns side by side, optionally grouped
    Comparison,
    /// A chart specification
    Visualization,
    /// Nothing recognisable
    #[default]
    Unknown,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Statistical => "statistical",
            Self::Filter => "filter",
            Self::Comparison => "comparison",
            Self::Visualization => "visualization",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Reducing function for statistical queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Mean,
    Sum,
    Count,
    Min,
    Max,
    Median,
}

impl Aggregation {
    /// Aggregation used when a statistical query names none.
    pub const DEFAULT: Aggregation = Aggregation::Max;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
            Self::Median => "median",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregation {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mean" | "average" | "avg" => Ok(Self::Mean),
            "sum" | "total" => Ok(Self::Sum),
            "count" => Ok(Self::Count),
            "min" | "minimum" => Ok(Self::Min),
            "max" | "maximum" => Ok(Self::Max),
            "median" => Ok(Self::Median),
            other => Err(QueryError::new(
                ErrorKind::ExecutionError,
                format!(
                    "Aggregation '{}' is not supported. Use mean, sum, count, min, max or median.",
                    other
                ),
            )),
        }
    }
}

// ============================================================================
// Chart Kind
// ============================================================================

/// Kind of chart a visualization query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Scatter,
    Histogram,
}

impl ChartKind {
    /// Chart used when a visualization query names none.
    pub const DEFAULT: ChartKind = ChartKind::Bar;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
            Self::Scatter => "scatter",
            Self::Histogram => "histogram",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" | "bars" | "bar chart" => Ok(Self::Bar),
            "line" | "line chart" => Ok(Self::Line),
            "pie" | "pie chart" => Ok(Self::Pie),
            "scatter" | "scatter plot" => Ok(Self::Scatter),
            "histogram" => Ok(Self::Histogram),
            other => Err(QueryError::new(
                ErrorKind::UnsupportedChartType,
                format!(
                    "Chart type '{}' is not supported. Try bar, line, pie, scatter, or histogram.",
                    other
                ),
            )),
        }
    }
}

// ============================================================================
// Conditions
// ============================================================================

/// Comparison operator of a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "between")]
    Between,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::Equal => "==",
            Self::Between => "between",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            ">" | "gt" => Ok(Self::GreaterThan),
            "<" | "lt" => Ok(Self::LessThan),
            "==" | "=" | "eq" => Ok(Self::Equal),
            "between" => Ok(Self::Between),
            other => Err(QueryError::new(
                ErrorKind::UnsupportedOperator,
                format!(
                    "Operator '{}' is not supported. Use \"greater than\", \"less than\", \"equal to\" or \"between\".",
                    other
                ),
            )),
        }
    }
}

/// A literal extracted from query text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", Value::Number(*n)),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Right-hand side of a condition: one literal, or an inclusive range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Range(Literal, Literal),
    Single(Literal),
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(lit) => write!(f, "{}", lit),
            Self::Range(low, high) => write!(f, "{} and {}", low, high),
        }
    }
}

/// One filter condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: ConditionValue,
}

impl Condition {
    pub fn new(column: impl Into<String>, operator: Operator, value: ConditionValue) -> Self {
        Self {
            column: column.into(),
            operator,
            value,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.operator, self.value)
    }
}

// ============================================================================
// Query Intent
// ============================================================================

/// Structured reading of a natural language question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub query_type: QueryType,
    /// Mentioned columns in schema order, without duplicates
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization_type: Option<ChartKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<String>>,
}

impl QueryIntent {
    pub fn new(query_type: QueryType) -> Self {
        Self {
            query_type,
            ..Default::default()
        }
    }

    pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    pub fn with_visualization(mut self, kind: ChartKind) -> Self {
        self.visualization_type = Some(kind);
        self
    }

    pub fn with_group_by<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.group_by = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Machine-checkable reason a query could not be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NoColumn,
    ColumnNotFound,
    InvalidFilter,
    InsufficientColumns,
    UnsupportedOperator,
    UnsupportedChartType,
    UnsupportedQuery,
    ExecutionError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoColumn => "NoColumn",
            Self::ColumnNotFound => "ColumnNotFound",
            Self::InvalidFilter => "InvalidFilter",
            Self::InsufficientColumns => "InsufficientColumns",
            Self::UnsupportedOperator => "UnsupportedOperator",
            Self::UnsupportedChartType => "UnsupportedChartType",
            Self::UnsupportedQuery => "UnsupportedQuery",
            Self::ExecutionError => "ExecutionError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed query: kind plus a message meant for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryError {
    pub kind: ErrorKind,
    pub message: String,
}

impl QueryError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn column_not_found(column: &str) -> Self {
        Self::new(
            ErrorKind::ColumnNotFound,
            format!("Column '{}' does not exist in the data.", column),
        )
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExecutionError, message)
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for QueryError {}

// ============================================================================
// Query Result
// ============================================================================

/// Comparison output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum ComparisonTable {
    /// Mean of each value column within each group.
    Grouped {
        group_by: Vec<String>,
        value_columns: Vec<String>,
        rows: Vec<GroupRow>,
    },
    /// Descriptive statistics per column.
    Describe {
        columns: Vec<String>,
        /// One row per statistic, one value per column.
        rows: Vec<DescribeRow>,
    },
}

impl ComparisonTable {
    /// Number of data rows (groups or statistics).
    pub fn len(&self) -> usize {
        match self {
            Self::Grouped { rows, .. } => rows.len(),
            Self::Describe { rows, .. } => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    pub keys: Vec<Value>,
    /// `None` when the group has no non-null values for that column.
    pub means: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeRow {
    pub statistic: String,
    pub values: Vec<Option<f64>>,
}

/// Declarative chart: kind plus column bindings. Never rendered here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    /// Pie slice labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<String>,
    /// Pie slice sizes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<String>,
}

/// Outcome of executing one intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryResult {
    Statistical {
        column: String,
        aggregation: Aggregation,
        /// Unrounded value
        value: f64,
        /// `value` rounded for display
        display_value: f64,
    },
    Filter {
        row_count: usize,
        filtered_dataset: Dataset,
    },
    Comparison {
        comparison_table: ComparisonTable,
    },
    Visualization {
        chart_spec: ChartSpec,
    },
    Error {
        error_kind: ErrorKind,
        message: String,
    },
}

impl QueryResult {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            error_kind: kind,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Error { error_kind, .. } => Some(*error_kind),
            _ => None,
        }
    }

    /// Tag of the result, as serialized.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Statistical { .. } => "statistical",
            Self::Filter { .. } => "filter",
            Self::Comparison { .. } => "comparison",
            Self::Visualization { .. } => "visualization",
            Self::Error { .. } => "error",
        }
    }

    /// Human-readable summary.
    pub fn message(&self) -> String {
        match self {
            Self::Statistical {
                column,
                aggregation,
                display_value,
                ..
            } => format!("The {} of {} is {:.2}", aggregation, column, display_value),
            Self::Filter { row_count, .. } => {
                format!("Found {} rows matching the criteria", row_count)
            }
            Self::Comparison { comparison_table } => match comparison_table {
                ComparisonTable::Grouped {
                    group_by,
                    value_columns,
                    ..
                } => format!(
                    "Comparison of {} grouped by {}",
                    value_columns.join(", "),
                    group_by.join(", ")
                ),
                ComparisonTable::Describe { columns, .. } => {
                    format!("Comparison of {}", columns.join(", "))
                }
            },
            Self::Visualization { chart_spec } => format!("Created {}", chart_spec.title),
            Self::Error { message, .. } => message.clone(),
        }
    }
}

impl From<QueryError> for QueryResult {
    fn from(err: QueryError) -> Self {
        Self::Error {
            error_kind: err.kind,
            message: err.message,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
