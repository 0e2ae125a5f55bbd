//! Query Executor.
//!
//! Runs a [`QueryIntent`] against a [`Dataset`] and returns a typed
//! [`QueryResult`]. Every failure is reported as an error result carrying an
//! [`ErrorKind`] and a message for the user; nothing is raised to the caller.

use std::cmp::Ordering;

use chrono::NaiveDate;
use polars::prelude::{
    col, BooleanChunked, ChunkAgg, ChunkFull, ChunkQuantile, Column, DataType, Float64Chunked,
    IntoLazy, StringChunked,
};

use super::types::*;
use crate::dataset::{column_values, numbers, ColumnKind, Dataset, Value};
use crate::stats;

/// Decimal places used for `display_value` unless configured otherwise.
pub const DEFAULT_DECIMAL_PLACES: u32 = 2;

const DATE_TEXT_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

const DESCRIBE_STATISTICS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

// ============================================================================
// Query Executor
// ============================================================================

/// Executes structured intents against a dataset.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    decimal_places: u32,
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryExecutor {
    pub fn new() -> Self {
        Self {
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }

    /// Round statistical display values to `places` decimals.
    pub fn with_decimal_places(places: u32) -> Self {
        Self {
            decimal_places: places,
        }
    }

    /// Execute an intent. Always returns exactly one result.
    pub fn execute(&self, dataset: &Dataset, intent: &QueryIntent) -> QueryResult {
        let outcome = match intent.query_type {
            QueryType::Statistical => self.execute_statistical(dataset, intent),
            QueryType::Filter => self.execute_filter(dataset, intent),
            QueryType::Comparison => self.execute_comparison(dataset, intent),
            QueryType::Visualization => self.execute_visualization(dataset, intent),
            QueryType::Unknown => Err(QueryError::new(
                ErrorKind::UnsupportedQuery,
                "I could not tell what you are asking. Ask for a statistic (\"average salary\"), \
                 a filter (\"age greater than 30\"), a comparison (\"compare salary by department\") \
                 or a chart (\"bar chart of salary by department\").",
            )),
        };

        match outcome {
            Ok(result) => {
                tracing::debug!(result_type = result.type_name(), "Query executed");
                result
            }
            Err(err) => {
                tracing::debug!(kind = %err.kind, message = %err.message, "Query failed");
                err.into()
            }
        }
    }

    // ========================================================================
    // Statistical
    // ========================================================================

    fn execute_statistical(
        &self,
        dataset: &Dataset,
        intent: &QueryIntent,
    ) -> Result<QueryResult, QueryError> {
        let name = intent.columns.first().ok_or_else(|| {
            QueryError::new(
                ErrorKind::NoColumn,
                "Please specify which column to analyze, for example \"average salary\".",
            )
        })?;
        let column = lookup(dataset, name)?;
        let aggregation = intent.aggregation.unwrap_or(Aggregation::DEFAULT);

        let value = if aggregation == Aggregation::Count {
            dataset.row_count() as f64
        } else {
            let values = numeric_column(column, aggregation.as_str())?;
            let computed = if stats::count(&values) == 0 {
                None
            } else {
                match aggregation {
                    Aggregation::Mean => values.mean(),
                    Aggregation::Sum => values.sum(),
                    Aggregation::Min => values.min(),
                    Aggregation::Max => values.max(),
                    Aggregation::Median => values.median(),
                    Aggregation::Count => None,
                }
            };
            computed.ok_or_else(|| {
                QueryError::execution(format!(
                    "Column '{}' has no values to compute the {} of.",
                    name, aggregation
                ))
            })?
        };

        Ok(QueryResult::Statistical {
            column: name.clone(),
            aggregation,
            value,
            display_value: stats::round_to(value, self.decimal_places),
        })
    }

    // ========================================================================
    // Filter
    // ========================================================================

    fn execute_filter(
        &self,
        dataset: &Dataset,
        intent: &QueryIntent,
    ) -> Result<QueryResult, QueryError> {
        if intent.columns.is_empty() || intent.conditions.is_empty() {
            return Err(QueryError::new(
                ErrorKind::InvalidFilter,
                "Please specify both a column and a condition, for example \"age greater than 30\".",
            ));
        }

        // Validate every condition before narrowing anything.
        let columns = intent
            .conditions
            .iter()
            .map(|c| lookup(dataset, &c.column))
            .collect::<Result<Vec<_>, _>>()?;

        let mut mask = BooleanChunked::full("mask".into(), true, dataset.row_count());
        for (condition, column) in intent.conditions.iter().zip(columns) {
            mask = &mask & &condition_mask(column, condition)?;
        }

        let filtered = dataset
            .filter(&mask)
            .map_err(|e| QueryError::execution(format!("Could not filter the data: {}", e)))?;
        Ok(QueryResult::Filter {
            row_count: filtered.row_count(),
            filtered_dataset: filtered,
        })
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    fn execute_comparison(
        &self,
        dataset: &Dataset,
        intent: &QueryIntent,
    ) -> Result<QueryResult, QueryError> {
        if intent.columns.len() < 2 {
            return Err(QueryError::new(
                ErrorKind::InsufficientColumns,
                "Please mention at least two columns to compare, for example \"compare salary by department\".",
            ));
        }
        for name in &intent.columns {
            lookup(dataset, name)?;
        }

        let table = match intent.group_by.as_deref() {
            Some(group_by) if !group_by.is_empty() => grouped_means(dataset, intent, group_by)?,
            _ => describe(dataset, &intent.columns)?,
        };

        Ok(QueryResult::Comparison {
            comparison_table: table,
        })
    }

    // ========================================================================
    // Visualization
    // ========================================================================

    fn execute_visualization(
        &self,
        dataset: &Dataset,
        intent: &QueryIntent,
    ) -> Result<QueryResult, QueryError> {
        let columns = &intent.columns;
        if columns.is_empty() {
            return Err(QueryError::new(
                ErrorKind::NoColumn,
                "Please specify which columns to visualize, for example \"bar chart of salary by department\".",
            ));
        }
        for name in columns {
            lookup(dataset, name)?;
        }

        let kind = intent.visualization_type.unwrap_or(ChartKind::DEFAULT);
        let first = Some(columns[0].clone());
        let second = columns.get(1).cloned();

        let (x, y, names, values) = match kind {
            ChartKind::Bar | ChartKind::Line => (first, second, None, None),
            ChartKind::Pie => (None, None, first, second),
            ChartKind::Histogram => (first, None, None, None),
            ChartKind::Scatter => {
                if second.is_none() {
                    return Err(QueryError::new(
                        ErrorKind::InsufficientColumns,
                        "A scatter plot needs two columns, for example \"scatter plot of age and salary\".",
                    ));
                }
                (first, second, None, None)
            }
        };

        let bound: Vec<&str> = [&x, &y, &names, &values]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        let label = match kind {
            ChartKind::Histogram => "histogram".to_string(),
            ChartKind::Scatter => "scatter plot".to_string(),
            other => format!("{} chart", other),
        };

        Ok(QueryResult::Visualization {
            chart_spec: ChartSpec {
                kind,
                title: format!("{} for {}", label, bound.join(", ")),
                x,
                y,
                names,
                values,
            },
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn lookup<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a Column, QueryError> {
    dataset
        .column(name)
        .ok_or_else(|| QueryError::column_not_found(name))
}

fn numeric_column(column: &Column, purpose: &str) -> Result<Float64Chunked, QueryError> {
    numbers(column).ok_or_else(|| {
        QueryError::execution(format!(
            "Column '{}' holds {} values; the {} needs numbers.",
            column.name(),
            ColumnKind::of_column(column).as_str(),
            purpose
        ))
    })
}

/// Rows of `column` that satisfy `condition`.
fn condition_mask(column: &Column, condition: &Condition) -> Result<BooleanChunked, QueryError> {
    let name = column.name().as_str();
    match (condition.operator, &condition.value) {
        (Operator::Between, ConditionValue::Range(low, high)) => {
            let lower = literal_mask(column, low, |o| o != Ordering::Less)?;
            let upper = literal_mask(column, high, |o| o != Ordering::Greater)?;
            Ok(&lower & &upper)
        }
        (Operator::Between, ConditionValue::Single(_)) => Err(QueryError::new(
            ErrorKind::UnsupportedOperator,
            format!(
                "'between' on '{}' needs two bounds, for example \"{} between 30 and 40\".",
                name, name
            ),
        )),
        (operator, ConditionValue::Range(..)) => Err(QueryError::new(
            ErrorKind::UnsupportedOperator,
            format!(
                "'{}' takes a single value; use \"between\" for a range.",
                operator
            ),
        )),
        (operator, ConditionValue::Single(literal)) => {
            let wanted = match operator {
                Operator::GreaterThan => Ordering::Greater,
                Operator::LessThan => Ordering::Less,
                Operator::Equal | Operator::Between => Ordering::Equal,
            };
            literal_mask(column, literal, |o| o == wanted)
        }
    }
}

/// True where the cell's order against `literal` passes `keep`.
/// Null and unparseable cells are false.
fn literal_mask(
    column: &Column,
    literal: &Literal,
    keep: impl Fn(Ordering) -> bool,
) -> Result<BooleanChunked, QueryError> {
    let kind = ColumnKind::of_column(column);
    let mask: BooleanChunked = match (kind, literal) {
        (ColumnKind::Empty, _) => BooleanChunked::full(column.name().clone(), false, column.len()),
        (ColumnKind::Number | ColumnKind::Boolean, Literal::Number(n)) => {
            let values = numeric_column(column, "comparison")?;
            values
                .into_iter()
                .map(|x| x.and_then(|x| x.partial_cmp(n)).is_some_and(&keep))
                .collect()
        }
        (ColumnKind::DateTime, Literal::Date(d)) => column_values(column)
            .iter()
            .map(|cell| match cell {
                Value::DateTime(dt) => keep(dt.date().cmp(d)),
                _ => false,
            })
            .collect(),
        (ColumnKind::Text, Literal::Date(d)) => text_cells(column)?
            .into_iter()
            .map(|s| s.and_then(parse_date_text).is_some_and(|date| keep(date.cmp(d))))
            .collect(),
        (ColumnKind::Text, Literal::Text(t)) => {
            let t = t.to_lowercase();
            text_cells(column)?
                .into_iter()
                .map(|s| s.is_some_and(|s| keep(s.to_lowercase().cmp(&t))))
                .collect()
        }
        _ => {
            return Err(QueryError::execution(format!(
                "Column '{}' holds {} values and cannot be compared with {}.",
                column.name(),
                kind.as_str(),
                literal
            )))
        }
    };
    Ok(mask)
}

fn text_cells(column: &Column) -> Result<&StringChunked, QueryError> {
    column.str().map_err(|e| {
        QueryError::execution(format!("Column '{}' is not readable as text: {}", column.name(), e))
    })
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let head = text.get(..10).unwrap_or(text);
    DATE_TEXT_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(text, format)
            .or_else(|_| NaiveDate::parse_from_str(head, format))
            .ok()
    })
}

/// Mean of every non-group column within each group, groups in first-seen order.
fn grouped_means(
    dataset: &Dataset,
    intent: &QueryIntent,
    group_by: &[String],
) -> Result<ComparisonTable, QueryError> {
    for name in group_by {
        lookup(dataset, name)?;
    }

    let value_names: Vec<String> = intent
        .columns
        .iter()
        .filter(|c| !group_by.contains(c))
        .cloned()
        .collect();
    if value_names.is_empty() {
        return Err(QueryError::new(
            ErrorKind::InsufficientColumns,
            format!(
                "Please mention a column to compare across {}, for example \"compare salary by {}\".",
                group_by.join(", "),
                group_by[0]
            ),
        ));
    }

    for name in &value_names {
        let kind = ColumnKind::of_column(lookup(dataset, name)?);
        if !matches!(kind, ColumnKind::Number | ColumnKind::Boolean | ColumnKind::Empty) {
            return Err(QueryError::execution(format!(
                "Column '{}' holds {} values; averages need numbers.",
                name,
                kind.as_str()
            )));
        }
    }

    let mut frame = dataset.frame().clone().lazy();
    for name in group_by {
        frame = frame.filter(col(name.as_str()).is_not_null());
    }
    let grouped = frame
        .group_by_stable(group_by.iter().map(|name| col(name.as_str())).collect::<Vec<_>>())
        .agg(
            value_names
                .iter()
                .map(|name| col(name.as_str()).cast(DataType::Float64).mean())
                .collect::<Vec<_>>(),
        )
        .collect()
        .map_err(|e| QueryError::execution(format!("Could not group the data: {}", e)))?;

    let output = |name: &String| {
        grouped
            .column(name)
            .map_err(|e| QueryError::execution(e.to_string()))
    };
    let keys = group_by.iter().map(output).collect::<Result<Vec<_>, _>>()?;
    let means = value_names.iter().map(output).collect::<Result<Vec<_>, _>>()?;

    let rows = (0..grouped.height())
        .map(|i| GroupRow {
            keys: keys
                .iter()
                .map(|c| c.get(i).map(Value::from).unwrap_or(Value::Null))
                .collect(),
            means: means
                .iter()
                .map(|c| c.get(i).ok().and_then(|v| v.extract::<f64>()))
                .collect(),
        })
        .collect();

    Ok(ComparisonTable::Grouped {
        group_by: group_by.to_vec(),
        value_columns: value_names,
        rows,
    })
}

/// Count, mean, sample std, min, quartiles and max per column.
fn describe(dataset: &Dataset, names: &[String]) -> Result<ComparisonTable, QueryError> {
    let samples = names
        .iter()
        .map(|name| numeric_column(lookup(dataset, name)?, "comparison"))
        .collect::<Result<Vec<_>, _>>()?;

    let rows = DESCRIBE_STATISTICS
        .iter()
        .map(|statistic| DescribeRow {
            statistic: statistic.to_string(),
            values: samples
                .iter()
                .map(|values| match *statistic {
                    "count" => Some(stats::count(values) as f64),
                    "mean" => values.mean(),
                    "std" => stats::std_dev(values, 1),
                    "min" => values.min(),
                    "25%" => stats::quantile(values, 0.25),
                    "50%" => values.median(),
                    "75%" => stats::quantile(values, 0.75),
                    _ => values.max(),
                })
                .collect(),
        })
        .collect();

    Ok(ComparisonTable::Describe {
        columns: names.to_vec(),
        rows,
    })
}

// ============================================================================
// Tests
// ============================================================================
