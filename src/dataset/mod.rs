//! Tabular data backed by a polars [`DataFrame`].
//!
//! A [`Dataset`] is read-only once built; filtering produces a new dataset.
//! Cells are read out as [`Value`]s for display, grouping keys and counting.

mod loader;
mod value;

pub use loader::{from_csv_path, from_csv_reader};
pub use value::{ColumnKind, Value};

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Ordered collection of equally long, uniquely named columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "DatasetRecords", into = "DatasetRecords")]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    /// Wrap a frame. Polars already guarantees unique names and equal lengths.
    pub fn new(frame: DataFrame) -> Result<Self, DatasetError> {
        if let Some(position) = frame
            .get_column_names()
            .iter()
            .position(|name| name.trim().is_empty())
        {
            return Err(DatasetError::EmptyColumnName(position));
        }
        Ok(Self { frame })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn columns(&self) -> &[Column] {
        self.frame.get_columns()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.frame.column(name).ok()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns().iter().map(|c| c.name().as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.frame.height()
    }

    pub fn column_count(&self) -> usize {
        self.frame.width()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Values of one row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<Value>> {
        if index >= self.row_count() {
            return None;
        }
        self.columns()
            .iter()
            .map(|c| c.get(index).ok().map(Value::from))
            .collect()
    }

    /// New dataset holding the rows where `mask` is true. Null mask entries drop the row.
    pub fn filter(&self, mask: &BooleanChunked) -> Result<Self, DatasetError> {
        Ok(Self {
            frame: self.frame.filter(mask)?,
        })
    }

    /// Total number of null cells.
    pub fn null_count(&self) -> usize {
        self.columns().iter().map(|c| c.null_count()).sum()
    }

    /// Number of rows identical to some earlier row.
    pub fn duplicate_row_count(&self) -> usize {
        if self.frame.width() == 0 || self.frame.height() == 0 {
            return 0;
        }
        match self
            .frame
            .unique_stable(None, UniqueKeepStrategy::First, None)
        {
            Ok(unique) => self.frame.height() - unique.height(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not count duplicate rows");
                0
            }
        }
    }
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.frame.get_column_names() == other.frame.get_column_names()
            && self.frame.equals_missing(&other.frame)
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self {
            frame: DataFrame::empty(),
        }
    }
}

/// All cells of a column in row order.
pub fn column_values(column: &Column) -> Vec<Value> {
    let series = column.as_materialized_series().rechunk();
    series.iter().map(Value::from).collect()
}

/// The column as floats. `None` unless it holds numbers, booleans or only nulls.
pub fn numbers(column: &Column) -> Option<Float64Chunked> {
    match ColumnKind::of_column(column) {
        ColumnKind::Number | ColumnKind::Boolean | ColumnKind::Empty => {
            let cast = column
                .as_materialized_series()
                .cast(&DataType::Float64)
                .ok()?;
            cast.f64().ok().cloned()
        }
        _ => None,
    }
}

// ============================================================================
// Serialized Form
// ============================================================================

/// Column names plus row-major cells, the shape results are serialized in.
#[derive(Serialize, Deserialize)]
struct DatasetRecords {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl From<Dataset> for DatasetRecords {
    fn from(dataset: Dataset) -> Self {
        let cells: Vec<Vec<Value>> = dataset.columns().iter().map(column_values).collect();
        let rows = (0..dataset.row_count())
            .map(|i| cells.iter().map(|column| column[i].clone()).collect())
            .collect();
        Self {
            columns: dataset.column_names().iter().map(|s| s.to_string()).collect(),
            rows,
        }
    }
}

impl TryFrom<DatasetRecords> for Dataset {
    type Error = DatasetError;

    fn try_from(records: DatasetRecords) -> Result<Self, Self::Error> {
        let width = records.columns.len();
        if let Some(row) = records.rows.iter().find(|row| row.len() != width) {
            return Err(DatasetError::RowWidth {
                expected: width,
                got: row.len(),
            });
        }

        let columns = records
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let values: Vec<Value> = records.rows.iter().map(|row| row[i].clone()).collect();
                column_from_values(name, &values)
            })
            .collect();
        Dataset::new(DataFrame::new(columns)?)
    }
}

fn column_from_values(name: &str, values: &[Value]) -> Column {
    let name = PlSmallStr::from(name);
    match ColumnKind::of(values) {
        ColumnKind::Number => Column::new(name, values.iter().map(Value::as_f64).collect::<Vec<_>>()),
        ColumnKind::Boolean => Column::new(
            name,
            values
                .iter()
                .map(|v| match v {
                    Value::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        ),
        ColumnKind::DateTime => Column::new(
            name,
            values
                .iter()
                .map(|v| match v {
                    Value::DateTime(dt) => Some(*dt),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        ),
        ColumnKind::Empty => Column::full_null(name, values.len(), &DataType::String),
        ColumnKind::Text | ColumnKind::Mixed => Column::new(
            name,
            values
                .iter()
                .map(|v| (!v.is_null()).then(|| v.to_string()))
                .collect::<Vec<_>>(),
        ),
    }
}
