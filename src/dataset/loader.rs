//! CSV loading through the polars CSV reader.
//!
//! Column dtypes come from polars schema inference over the leading rows.
//! Date parsing is left off, so dates stay text and schema inference can
//! classify them as date strings.

use std::io::{Cursor, Read};
use std::path::Path;

use polars::prelude::*;

use super::Dataset;
use crate::error::DatasetError;

/// Rows read to infer column dtypes.
const INFER_SCHEMA_ROWS: usize = 1000;

/// Cell spellings read as missing values.
const NULL_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Load a dataset from a CSV file with a header row.
pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Dataset, DatasetError> {
    let frame = read_options()
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;
    loaded(frame)
}

/// Load a dataset from any CSV source with a header row.
pub fn from_csv_reader<R: Read>(mut source: R) -> Result<Dataset, DatasetError> {
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    let frame = read_options()
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;
    loaded(frame)
}

fn read_options() -> CsvReadOptions {
    let null_values = NullValues::AllColumns(NULL_MARKERS.iter().map(|m| (*m).into()).collect());
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .map_parse_options(|options| {
            options
                .with_null_values(Some(null_values.clone()))
                .with_try_parse_dates(false)
        })
}

fn loaded(frame: DataFrame) -> Result<Dataset, DatasetError> {
    let dataset = Dataset::new(frame)?;
    tracing::debug!(
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "Loaded CSV dataset"
    );
    Ok(dataset)
}
