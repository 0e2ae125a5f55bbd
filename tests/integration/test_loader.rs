//! CSV loading and schema inference on files.

use std::io::Write;

use askdata::dataset::{column_values, from_csv_path};
use askdata::{analyze, ColumnKind, Dataset, DatasetError, SemanticType, Value};
use tempfile::NamedTempFile;

fn kind(dataset: &Dataset, name: &str) -> ColumnKind {
    ColumnKind::of_column(dataset.column(name).unwrap())
}

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_and_analyze_mixed_columns() {
    let file = write_csv(
        "id,name,active,joined,score\n\
         1,Alice,true,2024-01-15,3.5\n\
         2,Bob,false,2024-02-20,\n\
         3,Carol,true,2024-03-05,4.25\n",
    );

    let dataset = from_csv_path(file.path()).unwrap();
    assert_eq!(dataset.row_count(), 3);
    assert_eq!(
        dataset.column_names(),
        vec!["id", "name", "active", "joined", "score"]
    );
    assert_eq!(kind(&dataset, "active"), ColumnKind::Boolean);
    assert_eq!(kind(&dataset, "joined"), ColumnKind::Text);
    assert_eq!(column_values(dataset.column("score").unwrap())[1], Value::Null);

    let analysis = analyze(&dataset);
    let types = &analysis.quality_metrics.column_types;
    assert_eq!(types["active"], SemanticType::Binary);
    assert_eq!(types["joined"], SemanticType::DateString);
    assert_eq!(analysis.quality_metrics.total_rows, 3);
    assert_eq!(analysis.quality_metrics.total_columns, 5);
    assert_eq!(analysis.schema.get("score").unwrap().null_count, 1);
}

#[test]
fn test_missing_file_is_frame_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = from_csv_path(dir.path().join("missing.csv")).unwrap_err();
    assert!(matches!(err, DatasetError::Polars(_)));
}

#[test]
fn test_null_markers_count_as_missing() {
    let file = write_csv("city,population\nOslo,NA\nBergen,285000\nN/A,NULL\n");
    let dataset = from_csv_path(file.path()).unwrap();
    assert_eq!(kind(&dataset, "population"), ColumnKind::Number);

    let schema = analyze(&dataset).schema;
    assert_eq!(schema.get("population").unwrap().null_count, 2);
    assert_eq!(schema.get("city").unwrap().null_count, 1);
}
