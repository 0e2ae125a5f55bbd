//! End-to-end questions against an employee CSV file.

use std::io::Write;

use askdata::dataset::from_csv_path;
use askdata::{
    Aggregation, ChartKind, ComparisonTable, ErrorKind, IntentClassifier, QueryResult, Session,
    Value,
};
use tempfile::NamedTempFile;

const EMPLOYEES: &str = "\
department,salary,age,hired
IT,50000,25,2020-03-01
HR,60000,30,2021-06-15
IT,70000,35,2019-11-30
Finance,80000,40,2022-01-10
HR,90000,45,2018-08-20
";

fn employee_session() -> (NamedTempFile, Session) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(EMPLOYEES.as_bytes()).unwrap();
    file.flush().unwrap();
    let dataset = from_csv_path(file.path()).unwrap();
    (file, Session::new(dataset, IntentClassifier::new()))
}

fn numbers(dataset: &askdata::Dataset, column: &str) -> Vec<f64> {
    askdata::dataset::numbers(dataset.column(column).unwrap())
        .unwrap()
        .into_iter()
        .flatten()
        .collect()
}

#[test]
fn test_average_salary() {
    let (_file, mut session) = employee_session();
    match session.ask("What is the average salary?") {
        QueryResult::Statistical {
            column,
            aggregation,
            value,
            display_value,
        } => {
            assert_eq!(column, "salary");
            assert_eq!(*aggregation, Aggregation::Mean);
            assert_eq!(*value, 70000.0);
            assert_eq!(*display_value, 70000.0);
        }
        other => panic!("expected statistical result, got {:?}", other),
    }
}

#[test]
fn test_filter_age_greater_than() {
    let (_file, mut session) = employee_session();
    match session.ask("Show employees where age is greater than 30") {
        QueryResult::Filter {
            row_count,
            filtered_dataset,
        } => {
            assert_eq!(*row_count, 3);
            assert_eq!(numbers(filtered_dataset, "age"), vec![35.0, 40.0, 45.0]);
            assert_eq!(filtered_dataset.column_count(), 4);
        }
        other => panic!("expected filter result, got {:?}", other),
    }
}

#[test]
fn test_filter_on_date_strings() {
    let (_file, mut session) = employee_session();
    match session.ask("employees hired above 2020-01-01") {
        QueryResult::Filter { row_count, .. } => assert_eq!(*row_count, 3),
        other => panic!("expected filter result, got {:?}", other),
    }
}

#[test]
fn test_compare_salary_by_department() {
    let (_file, mut session) = employee_session();
    match session.ask("Compare salary by department") {
        QueryResult::Comparison {
            comparison_table:
                ComparisonTable::Grouped {
                    group_by,
                    value_columns,
                    rows,
                },
        } => {
            assert_eq!(group_by, &vec!["department".to_string()]);
            assert!(value_columns.contains(&"salary".to_string()));
            assert_eq!(rows.len(), 3);
            let it = rows
                .iter()
                .find(|row| row.keys == vec![Value::from("IT")])
                .unwrap();
            assert_eq!(it.means[0], Some(60000.0));
        }
        other => panic!("expected grouped comparison, got {:?}", other),
    }
}

#[test]
fn test_bar_chart_of_salary_by_department() {
    let (_file, mut session) = employee_session();
    match session.ask("Show a bar chart of salary by department") {
        QueryResult::Visualization { chart_spec } => {
            assert_eq!(chart_spec.kind, ChartKind::Bar);
            assert_eq!(chart_spec.x.as_deref(), Some("department"));
            assert_eq!(chart_spec.y.as_deref(), Some("salary"));
        }
        other => panic!("expected visualization, got {:?}", other),
    }
}

#[test]
fn test_average_without_column() {
    let (_file, mut session) = employee_session();
    let result = session.ask("What is the average?");
    assert_eq!(result.error_kind(), Some(ErrorKind::NoColumn));
}

#[test]
fn test_unknown_question() {
    let (_file, mut session) = employee_session();
    let result = session.ask("hello there");
    assert_eq!(result.error_kind(), Some(ErrorKind::UnsupportedQuery));
}

#[test]
fn test_results_serialize_with_type_tag() {
    let (_file, mut session) = employee_session();
    let json = serde_json::to_value(session.ask("total salary")).unwrap();
    assert_eq!(json["type"], "statistical");
    assert_eq!(json["aggregation"], "sum");
    assert_eq!(json["value"], 350000.0);
}
