//! Session behaviour with configuration and similarity matching.

use std::fs;
use std::sync::Arc;

use askdata::{
    Config, Dataset, ErrorKind, IntentClassifier, QueryResult, QueryType, Result, Session,
    SimilarityScorer,
};
use polars::prelude::df;
use tempfile::TempDir;

/// Scores a fixed set of column names, everything else zero.
struct KeywordScorer(Vec<(&'static str, f32)>);

impl SimilarityScorer for KeywordScorer {
    fn similarity(&self, _query: &str, candidate: &str) -> Result<f32> {
        Ok(self
            .0
            .iter()
            .find(|(name, _)| *name == candidate)
            .map_or(0.0, |(_, score)| *score))
    }
}

fn employees() -> Dataset {
    Dataset::new(
        df! {
            "department" => &["IT", "HR", "IT", "Finance", "HR"],
            "salary" => &[50000.0f64, 60000.0, 70000.0, 80000.0, 90000.0],
            "age" => &[25i64, 30, 35, 40, 45],
        }
        .unwrap(),
    )
    .unwrap()
}

#[test]
fn test_config_file_drives_session() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("askdata.toml");
    fs::write(
        &path,
        r#"
[session]
max_history = 2

[output]
decimal_places = 0
"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    let mut session = Session::with_config(employees(), IntentClassifier::new(), &config);

    match session.ask("average age") {
        QueryResult::Statistical {
            value,
            display_value,
            ..
        } => {
            assert_eq!(*value, 35.0);
            assert_eq!(*display_value, 35.0);
        }
        other => panic!("expected statistical result, got {:?}", other),
    }

    session.ask("total salary");
    session.ask("lowest age");
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history()[0].query, "total salary");
}

#[test]
fn test_similarity_finds_unnamed_column() {
    let scorer = Arc::new(KeywordScorer(vec![("salary", 0.91), ("age", 0.2)]));
    let classifier = IntentClassifier::with_similarity(scorer, 0.7);
    let mut session = Session::new(employees(), classifier);

    match session.ask("what do people earn on average") {
        QueryResult::Statistical { column, value, .. } => {
            assert_eq!(column, "salary");
            assert_eq!(*value, 70000.0);
        }
        other => panic!("expected statistical result, got {:?}", other),
    }

    // Without a scorer the same question names no column.
    let mut exact = Session::new(employees(), IntentClassifier::new());
    let kind = exact.ask("what do people earn on average").error_kind();
    assert_eq!(kind, Some(ErrorKind::NoColumn));
}

#[test]
fn test_chart_override_and_history_json() {
    let mut session = Session::new(employees(), IntentClassifier::new());

    match session.ask_with_chart("salary by department", "pie") {
        QueryResult::Visualization { chart_spec } => {
            assert_eq!(chart_spec.names.as_deref(), Some("department"));
            assert_eq!(chart_spec.values.as_deref(), Some("salary"));
        }
        other => panic!("expected visualization, got {:?}", other),
    }
    let last = session.last().unwrap();
    assert_eq!(last.intent.query_type, QueryType::Visualization);

    let json = serde_json::to_value(session.history()).unwrap();
    assert_eq!(json[0]["query"], "salary by department");
    assert_eq!(json[0]["result"]["type"], "visualization");
    assert_eq!(json[0]["result"]["chart_spec"]["kind"], "pie");
}

#[test]
fn test_intent_is_not_recorded() {
    let session = Session::new(employees(), IntentClassifier::new());
    let intent = session.classify("Show employees where age is greater than 30");
    assert_eq!(intent.query_type, QueryType::Filter);
    assert_eq!(intent.columns, vec!["age"]);
    assert_eq!(intent.conditions.len(), 1);
    assert!(session.history().is_empty());
}
