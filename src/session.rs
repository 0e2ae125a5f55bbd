//! Per-session state: one dataset, its analysis and the questions asked so far.

use std::collections::VecDeque;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::query::{
    ChartKind, IntentClassifier, QueryExecutor, QueryIntent, QueryResult, QueryType,
};
use crate::schema::{DataAnalysis, SchemaInferencer};

/// Default number of history entries kept.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// One answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub intent: QueryIntent,
    pub result: QueryResult,
    pub timestamp: DateTime<Utc>,
    /// Time spent classifying and executing
    pub elapsed_ms: u64,
}

/// A dataset plus the in-memory history of questions asked about it.
///
/// The dataset and its analysis never change for the life of the session.
#[derive(Debug)]
pub struct Session {
    dataset: Dataset,
    analysis: DataAnalysis,
    classifier: IntentClassifier,
    executor: QueryExecutor,
    history: VecDeque<HistoryEntry>,
    max_history: usize,
}

impl Session {
    /// Start a session, analysing the dataset once.
    pub fn new(dataset: Dataset, classifier: IntentClassifier) -> Self {
        let analysis = SchemaInferencer::new().analyze(&dataset);
        Self::assemble(dataset, analysis, classifier, QueryExecutor::new(), DEFAULT_MAX_HISTORY)
    }

    /// Start a session using the sample size, history bound and rounding from `config`.
    pub fn with_config(dataset: Dataset, classifier: IntentClassifier, config: &Config) -> Self {
        let analysis =
            SchemaInferencer::with_sample_size(config.classifier.sample_size).analyze(&dataset);
        Self::assemble(
            dataset,
            analysis,
            classifier,
            QueryExecutor::with_decimal_places(config.output.decimal_places),
            config.session.max_history,
        )
    }

    fn assemble(
        dataset: Dataset,
        analysis: DataAnalysis,
        classifier: IntentClassifier,
        executor: QueryExecutor,
        max_history: usize,
    ) -> Self {
        tracing::info!(
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "Session started"
        );
        Self {
            dataset,
            analysis,
            classifier,
            executor,
            history: VecDeque::new(),
            max_history: max_history.max(1),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn analysis(&self) -> &DataAnalysis {
        &self.analysis
    }

    /// Intent for `text` without executing or recording it.
    pub fn classify(&self, text: &str) -> QueryIntent {
        self.classifier.classify(text, &self.analysis)
    }

    /// Classify and execute `text`, recording the outcome in history.
    pub fn ask(&mut self, text: &str) -> &QueryResult {
        let started = Instant::now();
        let intent = self.classify(text);
        let result = self.executor.execute(&self.dataset, &intent);
        self.record(text, intent, result, started)
    }

    /// Like [`ask`](Self::ask), but answer with the named chart kind.
    ///
    /// An unrecognised chart token is answered with an
    /// `UnsupportedChartType` error result.
    pub fn ask_with_chart(&mut self, text: &str, chart: &str) -> &QueryResult {
        let started = Instant::now();
        let mut intent = self.classify(text);
        let result = match chart.parse::<ChartKind>() {
            Ok(kind) => {
                intent.query_type = QueryType::Visualization;
                intent.visualization_type = Some(kind);
                self.executor.execute(&self.dataset, &intent)
            }
            Err(err) => err.into(),
        };
        self.record(text, intent, result, started)
    }

    fn record(
        &mut self,
        text: &str,
        intent: QueryIntent,
        result: QueryResult,
        started: Instant,
    ) -> &QueryResult {
        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            query_type = %intent.query_type,
            result_type = result.type_name(),
            elapsed_ms,
            "Answered query"
        );

        if self.history.len() == self.max_history {
            self.history.pop_front();
        }
        self.history.push_back(HistoryEntry {
            query: text.to_string(),
            intent,
            result,
            timestamp: Utc::now(),
            elapsed_ms,
        });

        // Just pushed, so the back entry exists.
        &self.history[self.history.len() - 1].result
    }

    /// Answered questions, oldest first.
    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.history
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.history.back()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ErrorKind;
    use polars::prelude::df;

    fn session() -> Session {
        let dataset = Dataset::new(
            df! {
                "department" => &["IT", "HR", "IT", "Finance", "HR"],
                "salary" => &[50000.0f64, 60000.0, 70000.0, 80000.0, 90000.0],
            }
            .unwrap(),
        )
        .unwrap();
        Session::new(dataset, IntentClassifier::new())
    }

    #[test]
    fn test_ask_records_history() {
        let mut session = session();
        let result = session.ask("What is the average salary?").clone();
        assert_eq!(result.type_name(), "statistical");

        let last = session.last().unwrap();
        assert_eq!(last.query, "What is the average salary?");
        assert_eq!(last.intent.query_type, QueryType::Statistical);
        assert_eq!(last.result, result);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_errors_are_recorded_too() {
        let mut session = session();
        let kind = session.ask("What is the average?").error_kind();
        assert_eq!(kind, Some(ErrorKind::NoColumn));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_history_is_bounded() {
        let dataset = session().dataset().clone();
        let config = Config {
            session: crate::config::SessionConfig { max_history: 2 },
            ..Default::default()
        };
        let mut session = Session::with_config(dataset, IntentClassifier::new(), &config);
        for query in ["total salary", "lowest salary", "highest salary"] {
            session.ask(query);
        }
        let queries: Vec<&str> = session.history().iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["lowest salary", "highest salary"]);

        session.clear_history();
        assert!(session.last().is_none());
    }

    #[test]
    fn test_ask_with_chart() {
        let mut session = session();
        match session.ask_with_chart("salary by department", "pie") {
            QueryResult::Visualization { chart_spec } => {
                assert_eq!(chart_spec.kind, ChartKind::Pie);
                assert_eq!(chart_spec.names.as_deref(), Some("department"));
            }
            other => panic!("unexpected result {:?}", other),
        }

        let kind = session.ask_with_chart("salary by department", "radar").error_kind();
        assert_eq!(kind, Some(ErrorKind::UnsupportedChartType));
    }

    #[test]
    fn test_analysis_computed_once() {
        let session = session();
        assert_eq!(session.analysis().schema.len(), 2);
        assert_eq!(session.analysis().quality_metrics.total_rows, 5);
    }
}
