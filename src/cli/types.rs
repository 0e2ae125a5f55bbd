//! CLI response types for the analyze, suggest, ask and intent commands.
//!
//! These wrap library types with the question and message shown to users.

use std::collections::BTreeMap;

use askdata::schema::VisualizationSuggestion;
use askdata::{DataAnalysis, QueryIntent, QueryResult};
use serde::Serialize;

/// Result of the `ask` command and of each REPL question.
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse<'a> {
    pub success: bool,
    pub query: &'a str,
    pub message: String,
    pub result: &'a QueryResult,
}

impl<'a> AskResponse<'a> {
    pub fn new(query: &'a str, result: &'a QueryResult) -> Self {
        Self {
            success: !result.is_error(),
            query,
            message: result.message(),
            result,
        }
    }
}

/// Result of the `intent` command.
#[derive(Debug, Clone, Serialize)]
pub struct IntentResponse<'a> {
    pub query: &'a str,
    pub intent: &'a QueryIntent,
}

/// Result of the `analyze` command.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse<'a> {
    pub path: String,
    #[serde(flatten)]
    pub analysis: &'a DataAnalysis,
}

/// Result of the `suggest` command.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestResponse {
    pub columns_by_type: BTreeMap<&'static str, Vec<String>>,
    pub visualizations: Vec<VisualizationSuggestion>,
}
