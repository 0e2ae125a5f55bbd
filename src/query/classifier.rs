//! Query Intent Classifier.
//!
//! Turns a free-text question into a [`QueryIntent`] by checking ordered
//! pattern tables against the lowercased text, then matching column names
//! from the live schema. Classification never fails; anything it cannot
//! read is left empty for the executor to reject.

use std::fmt;
use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use regex::Regex;

use super::types::*;
use crate::dataset::Dataset;
use crate::embedding::SimilarityScorer;
use crate::schema::{DataAnalysis, Schema};

/// Default minimum similarity for a column to count as mentioned.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.7;

// ============================================================================
// Column Sources
// ============================================================================

/// Anything that can list column names in schema order.
pub trait ColumnSource {
    fn column_names(&self) -> Vec<&str>;
}

impl ColumnSource for Schema {
    fn column_names(&self) -> Vec<&str> {
        self.names().collect()
    }
}

impl ColumnSource for DataAnalysis {
    fn column_names(&self) -> Vec<&str> {
        self.schema.names().collect()
    }
}

impl ColumnSource for Dataset {
    fn column_names(&self) -> Vec<&str> {
        Dataset::column_names(self)
    }
}

impl ColumnSource for [String] {
    fn column_names(&self) -> Vec<&str> {
        self.iter().map(String::as_str).collect()
    }
}

impl ColumnSource for [&str] {
    fn column_names(&self) -> Vec<&str> {
        self.to_vec()
    }
}

// ============================================================================
// Similarity Policy
// ============================================================================

/// How similarity scores turn into column matches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityPolicy {
    /// Scores strictly above this count as a mention.
    pub threshold: f32,
    /// Keep only the best-scoring columns when set. Ties keep schema order.
    pub max_matches: Option<usize>,
}

impl Default for SimilarityPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_matches: None,
        }
    }
}

// ============================================================================
// Intent Classifier
// ============================================================================

/// Classifies natural language questions into structured intents.
#[derive(Clone, Default)]
pub struct IntentClassifier {
    similarity: Option<Arc<dyn SimilarityScorer>>,
    policy: SimilarityPolicy,
}

impl fmt::Debug for IntentClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntentClassifier")
            .field("similarity", &self.similarity.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}

impl IntentClassifier {
    /// Classifier that matches columns by exact tokens only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also accept columns whose name scores above `threshold` against the query.
    pub fn with_similarity(scorer: Arc<dyn SimilarityScorer>, threshold: f32) -> Self {
        Self {
            similarity: Some(scorer),
            policy: SimilarityPolicy {
                threshold,
                ..Default::default()
            },
        }
    }

    pub fn with_policy(mut self, policy: SimilarityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &SimilarityPolicy {
        &self.policy
    }

    pub fn has_similarity(&self) -> bool {
        self.similarity.is_some()
    }

    /// Classify a question against the columns of `schema`.
    pub fn classify<S: ColumnSource + ?Sized>(&self, query: &str, schema: &S) -> QueryIntent {
        let text = query.trim().to_lowercase();
        let names = schema.column_names();

        let query_type = detect_query_type(&text);
        let columns = self.extract_columns(&text, &names, true);

        let mut intent = QueryIntent::new(query_type).with_columns(columns);

        match query_type {
            QueryType::Statistical => self.process_statistical(&text, &mut intent),
            QueryType::Filter => self.process_filter(&text, &mut intent),
            QueryType::Comparison => self.process_comparison(&text, &names, &mut intent),
            QueryType::Visualization => self.process_visualization(&text, &mut intent),
            QueryType::Unknown => {}
        }

        tracing::debug!(
            query = %text,
            query_type = %intent.query_type,
            columns = ?intent.columns,
            conditions = intent.conditions.len(),
            "Classified query"
        );

        intent
    }

    // ========================================================================
    // Column Extraction
    // ========================================================================

    fn extract_columns(&self, text: &str, names: &[&str], use_similarity: bool) -> Vec<String> {
        let query_tokens = tokens(text);
        let mut mentioned: Vec<bool> = names
            .iter()
            .map(|name| contains_sequence(&query_tokens, &tokens(name)))
            .collect();

        if use_similarity {
            if let Some(scorer) = &self.similarity {
                for index in self.similar_columns(scorer.as_ref(), text, names, &mentioned) {
                    mentioned[index] = true;
                }
            }
        }

        let mut columns: Vec<String> = Vec::new();
        for (name, hit) in names.iter().zip(mentioned) {
            if hit && !columns.iter().any(|c| c == name) {
                columns.push((*name).to_string());
            }
        }
        columns
    }

    /// Indices of unmatched columns that pass the similarity policy.
    fn similar_columns(
        &self,
        scorer: &dyn SimilarityScorer,
        text: &str,
        names: &[&str],
        already: &[bool],
    ) -> Vec<usize> {
        let candidates: Vec<(usize, &str)> = names
            .iter()
            .enumerate()
            .filter(|(i, _)| !already[*i])
            .map(|(i, name)| (i, *name))
            .collect();
        if candidates.is_empty() {
            return Vec::new();
        }

        let labels: Vec<&str> = candidates.iter().map(|(_, name)| *name).collect();
        let scores = match scorer.similarities(text, &labels) {
            Ok(scores) => scores,
            Err(e) => {
                tracing::warn!(error = %e, "Similarity scoring failed; using exact column matches");
                return Vec::new();
            }
        };

        let mut hits: Vec<(usize, f32)> = candidates
            .iter()
            .zip(scores)
            .filter(|(_, score)| *score > self.policy.threshold)
            .map(|((index, _), score)| (*index, score))
            .collect();

        hits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        if let Some(max) = self.policy.max_matches {
            hits.truncate(max);
        }

        for (index, score) in &hits {
            tracing::debug!(column = names[*index], score, "Column matched by similarity");
        }

        hits.into_iter().map(|(index, _)| index).collect()
    }

    // ========================================================================
    // Enrichment
    // ========================================================================

    fn process_statistical(&self, text: &str, intent: &mut QueryIntent) {
        intent.aggregation = AGGREGATION_TERMS
            .iter()
            .find(|(_, pattern)| pattern.is_match(text))
            .map(|(aggregation, _)| *aggregation);
    }

    fn process_filter(&self, text: &str, intent: &mut QueryIntent) {
        let Some(column) = intent.columns.first().cloned() else {
            return;
        };

        for (operator, phrases) in OPERATOR_PHRASES.iter() {
            for phrase in phrases {
                let Some(found) = phrase.captures(text).and_then(|c| c.get(1)) else {
                    continue;
                };
                let trailing = &text[found.end()..];
                let literal = extract_literal(trailing).or_else(|| {
                    (*operator == Operator::Equal)
                        .then(|| extract_word(trailing))
                        .flatten()
                });
                if let Some(literal) = literal {
                    intent.conditions.push(Condition::new(
                        column.clone(),
                        *operator,
                        ConditionValue::Single(literal),
                    ));
                }
            }
        }

        for pattern in [&*BETWEEN_RANGE, &*FROM_TO_RANGE] {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let low = caps.get(1).and_then(|m| parse_literal(m.as_str()));
            let high = caps.get(2).and_then(|m| parse_literal(m.as_str()));
            if let (Some(low), Some(high)) = (low, high) {
                intent.conditions.push(Condition::new(
                    column.clone(),
                    Operator::Between,
                    ConditionValue::Range(low, high),
                ));
            }
        }
    }

    fn process_comparison(&self, text: &str, names: &[&str], intent: &mut QueryIntent) {
        let Some(found) = GROUP_BY_TERM.find(text) else {
            return;
        };
        let group_by = self.extract_columns(&text[found.end()..], names, false);
        if !group_by.is_empty() {
            intent.group_by = Some(group_by);
        }
    }

    fn process_visualization(&self, text: &str, intent: &mut QueryIntent) {
        intent.visualization_type = CHART_TERMS
            .iter()
            .find(|(_, pattern)| pattern.is_match(text))
            .map(|(kind, _)| *kind);
    }
}

// ============================================================================
// Type Detection
// ============================================================================

/// Query type by fixed precedence: statistical, visualization, comparison, filter.
fn detect_query_type(text: &str) -> QueryType {
    if AGGREGATION_TERMS.iter().any(|(_, p)| p.is_match(text)) {
        return QueryType::Statistical;
    }
    if CHART_TERMS.iter().any(|(_, p)| p.is_match(text)) || GENERIC_CHART_TERM.is_match(text) {
        return QueryType::Visualization;
    }
    if COMPARISON_TERM.is_match(text) || GROUP_BY_TERM.is_match(text) {
        return QueryType::Comparison;
    }
    let has_operator = OPERATOR_PHRASES
        .iter()
        .flat_map(|(_, phrases)| phrases)
        .any(|p| p.is_match(text));
    if has_operator || BETWEEN_TERM.is_match(text) || FROM_TO_RANGE.is_match(text) {
        return QueryType::Filter;
    }
    QueryType::Unknown
}

// ============================================================================
// Helpers
// ============================================================================

/// Lowercase alphanumeric runs. Underscores and punctuation separate tokens.
fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_sequence(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

/// First number or date in `text`. A date wins when it starts no later than the number.
fn extract_literal(text: &str) -> Option<Literal> {
    let date = DATE_FORMATS
        .iter()
        .filter_map(|(pattern, format)| {
            pattern.find_iter(text).find_map(|m| {
                NaiveDate::parse_from_str(m.as_str(), format)
                    .ok()
                    .map(|d| (m.start(), d))
            })
        })
        .min_by_key(|(start, _)| *start);

    let number = NUMBER.find(text).and_then(|m| {
        m.as_str()
            .parse::<f64>()
            .ok()
            .map(|n| (m.start(), n))
    });

    match (date, number) {
        (Some((date_at, date)), Some((number_at, _))) if date_at <= number_at => {
            Some(Literal::Date(date))
        }
        (Some((_, date)), None) => Some(Literal::Date(date)),
        (_, Some((_, n))) => Some(Literal::Number(n)),
        (None, None) => None,
    }
}

/// A whole range bound: a date in one of the known formats, else a number.
fn parse_literal(token: &str) -> Option<Literal> {
    for (pattern, format) in DATE_FORMATS.iter() {
        if pattern.find(token).is_some_and(|m| m.as_str() == token) {
            if let Ok(date) = NaiveDate::parse_from_str(token, format) {
                return Some(Literal::Date(date));
            }
        }
    }
    token.parse::<f64>().ok().map(Literal::Number)
}

/// First word (or quoted phrase) after an equality term.
fn extract_word(text: &str) -> Option<Literal> {
    let caps = EQUALS_WORD.captures(text)?;
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .map(|m| Literal::Text(m.as_str().trim().to_string()))
        .filter(|lit| !matches!(lit, Literal::Text(s) if s.is_empty()))
}

fn terms(terms: &[&str]) -> Regex {
    let alternatives: Vec<String> = terms
        .iter()
        .map(|t| {
            t.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();
    // Plural and past-tense endings: "averages", "totals", "compared".
    Regex::new(&format!(
        r"\b(?:{})(?:s|es|d|ed)?\b",
        alternatives.join("|")
    ))
    .expect("Invalid regex")
}

fn phrase(term: &str) -> Regex {
    let body = term
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    Regex::new(&format!(r"\b({})\b", body)).expect("Invalid regex")
}

/// Comparison symbol that is not part of a longer operator such as `>=`.
fn symbol(sym: &str) -> Regex {
    Regex::new(&format!(r"(?:^|[^<>=!])({})(?:[^<>=]|$)", regex::escape(sym)))
        .expect("Invalid regex")
}

// ============================================================================
// Static Patterns
// ============================================================================

// Checked in order; the first matching group wins.
static AGGREGATION_TERMS: LazyLock<Vec<(Aggregation, Regex)>> = LazyLock::new(|| {
    vec![
        (Aggregation::Mean, terms(&["average", "mean", "avg"])),
        (Aggregation::Sum, terms(&["sum", "total"])),
        (Aggregation::Count, terms(&["count", "number of", "how many"])),
        (
            Aggregation::Min,
            terms(&["minimum", "lowest", "smallest", "least"]),
        ),
        (
            Aggregation::Max,
            terms(&["maximum", "highest", "largest", "most"]),
        ),
        (Aggregation::Median, terms(&["median", "middle"])),
    ]
});

// "distribution" appears under pie and histogram; pie is checked first.
static CHART_TERMS: LazyLock<Vec<(ChartKind, Regex)>> = LazyLock::new(|| {
    vec![
        (ChartKind::Bar, terms(&["bar", "bars", "bar chart"])),
        (ChartKind::Line, terms(&["line", "line chart", "trend"])),
        (ChartKind::Pie, terms(&["pie", "pie chart", "distribution"])),
        (
            ChartKind::Scatter,
            terms(&["scatter", "scatter plot", "correlation"]),
        ),
        (ChartKind::Histogram, terms(&["histogram", "distribution"])),
    ]
});

static GENERIC_CHART_TERM: LazyLock<Regex> =
    LazyLock::new(|| terms(&["chart", "plot", "graph", "visualize", "visualise"]));

static COMPARISON_TERM: LazyLock<Regex> =
    LazyLock::new(|| terms(&["compare", "comparison", "versus", "vs", "against"]));

static GROUP_BY_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:group(?:ed)?\s+)?by\b").expect("Invalid regex"));

// Operator groups in order; every phrase present yields one condition.
static OPERATOR_PHRASES: LazyLock<Vec<(Operator, Vec<Regex>)>> = LazyLock::new(|| {
    vec![
        (
            Operator::GreaterThan,
            vec![
                phrase("greater than"),
                phrase("more than"),
                phrase("above"),
                symbol(">"),
            ],
        ),
        (
            Operator::LessThan,
            vec![phrase("less than"), phrase("below"), symbol("<")],
        ),
        (
            Operator::Equal,
            vec![phrase("equal to"), phrase("equals"), symbol("==")],
        ),
    ]
});

static BETWEEN_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bbetween\b").expect("Invalid regex"));

const RANGE_BOUND: &str = r"(\d{4}-\d{2}-\d{2}|\d{2}/\d{2}/\d{4}|\d{2}-\d{2}-\d{4}|\d+(?:\.\d+)?)";

static BETWEEN_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\bbetween\s+{0}\s+and\s+{0}", RANGE_BOUND)).expect("Invalid regex")
});
static FROM_TO_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\bfrom\s+{0}\s+to\s+{0}", RANGE_BOUND)).expect("Invalid regex")
});

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.?\d*").expect("Invalid regex"));

static DATE_FORMATS: LazyLock<[(Regex, &'static str); 3]> = LazyLock::new(|| {
    [
        (
            Regex::new(r"\d{4}-\d{2}-\d{2}").expect("Invalid regex"),
            "%Y-%m-%d",
        ),
        (
            Regex::new(r"\d{2}/\d{2}/\d{4}").expect("Invalid regex"),
            "%d/%m/%Y",
        ),
        (
            Regex::new(r"\d{2}-\d{2}-\d{4}").expect("Invalid regex"),
            "%d-%m-%Y",
        ),
    ]
});

static EQUALS_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:"([^"]+)"|'([^']+)'|([^\s"'?!,;]+))"#).expect("Invalid regex")
});

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EmbeddingError, Result};

    const EMPLOYEES: [&str; 4] = ["department", "salary", "age", "hire_date"];

    fn classify(query: &str) -> QueryIntent {
        IntentClassifier::new().classify(query, &EMPLOYEES[..])
    }

    #[test]
    fn test_statistical_average() {
        let intent = classify("What is the average salary?");
        assert_eq!(intent.query_type, QueryType::Statistical);
        assert_eq!(intent.columns, vec!["salary"]);
        assert_eq!(intent.aggregation, Some(Aggregation::Mean));
    }

    #[test]
    fn test_aggregation_order() {
        assert_eq!(classify("total salary").aggregation, Some(Aggregation::Sum));
        assert_eq!(
            classify("how many departments are there").aggregation,
            Some(Aggregation::Count)
        );
        assert_eq!(classify("lowest age").aggregation, Some(Aggregation::Min));
        assert_eq!(classify("highest salary").aggregation, Some(Aggregation::Max));
        assert_eq!(classify("median age").aggregation, Some(Aggregation::Median));
        // mean is checked before max
        assert_eq!(
            classify("mean of the largest salary").aggregation,
            Some(Aggregation::Mean)
        );
    }

    #[test]
    fn test_whole_word_terms() {
        // "country" must not match "count", "online" must not match "line"
        let intent = IntentClassifier::new().classify("country online", &["country"][..]);
        assert_eq!(intent.query_type, QueryType::Unknown);
    }

    #[test]
    fn test_inflected_terms() {
        let columns = ["department", "salary", "age"];
        let classifier = IntentClassifier::new();

        let intent = classifier.classify("What are the averages of salary?", &columns[..]);
        assert_eq!(intent.query_type, QueryType::Statistical);
        assert_eq!(intent.aggregation, Some(Aggregation::Mean));

        let intent = classifier.classify("salary totals", &columns[..]);
        assert_eq!(intent.query_type, QueryType::Statistical);
        assert_eq!(intent.aggregation, Some(Aggregation::Sum));

        let intent = classifier.classify("salary compared to age", &columns[..]);
        assert_eq!(intent.query_type, QueryType::Comparison);
        assert_eq!(intent.columns, vec!["salary", "age"]);

        let intent = classifier.classify("show salary histograms", &columns[..]);
        assert_eq!(intent.query_type, QueryType::Visualization);
        assert_eq!(intent.visualization_type, Some(ChartKind::Histogram));
        assert_eq!(intent.columns, vec!["salary"]);
    }

    #[test]
    fn test_policy_accessors() {
        let classifier = IntentClassifier::new().with_policy(SimilarityPolicy {
            threshold: 0.85,
            max_matches: Some(1),
        });
        assert!(!classifier.has_similarity());
        assert_eq!(classifier.policy().threshold, 0.85);
        assert_eq!(classifier.policy().max_matches, Some(1));

        let scorer = Arc::new(FixedScores(vec![("salary", 0.9)]));
        assert!(IntentClassifier::with_similarity(scorer, 0.7).has_similarity());
    }

    #[test]
    fn test_statistical_beats_visualization() {
        let intent = classify("bar chart of the average salary");
        assert_eq!(intent.query_type, QueryType::Statistical);
        assert_eq!(intent.visualization_type, None);
    }

    #[test]
    fn test_filter_greater_than() {
        let intent = classify("Show employees where age is greater than 30");
        assert_eq!(intent.query_type, QueryType::Filter);
        assert_eq!(intent.columns, vec!["age"]);
        assert_eq!(
            intent.conditions,
            vec![Condition::new(
                "age",
                Operator::GreaterThan,
                ConditionValue::Single(Literal::Number(30.0))
            )]
        );
    }

    #[test]
    fn test_filter_symbols() {
        let intent = classify("age > 40");
        assert_eq!(intent.conditions[0].operator, Operator::GreaterThan);
        assert_eq!(
            intent.conditions[0].value,
            ConditionValue::Single(Literal::Number(40.0))
        );

        let intent = classify("age < 25.5");
        assert_eq!(intent.conditions[0].operator, Operator::LessThan);
        assert_eq!(
            intent.conditions[0].value,
            ConditionValue::Single(Literal::Number(25.5))
        );

        // >= is not a supported operator
        assert_eq!(classify("age >= 40").query_type, QueryType::Unknown);
    }

    #[test]
    fn test_filter_date_literal() {
        let intent = classify("rows with hire_date above 2021-03-15");
        assert_eq!(intent.columns, vec!["hire_date"]);
        assert_eq!(
            intent.conditions[0].value,
            ConditionValue::Single(Literal::Date(NaiveDate::from_ymd_opt(2021, 3, 15).unwrap()))
        );

        let intent = classify("hire date below 15/03/2021");
        assert_eq!(
            intent.conditions[0].value,
            ConditionValue::Single(Literal::Date(NaiveDate::from_ymd_opt(2021, 3, 15).unwrap()))
        );
    }

    #[test]
    fn test_filter_equals_text() {
        let intent = classify("department equals hr");
        assert_eq!(intent.query_type, QueryType::Filter);
        assert_eq!(
            intent.conditions,
            vec![Condition::new(
                "department",
                Operator::Equal,
                ConditionValue::Single(Literal::Text("hr".to_string()))
            )]
        );
    }

    #[test]
    fn test_filter_between() {
        let intent = classify("age between 30 and 40");
        assert_eq!(intent.query_type, QueryType::Filter);
        assert_eq!(
            intent.conditions,
            vec![Condition::new(
                "age",
                Operator::Between,
                ConditionValue::Range(Literal::Number(30.0), Literal::Number(40.0))
            )]
        );

        let intent = classify("age from 30 to 40");
        assert_eq!(intent.query_type, QueryType::Filter);
        assert_eq!(intent.conditions[0].operator, Operator::Between);
    }

    #[test]
    fn test_filter_without_value_or_column() {
        let intent = classify("age greater than thirty");
        assert_eq!(intent.query_type, QueryType::Filter);
        assert!(intent.conditions.is_empty());

        let intent = classify("greater than 30");
        assert!(intent.columns.is_empty());
        assert!(intent.conditions.is_empty());
    }

    #[test]
    fn test_comparison_group_by() {
        let intent = classify("Compare salary by department");
        assert_eq!(intent.query_type, QueryType::Comparison);
        assert_eq!(intent.columns, vec!["department", "salary"]);
        assert_eq!(intent.group_by, Some(vec!["department".to_string()]));

        let intent = classify("salary versus age");
        assert_eq!(intent.query_type, QueryType::Comparison);
        assert_eq!(intent.group_by, None);
    }

    #[test]
    fn test_visualization_kinds() {
        let intent = classify("Show a bar chart of salary by department");
        assert_eq!(intent.query_type, QueryType::Visualization);
        assert_eq!(intent.visualization_type, Some(ChartKind::Bar));
        assert_eq!(intent.columns, vec!["department", "salary"]);

        assert_eq!(
            classify("salary trend over hire_date").visualization_type,
            Some(ChartKind::Line)
        );
        // pie is checked before histogram
        assert_eq!(
            classify("distribution of department").visualization_type,
            Some(ChartKind::Pie)
        );
        assert_eq!(
            classify("scatter plot of age and salary").visualization_type,
            Some(ChartKind::Scatter)
        );

        let intent = classify("plot salary");
        assert_eq!(intent.query_type, QueryType::Visualization);
        assert_eq!(intent.visualization_type, None);
    }

    #[test]
    fn test_column_order_follows_schema() {
        let intent = classify("age and salary histogram");
        assert_eq!(intent.columns, vec!["salary", "age"]);
    }

    #[test]
    fn test_multi_word_column() {
        let names = ["hire date", "salary"];
        let intent = IntentClassifier::new().classify("trend of salary by hire date", &names[..]);
        assert_eq!(intent.columns, vec!["hire date", "salary"]);
    }

    #[test]
    fn test_unknown_query() {
        let intent = classify("hello there");
        assert_eq!(intent.query_type, QueryType::Unknown);
        assert!(intent.columns.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let classifier = IntentClassifier::new();
        for query in [
            "What is the average salary?",
            "age between 30 and 40",
            "Compare salary by department",
        ] {
            assert_eq!(
                classifier.classify(query, &EMPLOYEES[..]),
                classifier.classify(query, &EMPLOYEES[..])
            );
        }
    }

    struct FixedScores(Vec<(&'static str, f32)>);

    impl SimilarityScorer for FixedScores {
        fn similarity(&self, _query: &str, candidate: &str) -> Result<f32> {
            Ok(self
                .0
                .iter()
                .find(|(name, _)| *name == candidate)
                .map(|(_, s)| *s)
                .unwrap_or(0.0))
        }
    }

    struct FailingScorer;

    impl SimilarityScorer for FailingScorer {
        fn similarity(&self, _query: &str, _candidate: &str) -> Result<f32> {
            Err(EmbeddingError::Inference("model unavailable".to_string()).into())
        }
    }

    #[test]
    fn test_similarity_threshold() {
        let scorer = Arc::new(FixedScores(vec![("salary", 0.82), ("age", 0.7)]));
        let classifier = IntentClassifier::with_similarity(scorer, DEFAULT_SIMILARITY_THRESHOLD);
        let intent = classifier.classify("what do people earn on average", &EMPLOYEES[..]);
        // 0.7 is not above the threshold
        assert_eq!(intent.columns, vec!["salary"]);
    }

    #[test]
    fn test_similarity_max_matches() {
        let scorer = Arc::new(FixedScores(vec![
            ("department", 0.75),
            ("salary", 0.9),
            ("age", 0.8),
        ]));
        let classifier = IntentClassifier::with_similarity(scorer, 0.7).with_policy(SimilarityPolicy {
            threshold: 0.7,
            max_matches: Some(2),
        });
        let intent = classifier.classify("average pay of older staff", &EMPLOYEES[..]);
        assert_eq!(intent.columns, vec!["salary", "age"]);
    }

    #[test]
    fn test_similarity_failure_degrades() {
        let classifier = IntentClassifier::with_similarity(Arc::new(FailingScorer), 0.7);
        let intent = classifier.classify("average salary", &EMPLOYEES[..]);
        assert_eq!(intent.columns, vec!["salary"]);
    }

    #[test]
    fn test_extract_literal_prefers_leading_date() {
        assert_eq!(
            extract_literal(" 2024-01-31 or 5"),
            Some(Literal::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()))
        );
        assert_eq!(extract_literal(" 5 days after 2024-01-31"), Some(Literal::Number(5.0)));
        // not a valid calendar date
        assert_eq!(extract_literal(" 2024-13-45"), Some(Literal::Number(2024.0)));
        assert_eq!(extract_literal(" nothing"), None);
    }
}
