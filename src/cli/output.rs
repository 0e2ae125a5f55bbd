//! Output formatting for CLI commands.
//!
//! This module handles formatting output as either JSON or human-readable text.

use askdata::schema::ColumnStatistics;
use askdata::{ComparisonTable, Dataset, HistoryEntry, QueryResult};
use serde::Serialize;

use super::types::{AnalyzeResponse, AskResponse, IntentResponse, SuggestResponse};

/// Rows of a filtered dataset shown in text mode.
const PREVIEW_ROWS: usize = 20;

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// Print dataset analysis.
pub fn print_analysis(result: &AnalyzeResponse<'_>, json: bool) {
    if json {
        print_json(result);
        return;
    }

    let analysis = result.analysis;
    let quality = &analysis.quality_metrics;
    println!("Dataset: {}", result.path);
    println!(
        "Rows: {}  Columns: {}  Nulls: {:.1}%  Duplicate rows: {}\n",
        quality.total_rows, quality.total_columns, quality.null_percentage, quality.duplicate_rows
    );

    println!(
        "{:<24} {:<20} {:>8} {:>8}  SUMMARY",
        "COLUMN", "TYPE", "UNIQUE", "NULLS"
    );
    println!("{}", "-".repeat(90));
    for column in analysis.schema.iter() {
        let summary = match &column.statistics {
            ColumnStatistics::Numeric(s) => format!(
                "mean {:.2}, median {:.2}, std {:.2}, range [{}, {}]",
                s.mean, s.median, s.std, s.min, s.max
            ),
            ColumnStatistics::Categorical(s) => {
                format!("most common {}, least common {}", s.most_common, s.least_common)
            }
            ColumnStatistics::None => column
                .sample_values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        };
        println!(
            "{:<24} {:<20} {:>8} {:>8}  {}",
            truncate(&column.name, 24),
            column.semantic_type.as_str(),
            column.unique_count,
            column.null_count,
            summary
        );
    }

    let mut correlations: Vec<_> = analysis
        .relationships
        .values()
        .filter(|r| r.first < r.second)
        .filter_map(|r| r.correlation.map(|c| (r, c)))
        .collect();
    if !correlations.is_empty() {
        correlations.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        println!("\nCorrelations:");
        for (relationship, correlation) in correlations {
            println!(
                "  {} ~ {}: {:+.3}",
                relationship.first, relationship.second, correlation
            );
        }
    }
}

/// Print column groupings and chart suggestions.
pub fn print_suggestions(result: &SuggestResponse, json: bool) {
    if json {
        print_json(result);
        return;
    }

    println!("Columns by type:");
    for (group, columns) in &result.columns_by_type {
        if !columns.is_empty() {
            println!("  {:<12} {}", group, columns.join(", "));
        }
    }

    if result.visualizations.is_empty() {
        println!("\nNo chart suggestions for this dataset.");
        return;
    }
    println!("\nSuggested charts:");
    for (i, suggestion) in result.visualizations.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, suggestion.kind, suggestion.title);
    }
}

/// Print the answer to one question.
pub fn print_answer(result: &AskResponse<'_>, json: bool) {
    if json {
        print_json(result);
        return;
    }

    match result.result {
        QueryResult::Error {
            error_kind,
            message,
        } => {
            println!("Error [{}]: {}", error_kind, message);
        }
        QueryResult::Statistical { .. } => println!("{}", result.message),
        QueryResult::Filter {
            row_count,
            filtered_dataset,
        } => {
            println!("{}\n", result.message);
            print_dataset(filtered_dataset);
            if *row_count > PREVIEW_ROWS {
                println!("... {} more rows", row_count - PREVIEW_ROWS);
            }
        }
        QueryResult::Comparison { comparison_table } => {
            println!("{}\n", result.message);
            print_comparison(comparison_table);
        }
        QueryResult::Visualization { chart_spec } => {
            println!("{}", result.message);
            let bindings = [
                ("x", &chart_spec.x),
                ("y", &chart_spec.y),
                ("names", &chart_spec.names),
                ("values", &chart_spec.values),
            ];
            for (axis, column) in bindings {
                if let Some(column) = column {
                    println!("  {:<7} {}", axis, column);
                }
            }
        }
    }
}

/// Print a classified intent.
pub fn print_intent(result: &IntentResponse<'_>, json: bool) {
    if json {
        print_json(result);
        return;
    }

    let intent = result.intent;
    println!("Query: {}", result.query);
    println!("Type: {}", intent.query_type);
    println!(
        "Columns: {}",
        if intent.columns.is_empty() {
            "(none)".to_string()
        } else {
            intent.columns.join(", ")
        }
    );
    if let Some(aggregation) = intent.aggregation {
        println!("Aggregation: {}", aggregation);
    }
    for condition in &intent.conditions {
        println!("Condition: {}", condition);
    }
    if let Some(group_by) = &intent.group_by {
        println!("Group by: {}", group_by.join(", "));
    }
    if let Some(kind) = intent.visualization_type {
        println!("Chart: {}", kind);
    }
}

/// Print session history.
pub fn print_history<'a>(entries: impl ExactSizeIterator<Item = &'a HistoryEntry>, json: bool) {
    if json {
        let entries: Vec<&HistoryEntry> = entries.collect();
        print_json(&entries);
        return;
    }

    if entries.len() == 0 {
        println!("No questions asked yet.");
        return;
    }
    for (i, entry) in entries.enumerate() {
        println!(
            "{}. [{}] {} -> {} ({}ms)",
            i + 1,
            entry.timestamp.format("%H:%M:%S"),
            entry.query,
            entry.result.message(),
            entry.elapsed_ms
        );
    }
}

fn print_dataset(dataset: &Dataset) {
    let headers: Vec<String> = dataset.column_names().iter().map(|s| s.to_string()).collect();
    let rows: Vec<Vec<String>> = (0..dataset.row_count().min(PREVIEW_ROWS))
        .filter_map(|i| dataset.row(i))
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();
    print_table(&headers, &rows);
}

fn print_comparison(table: &ComparisonTable) {
    match table {
        ComparisonTable::Grouped {
            group_by,
            value_columns,
            rows,
        } => {
            let headers: Vec<String> = group_by
                .iter()
                .chain(value_columns)
                .cloned()
                .collect();
            let rows: Vec<Vec<String>> = rows
                .iter()
                .map(|row| {
                    row.keys
                        .iter()
                        .map(ToString::to_string)
                        .chain(row.means.iter().map(|m| format_number(*m)))
                        .collect()
                })
                .collect();
            print_table(&headers, &rows);
        }
        ComparisonTable::Describe { columns, rows } => {
            let headers: Vec<String> = std::iter::once(String::new())
                .chain(columns.iter().cloned())
                .collect();
            let rows: Vec<Vec<String>> = rows
                .iter()
                .map(|row| {
                    std::iter::once(row.statistic.clone())
                        .chain(row.values.iter().map(|v| format_number(*v)))
                        .collect()
                })
                .collect();
            print_table(&headers, &rows);
        }
    }
}

fn print_table(headers: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count()).min(30);
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", truncate(cell, *width), width = *width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", line(headers));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    for row in rows {
        println!("{}", line(row));
    }
}

fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}
