//! Column and chart suggestions derived from an analysis.

use std::collections::BTreeMap;

use super::inference::DataAnalysis;
use super::types::{SemanticType, VisualizationSuggestion};
use crate::query::ChartKind;

/// Buckets reported by [`DataAnalysis::suggest_columns_by_type`].
pub const SUGGESTION_GROUPS: [&str; 5] = ["numeric", "categorical", "datetime", "text", "binary"];

impl DataAnalysis {
    /// Group column names by semantic type. `categorical_numeric` columns are
    /// reported as numeric; date strings and unknown columns are left out.
    pub fn suggest_columns_by_type(&self) -> BTreeMap<&'static str, Vec<String>> {
        let mut groups: BTreeMap<&'static str, Vec<String>> = SUGGESTION_GROUPS
            .iter()
            .map(|group| (*group, Vec::new()))
            .collect();

        for column in self.schema.iter() {
            let group = match column.semantic_type {
                SemanticType::Numeric | SemanticType::CategoricalNumeric => "numeric",
                SemanticType::Categorical => "categorical",
                SemanticType::Datetime => "datetime",
                SemanticType::Text => "text",
                SemanticType::Binary => "binary",
                SemanticType::DateString | SemanticType::Unknown => continue,
            };
            if let Some(names) = groups.get_mut(group) {
                names.push(column.name.clone());
            }
        }
        groups
    }

    /// Charts worth drawing for this dataset:
    /// a line chart per numeric column against the first temporal column,
    /// a histogram per numeric column, and a bar chart per
    /// categorical/numeric pair.
    pub fn suggest_visualizations(&self) -> Vec<VisualizationSuggestion> {
        let numeric: Vec<&str> = self.schema.names_of(|t| t.is_numeric_like()).collect();
        let categorical: Vec<&str> = self
            .schema
            .names_of(|t| t == SemanticType::Categorical)
            .collect();
        let first_temporal = self.schema.names_of(|t| t.is_temporal()).next();

        let mut suggestions = Vec::new();

        if let Some(time) = first_temporal {
            for num in &numeric {
                suggestions.push(VisualizationSuggestion {
                    kind: ChartKind::Line,
                    title: format!("{} Over Time", num),
                    x: time.to_string(),
                    y: Some(num.to_string()),
                });
            }
        }

        for num in &numeric {
            suggestions.push(VisualizationSuggestion {
                kind: ChartKind::Histogram,
                title: format!("Distribution of {}", num),
                x: num.to_string(),
                y: None,
            });
        }

        for cat in &categorical {
            for num in &numeric {
                suggestions.push(VisualizationSuggestion {
                    kind: ChartKind::Bar,
                    title: format!("{} by {}", num, cat),
                    x: cat.to_string(),
                    y: Some(num.to_string()),
                });
            }
        }

        suggestions
    }
}
