//! CLI command implementations.
//!
//! Every command loads the CSV file into a [`Session`] and prints through
//! the `output` module.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use askdata::{
    config::expand_path, create_scorer, dataset::from_csv_path, Config, IntentClassifier, Session,
};

use super::output;
use super::types::{AnalyzeResponse, AskResponse, IntentResponse, SuggestResponse};

/// Load `path` and start a session configured by `config`.
fn open_session(config: &Config, path: &str) -> Result<Session> {
    let path_buf = expand_path(path);
    let dataset = from_csv_path(&path_buf)
        .with_context(|| format!("Failed to load dataset from {}", path_buf.display()))?;

    let scorer = match create_scorer(&config.embedding) {
        Ok(scorer) => scorer,
        Err(e) => {
            tracing::warn!("Similarity matching unavailable, using exact matching: {}", e);
            None
        }
    };
    let classifier = match scorer {
        Some(scorer) => {
            IntentClassifier::with_similarity(scorer, config.classifier.similarity_threshold)
        }
        None => IntentClassifier::new(),
    }
    .with_policy(config.classifier.similarity_policy());
    tracing::debug!(
        similarity = classifier.has_similarity(),
        threshold = classifier.policy().threshold,
        rows = dataset.row_count(),
        "Session ready"
    );

    Ok(Session::with_config(dataset, classifier, config))
}

/// Run the analyze command.
pub fn run_analyze(config: &Config, path: String, json_output: bool) -> Result<()> {
    let session = open_session(config, &path)?;
    let response = AnalyzeResponse {
        path,
        analysis: session.analysis(),
    };
    output::print_analysis(&response, json_output);
    Ok(())
}

/// Run the suggest command.
pub fn run_suggest(config: &Config, path: String, json_output: bool) -> Result<()> {
    let session = open_session(config, &path)?;
    let analysis = session.analysis();
    let response = SuggestResponse {
        columns_by_type: analysis.suggest_columns_by_type(),
        visualizations: analysis.suggest_visualizations(),
    };
    output::print_suggestions(&response, json_output);
    Ok(())
}

/// Run the ask command.
pub fn run_ask(
    config: &Config,
    path: String,
    question: String,
    chart: Option<String>,
    json_output: bool,
) -> Result<()> {
    let mut session = open_session(config, &path)?;
    let result = match chart {
        Some(chart) => session.ask_with_chart(&question, &chart),
        None => session.ask(&question),
    };
    output::print_answer(&AskResponse::new(&question, result), json_output);
    Ok(())
}

/// Run the intent command.
pub fn run_intent(config: &Config, path: String, question: String, json_output: bool) -> Result<()> {
    let session = open_session(config, &path)?;
    let intent = session.classify(&question);
    let response = IntentResponse {
        query: &question,
        intent: &intent,
    };
    output::print_intent(&response, json_output);
    Ok(())
}

/// Run an interactive question loop until `exit`, `quit` or end of input.
pub fn run_repl(config: &Config, path: String, json_output: bool) -> Result<()> {
    let mut session = open_session(config, &path)?;
    if !json_output {
        println!(
            "Loaded {} ({} rows, {} columns). Type 'history', 'clear' or 'exit'.",
            path,
            session.dataset().row_count(),
            session.dataset().column_count()
        );
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if !json_output {
            print!("> ");
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let question = line.trim();

        match question {
            "" => continue,
            "exit" | "quit" => break,
            "history" => output::print_history(session.history().iter(), json_output),
            "clear" => {
                session.clear_history();
                if !json_output {
                    println!("History cleared.");
                }
            }
            _ => {
                let result = session.ask(question);
                output::print_answer(&AskResponse::new(question, result), json_output);
            }
        }
    }
    Ok(())
}
