//! askdata command-line entry point

use askdata::{config::expand_path, Config};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

/// askdata: ask questions about a CSV file in plain English
#[derive(Parser, Debug)]
#[command(name = "askdata")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Infer the schema, relationships and quality metrics of a CSV file
    Analyze {
        /// Path to the CSV file
        csv: String,
    },
    /// Group columns by type and suggest charts
    Suggest {
        /// Path to the CSV file
        csv: String,
    },
    /// Answer one question
    Ask {
        /// Path to the CSV file
        csv: String,
        /// Question, e.g. "What is the average salary?"
        question: String,
        /// Answer with this chart kind (bar, line, scatter, histogram, pie)
        #[arg(long)]
        chart: Option<String>,
    },
    /// Show how a question is understood without answering it
    Intent {
        /// Path to the CSV file
        csv: String,
        /// Question to classify
        question: String,
    },
    /// Ask questions interactively
    Repl {
        /// Path to the CSV file
        csv: String,
    },
}

fn init_logging(verbose: bool, json_logs: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.json_logs);

    let config = if let Some(path) = &args.config {
        Config::from_file(expand_path(path))?
    } else {
        Config::load()?
    };
    tracing::debug!(
        similarity = config.embedding.enabled,
        threshold = config.classifier.similarity_threshold,
        "Configuration loaded"
    );

    match args.command {
        Command::Analyze { csv } => cli::run_analyze(&config, csv, args.json),
        Command::Suggest { csv } => cli::run_suggest(&config, csv, args.json),
        Command::Ask {
            csv,
            question,
            chart,
        } => cli::run_ask(&config, csv, question, chart, args.json),
        Command::Intent { csv, question } => cli::run_intent(&config, csv, question, args.json),
        Command::Repl { csv } => cli::run_repl(&config, csv, args.json),
    }
}
