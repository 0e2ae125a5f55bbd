//! CLI module for the askdata command-line interface.
//!
//! Each command loads a CSV file into a [`Session`](askdata::Session) and
//! prints its answer as JSON or human-readable text.

mod commands;
mod output;
pub mod types;

pub use commands::*;
