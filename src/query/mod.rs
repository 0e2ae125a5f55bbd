//! Natural language questions over a dataset.
//!
//! This module provides:
//! - Intent classification of free-text questions against a schema
//! - Execution of structured intents into typed results

pub mod classifier;
pub mod executor;
pub mod types;

pub use classifier::*;
pub use executor::*;
pub use types::*;
