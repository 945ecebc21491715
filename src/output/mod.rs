//! Output module for exporting records and reporting on a run
//!
//! This module handles:
//! - Writing extracted records as CSV
//! - Printing the run report to stdout
//! - Generating an optional markdown summary of the run
//! - Exporting both artifacts of a finished run

mod csv_output;
mod export;
mod markdown;
pub mod stats;

pub use csv_output::{write_csv, write_records};
pub use export::export_run;
pub use markdown::{format_markdown_summary, write_markdown_summary};
pub use stats::{format_report, print_report};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
