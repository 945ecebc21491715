//! Prop-Sieve: a polite, concurrency-bounded listing harvester
//!
//! This crate discovers property listings from a search service, filters them
//! against a keyword predicate evaluated on each listing's page, and extracts
//! structured records from the listings that pass. Stages are connected by
//! bounded queues and run with fixed-size worker pools.

pub mod client;
pub mod config;
pub mod locator;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod site;

use thiserror::Error;

/// Main error type for Prop-Sieve operations
#[derive(Debug, Error)]
pub enum SieveError {
    #[error("Setup failed while {stage}: {message}")]
    Setup { stage: &'static str, message: String },

    #[error("Discovery failed: all {pages} listing pages could not be fetched")]
    DiscoveryFailed { pages: u32 },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Stage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while reading remote content
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid number in {field}: {text:?}")]
    InvalidNumber { field: &'static str, text: String },

    #[error("Value of {0} is not disclosed")]
    Unknown(&'static str),

    #[error("Location lookup returned no matches")]
    NoLocationMatch,

    #[error("Invalid locator: {0}")]
    Locator(String),
}

/// Result type alias for Prop-Sieve operations
pub type Result<T> = std::result::Result<T, SieveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for parsing remote content
pub type ParseResult<T> = std::result::Result<T, ParseError>;

// Re-export commonly used types
pub use client::{Fetch, FetchFailure, HttpFetcher, RateAwareClient};
pub use config::{Config, PipelineConfig};
pub use model::{ItemOutcome, Record};
pub use pipeline::{Pipeline, PipelineOutcome, RunReport};
pub use progress::ProgressTracker;
