//! Configuration module for Prop-Sieve
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and turning the pipeline section into the immutable [`PipelineConfig`] a run uses.
//!
//! # Example
//!
//! ```no_run
//! use prop_sieve::config::{load_config, PipelineConfig};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! let run = PipelineConfig::from_settings(&config.pipeline);
//! println!("Filtering with {} workers", run.filter_workers);
//! ```

mod parser;
mod pipeline;
mod types;
mod validation;

// Re-export types
pub use pipeline::{PipelineConfig, DEFAULT_PROGRESS_WIDTH};
pub use types::{
    Config, OutputConfig, PipelineSettings, SearchConfig, DEFAULT_LOOKUP_URL, DEFAULT_ROOT_URL,
};
pub use validation::{validate_tenure, VALID_TENURES};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
