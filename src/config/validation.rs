use crate::config::types::{Config, OutputConfig, PipelineSettings, SearchConfig};
use crate::ConfigError;
use url::Url;

/// Tenure values understood by the search service
pub const VALID_TENURES: &[&str] = &["FREEHOLD", "LEASEHOLD", "SHARE_OF_FREEHOLD"];

/// Upper bound on any worker pool
const MAX_WORKERS: usize = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_pipeline_settings(&config.pipeline)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates search parameters
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.postcode.trim().is_empty() {
        return Err(ConfigError::Validation("postcode cannot be empty".to_string()));
    }

    if !(0.0..=40.0).contains(&config.radius) {
        return Err(ConfigError::Validation(format!(
            "radius must be between 0 and 40 miles, got {}",
            config.radius
        )));
    }

    validate_tenure(&config.tenure)?;

    for (name, value) in [("root-url", &config.root_url), ("lookup-url", &config.lookup_url)] {
        let url = Url::parse(value)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", name, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "{} must use http or https, got '{}'",
                name, value
            )));
        }
    }

    Ok(())
}

/// Checks that every tenure value is one the search service accepts
pub fn validate_tenure(tenures: &[String]) -> Result<(), ConfigError> {
    for tenure in tenures {
        if !VALID_TENURES.contains(&tenure.trim().to_uppercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "invalid tenure value: {}. Valid values are: {}",
                tenure,
                VALID_TENURES.join(", ")
            )));
        }
    }
    Ok(())
}

/// Validates pipeline settings
fn validate_pipeline_settings(config: &PipelineSettings) -> Result<(), ConfigError> {
    for (name, value) in [
        ("filter-workers", config.filter_workers),
        ("extract-workers", config.extract_workers),
    ] {
        if value < 1 || value > MAX_WORKERS {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_WORKERS, value
            )));
        }
    }

    if config.queue_capacity < 1 {
        return Err(ConfigError::Validation(
            "queue-capacity must be >= 1".to_string(),
        ));
    }

    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min-delay-ms ({}) must not exceed max-delay-ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    if config.request_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-ms must be >= 1".to_string(),
        ));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user-agents cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation("csv-path cannot be empty".to_string()));
    }

    if matches!(&config.log_path, Some(p) if p.is_empty()) {
        return Err(ConfigError::Validation("log-path cannot be empty".to_string()));
    }

    Ok(())
}
