use crate::client::DEFAULT_USER_AGENTS;
use crate::config::types::PipelineSettings;
use std::time::Duration;

/// Width of the progress bar in characters
pub const DEFAULT_PROGRESS_WIDTH: usize = 40;

/// Immutable run configuration shared read-only by every stage
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub filter_workers: usize,
    pub extract_workers: usize,
    pub queue_capacity: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub cooldown: Duration,
    pub page_delay: Duration,
    pub request_timeout: Duration,
    pub max_pages: Option<u32>,
    pub seed: Option<u64>,
    pub user_agents: Vec<String>,
    pub progress_width: usize,
}

impl PipelineConfig {
    /// Builds the run value from validated settings
    pub fn from_settings(settings: &PipelineSettings) -> Self {
        let user_agents = if settings.user_agents.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect()
        } else {
            settings.user_agents.clone()
        };

        Self {
            filter_workers: settings.filter_workers,
            extract_workers: settings.extract_workers,
            queue_capacity: settings.queue_capacity,
            min_delay: Duration::from_millis(settings.min_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            cooldown: Duration::from_millis(settings.cooldown_ms),
            page_delay: Duration::from_millis(settings.page_delay_ms),
            request_timeout: Duration::from_millis(settings.request_timeout_ms),
            max_pages: settings.max_pages,
            seed: settings.seed,
            user_agents,
            progress_width: DEFAULT_PROGRESS_WIDTH,
        }
    }

    /// Pool size actually used for a stage: never zero and never larger
    /// than the number of items the run can produce
    pub fn effective_workers(configured: usize, expected_items: u64) -> usize {
        let ceiling = usize::try_from(expected_items).unwrap_or(usize::MAX).max(1);
        configured.clamp(1, ceiling)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_settings(&PipelineSettings::default())
    }
}
