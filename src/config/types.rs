use serde::Deserialize;

/// Default search service root
pub const DEFAULT_ROOT_URL: &str = "https://www.rightmove.co.uk";

/// Default location typeahead service root
pub const DEFAULT_LOOKUP_URL: &str = "https://los.rightmove.co.uk";

/// Main configuration structure for Prop-Sieve
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub output: OutputConfig,
}

/// What to search for
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SearchConfig {
    /// Postcode the search is centred on (e.g. "SE1 9SG")
    pub postcode: String,

    /// Search radius in miles
    #[serde(default)]
    pub radius: f32,

    /// Minimum number of bedrooms
    #[serde(default)]
    pub min_bedrooms: u32,

    /// Keywords a listing page must mention (any of them, case-insensitive)
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Tenure filters passed to the search service
    #[serde(default)]
    pub tenure: Vec<String>,

    /// Root of the search service
    #[serde(default = "default_root_url")]
    pub root_url: String,

    /// Root of the location typeahead service
    #[serde(default = "default_lookup_url")]
    pub lookup_url: String,
}

/// Pipeline tuning knobs
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PipelineSettings {
    /// Number of workers evaluating the keyword predicate
    pub filter_workers: usize,

    /// Number of workers extracting records
    pub extract_workers: usize,

    /// Capacity of every inter-stage queue
    pub queue_capacity: usize,

    /// Lower bound of the randomized delay before each request (milliseconds)
    pub min_delay_ms: u64,

    /// Upper bound of the randomized delay before each request (milliseconds)
    pub max_delay_ms: u64,

    /// Pause imposed on a worker after the service signals throttling (milliseconds)
    pub cooldown_ms: u64,

    /// Fixed delay between listing pages during discovery (milliseconds)
    pub page_delay_ms: u64,

    /// Upper bound on a single request (milliseconds)
    pub request_timeout_ms: u64,

    /// Optional cap on the number of listing pages walked
    pub max_pages: Option<u32>,

    /// Seed for delay and user-agent selection
    pub seed: Option<u64>,

    /// User-agent pool; empty means the built-in pool
    pub user_agents: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            filter_workers: 4,
            extract_workers: 4,
            queue_capacity: 64,
            min_delay_ms: 250,
            max_delay_ms: 1000,
            cooldown_ms: 30_000,
            page_delay_ms: 1000,
            request_timeout_ms: 15_000,
            max_pages: None,
            seed: None,
            user_agents: Vec::new(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    /// Path of the CSV file receiving the records
    pub csv_path: String,

    /// Log file, truncated on every run; stderr when absent
    pub log_path: Option<String>,

    /// Optional markdown run summary
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "results.csv".to_string(),
            log_path: None,
            summary_path: None,
        }
    }
}

fn default_root_url() -> String {
    DEFAULT_ROOT_URL.to_string()
}

fn default_lookup_url() -> String {
    DEFAULT_LOOKUP_URL.to_string()
}
