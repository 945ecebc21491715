//! Prop-Sieve main entry point
//!
//! This is the command-line interface for the Prop-Sieve listing harvester.

use anyhow::Context;
use clap::Parser;
use prop_sieve::config::{load_config_with_hash, Config, PipelineConfig, SearchConfig};
use prop_sieve::output::{export_run, print_report};
use prop_sieve::pipeline::Pipeline;
use prop_sieve::site::{ListingSource, RightmoveSearch};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Prop-Sieve: a polite property listing harvester
///
/// Prop-Sieve searches a listing service around a postcode, keeps the
/// listings whose pages mention any configured keyword, and exports their
/// details as CSV.
#[derive(Parser, Debug)]
#[command(name = "prop-sieve")]
#[command(version = "1.0.0")]
#[command(about = "A polite property listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// CSV file receiving the records (overrides output.csv-path)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Log file, truncated on every run (overrides output.log-path)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Seed for request pacing (overrides pipeline.seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Validate config and show the planned search without contacting the service
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    let log_path = cli
        .log_file
        .clone()
        .or_else(|| config.output.log_path.as_ref().map(PathBuf::from));
    setup_logging(cli.verbose, cli.quiet, log_path.as_deref())?;

    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    if cli.dry_run {
        handle_dry_run(&config, &cli)
    } else {
        handle_run(config, &cli).await
    }
}

/// Sets up the tracing subscriber based on verbosity level
///
/// Logs go to `log_path` when given, otherwise to stderr; stdout is left to
/// the progress bar and the report.
fn setup_logging(verbose: u8, quiet: bool, log_path: Option<&Path>) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("prop_sieve=info,warn"),
            1 => EnvFilter::new("prop_sieve=debug,info"),
            2 => EnvFilter::new("prop_sieve=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match log_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Could not create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

fn pipeline_config(config: &Config, cli: &Cli) -> PipelineConfig {
    let mut pipeline = PipelineConfig::from_settings(&config.pipeline);
    if cli.seed.is_some() {
        pipeline.seed = cli.seed;
    }
    pipeline
}

fn csv_path(config: &Config, cli: &Cli) -> PathBuf {
    cli.output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.csv_path))
}

/// Prints the search conditions as a bullet list
fn print_search(search: &SearchConfig) {
    println!();
    println!("Search:");
    println!("- postcode: {}", search.postcode);
    println!("- radius: {:.1}mi", search.radius);
    println!("- minBeds: {}", search.min_bedrooms);
    println!("- keywords: {}", search.keywords.join(", "));
    if !search.tenure.is_empty() {
        println!("- tenure: {}", search.tenure.join(", "));
    }
    println!();
}

/// Handles the --dry-run mode: validates config and shows what would be run
fn handle_dry_run(config: &Config, cli: &Cli) -> anyhow::Result<()> {
    println!("=== Prop-Sieve Dry Run ===");
    print_search(&config.search);

    let pipeline = pipeline_config(config, cli);
    println!("Pipeline Configuration:");
    println!("  Filter workers: {}", pipeline.filter_workers);
    println!("  Extract workers: {}", pipeline.extract_workers);
    println!("  Queue capacity: {}", pipeline.queue_capacity);
    println!(
        "  Politeness delay: {}-{}ms",
        pipeline.min_delay.as_millis(),
        pipeline.max_delay.as_millis()
    );
    println!("  Throttle cooldown: {}ms", pipeline.cooldown.as_millis());
    println!("  Request timeout: {}ms", pipeline.request_timeout.as_millis());
    match pipeline.max_pages {
        Some(limit) => println!("  Max listing pages: {}", limit),
        None => println!("  Max listing pages: unlimited"),
    }
    println!("  User agents: {}", pipeline.user_agents.len());

    let source = RightmoveSearch::new(&config.search).context("Invalid search settings")?;
    println!("\nRequests:");
    println!("  Location lookup: {}", source.location_lookup_url());
    println!(
        "  First listing page: {}",
        source.search_url("<location>", 0)
    );

    println!("\nOutput:");
    println!("  CSV: {}", csv_path(config, cli).display());
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main run: resolve, run every stage, export
async fn handle_run(config: Config, cli: &Cli) -> anyhow::Result<()> {
    print_search(&config.search);

    let pipeline = Pipeline::for_search(&config.search, pipeline_config(&config, cli))
        .context("Could not set up the pipeline")?;

    let plan = match pipeline.resolve().await {
        Ok(plan) => plan,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e).context("Could not resolve the search");
        }
    };
    println!("Found {} results: collecting listings...", plan.result_count);
    println!();

    let outcome = pipeline.run_plan(plan).await.context("Pipeline run failed")?;
    print_report(&outcome.report);

    let csv_path = csv_path(&config, cli);
    let summary_path = config.output.summary_path.as_deref().map(Path::new);
    export_run(&outcome, &config.search, &csv_path, summary_path)
        .with_context(|| format!("Failed to export results to {}", csv_path.display()))?;

    let absolute = std::fs::canonicalize(&csv_path).unwrap_or(csv_path);
    println!("\nResults CSV: {}", absolute.display());

    Ok(())
}
