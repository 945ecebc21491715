//! Pipeline coordinator - wires the stages together and runs them
//!
//! A run consists of:
//! - Resolving the search plan (location and result count)
//! - Sizing the bounded queues and the two worker pools
//! - Running discovery, the filter pool, the extraction pool and the
//!   collector concurrently
//! - Waiting for every stage to drain and producing the run report

use crate::client::{Fetch, HttpFetcher, RateAwareClient};
use crate::config::{PipelineConfig, SearchConfig};
use crate::model::Record;
use crate::pipeline::collector::collect;
use crate::pipeline::discovery::{resolve_plan, Discovery, SearchPlan};
use crate::pipeline::pool::WorkerPool;
use crate::pipeline::report::RunReport;
use crate::pipeline::stages::{ExtractWorker, FilterWorker};
use crate::progress::ProgressTracker;
use crate::site::{
    KeywordPredicate, ListingSource, Predicate, PropertyPageExtractor, RecordExtractor,
    RightmoveSearch,
};
use crate::SieveError;
use chrono::Utc;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Records and accounting of a finished run
#[derive(Debug)]
pub struct PipelineOutcome {
    pub records: Vec<Record>,
    pub report: RunReport,
}

/// Main pipeline structure
pub struct Pipeline<F: Fetch> {
    config: Arc<PipelineConfig>,
    client: Arc<RateAwareClient<F>>,
    source: Arc<dyn ListingSource>,
    predicate: Arc<dyn Predicate>,
    extractor: Arc<dyn RecordExtractor>,
    progress_sink: Option<Box<dyn Write + Send>>,
}

impl<F: Fetch> Pipeline<F> {
    /// Creates a pipeline from its configuration and collaborators
    ///
    /// # Arguments
    ///
    /// * `config` - Run configuration, shared read-only with every stage
    /// * `client` - Rate-aware client every request goes through
    /// * `source` - Search resolution and listing-page parsing
    /// * `predicate` - Filter applied to each candidate's content
    /// * `extractor` - Record extraction for passed candidates
    pub fn new(
        config: PipelineConfig,
        client: RateAwareClient<F>,
        source: impl ListingSource + 'static,
        predicate: impl Predicate + 'static,
        extractor: impl RecordExtractor + 'static,
    ) -> Self {
        Self {
            config: Arc::new(config),
            client: Arc::new(client),
            source: Arc::new(source),
            predicate: Arc::new(predicate),
            extractor: Arc::new(extractor),
            progress_sink: None,
        }
    }

    /// Draws the progress bar into `sink` instead of stdout
    pub fn with_progress_sink(mut self, sink: Box<dyn Write + Send>) -> Self {
        self.progress_sink = Some(sink);
        self
    }

    /// Resolves the search plan without starting any stage
    pub async fn resolve(&self) -> Result<SearchPlan, SieveError> {
        resolve_plan(&self.client, self.source.as_ref(), &self.config).await
    }

    /// Resolves the plan and runs every stage to completion
    pub async fn run(self) -> Result<PipelineOutcome, SieveError> {
        let plan = self.resolve().await?;
        self.run_plan(plan).await
    }

    /// Runs every stage for an already resolved plan
    ///
    /// Returns after the collector has seen the record queue close, which
    /// happens only once discovery and both pools have drained.
    pub async fn run_plan(self, plan: SearchPlan) -> Result<PipelineOutcome, SieveError> {
        let started_at = Utc::now();
        let start_time = Instant::now();
        let config = Arc::clone(&self.config);

        let progress = Arc::new(match self.progress_sink {
            Some(sink) => ProgressTracker::new(plan.total, config.progress_width, sink),
            None => ProgressTracker::stdout(plan.total, config.progress_width),
        });
        progress.draw();

        let filter_workers = PipelineConfig::effective_workers(config.filter_workers, plan.total);
        let extract_workers = PipelineConfig::effective_workers(config.extract_workers, plan.total);
        tracing::info!(
            "Starting pipeline: {} expected candidates, {} filter workers, {} extract workers",
            plan.total,
            filter_workers,
            extract_workers
        );

        let capacity = config.queue_capacity.max(1);
        let (candidate_tx, candidate_rx) = mpsc::channel::<String>(capacity);
        let (passed_tx, passed_rx) = mpsc::channel::<String>(capacity);
        let (record_tx, record_rx) = mpsc::channel::<Record>(capacity);

        let result_count = plan.result_count;
        let discovery = Discovery::new(
            Arc::clone(&self.client),
            Arc::clone(&self.source),
            config.page_delay,
        );
        let discovery_task = tokio::spawn(discovery.run(plan, candidate_tx));

        let filter_pool = WorkerPool::spawn(
            "filter",
            filter_workers,
            candidate_rx,
            passed_tx,
            Arc::new(FilterWorker::new(
                Arc::clone(&self.client),
                Arc::clone(&self.predicate),
                Arc::clone(&progress),
            )),
        );
        let extract_pool = WorkerPool::spawn(
            "extract",
            extract_workers,
            passed_rx,
            record_tx,
            Arc::new(ExtractWorker::new(
                Arc::clone(&self.client),
                Arc::clone(&self.extractor),
                Arc::clone(&progress),
            )),
        );
        let filter_task = tokio::spawn(filter_pool.join());
        let extract_task = tokio::spawn(extract_pool.join());

        let records = collect(record_rx).await;

        let (discovery, filter, extraction) =
            tokio::join!(discovery_task, filter_task, extract_task);
        progress.finish();

        let discovery = discovery??;
        let filter = filter?;
        let extraction = extraction?;
        let report = RunReport {
            started_at,
            elapsed: start_time.elapsed(),
            result_count,
            discovery,
            filter,
            extraction,
            filter_workers,
            extract_workers,
            records: records.len(),
            progress: progress.snapshot(),
        };

        tracing::info!(
            "{} of {} candidates extracted in {:.1}s",
            report.records,
            report.candidates(),
            report.elapsed.as_secs_f64()
        );
        if !report.is_balanced() {
            tracing::warn!("Candidate accounting does not balance: {:?}", report);
        }

        Ok(PipelineOutcome { records, report })
    }
}

impl Pipeline<HttpFetcher> {
    /// Builds the HTTP pipeline for a Rightmove search
    ///
    /// Fails with [`SieveError::Http`] when the HTTP client cannot be built
    /// and with [`SieveError::Parse`] when the service URLs are malformed.
    pub fn for_search(search: &SearchConfig, config: PipelineConfig) -> crate::Result<Self> {
        let fetcher = HttpFetcher::new(config.request_timeout)?;
        let source = RightmoveSearch::new(search)?;
        let client = RateAwareClient::new(fetcher, &config);

        Ok(Self::new(
            config,
            client,
            source,
            KeywordPredicate::new(&search.keywords),
            PropertyPageExtractor::new(),
        ))
    }
}
