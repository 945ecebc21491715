//! Filter and extraction workers
//!
//! Progress advances exactly once per discovered candidate: the filter
//! advances for candidates it resolves (rejected or failed), and extraction
//! advances for every candidate that reached it.

use crate::client::{Fetch, FetchFailure, RateAwareClient};
use crate::model::{ItemOutcome, Record};
use crate::pipeline::pool::{StageWorker, Step};
use crate::progress::ProgressTracker;
use crate::site::{Predicate, RecordExtractor};
use std::sync::Arc;

fn failure_outcome(failure: &FetchFailure) -> ItemOutcome {
    match failure {
        FetchFailure::Throttled => ItemOutcome::Throttled,
        FetchFailure::Network(_) => ItemOutcome::NetworkError,
    }
}

/// Fetches each candidate and forwards those whose content passes the predicate
pub struct FilterWorker<F: Fetch> {
    client: Arc<RateAwareClient<F>>,
    predicate: Arc<dyn Predicate>,
    progress: Arc<ProgressTracker>,
}

impl<F: Fetch> FilterWorker<F> {
    pub fn new(
        client: Arc<RateAwareClient<F>>,
        predicate: Arc<dyn Predicate>,
        progress: Arc<ProgressTracker>,
    ) -> Self {
        Self {
            client,
            predicate,
            progress,
        }
    }
}

impl<F: Fetch> StageWorker<String, String> for FilterWorker<F> {
    async fn process(&self, locator: String) -> Step<String> {
        match self.client.visit(&locator).await {
            Ok(content) => {
                if self.predicate.matches(&content) {
                    tracing::debug!("Candidate passed: {}", locator);
                    Step::forward(ItemOutcome::Passed, locator)
                } else {
                    tracing::trace!("Candidate rejected: {}", locator);
                    self.progress.advance();
                    Step::resolved(ItemOutcome::Rejected)
                }
            }
            Err(failure) => {
                self.progress.advance();
                Step::resolved(failure_outcome(&failure))
            }
        }
    }

    fn undelivered(&self, _locator: String) {
        self.progress.advance();
    }
}

/// Fetches each passed candidate again and extracts its record
pub struct ExtractWorker<F: Fetch> {
    client: Arc<RateAwareClient<F>>,
    extractor: Arc<dyn RecordExtractor>,
    progress: Arc<ProgressTracker>,
}

impl<F: Fetch> ExtractWorker<F> {
    pub fn new(
        client: Arc<RateAwareClient<F>>,
        extractor: Arc<dyn RecordExtractor>,
        progress: Arc<ProgressTracker>,
    ) -> Self {
        Self {
            client,
            extractor,
            progress,
        }
    }
}

impl<F: Fetch> StageWorker<String, Record> for ExtractWorker<F> {
    async fn process(&self, locator: String) -> Step<Record> {
        let step = match self.client.visit(&locator).await {
            Ok(content) => {
                let record = self.extractor.extract(&locator, &content);
                Step::forward(ItemOutcome::Extracted, record)
            }
            Err(failure) => Step::resolved(failure_outcome(&failure)),
        };
        self.progress.advance();
        step
    }
}
