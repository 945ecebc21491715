//! End-of-run accounting

use crate::model::StageTally;
use crate::pipeline::discovery::DiscoveryReport;
use crate::progress::ProgressSnapshot;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// What happened during one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,

    /// Result count advertised by the search service
    pub result_count: u32,

    pub discovery: DiscoveryReport,
    pub filter: StageTally,
    pub extraction: StageTally,

    pub filter_workers: usize,
    pub extract_workers: usize,

    /// Records handed to the collector
    pub records: usize,

    pub progress: ProgressSnapshot,
}

impl RunReport {
    /// Candidates that entered the pipeline
    pub fn candidates(&self) -> u64 {
        self.discovery.candidates
    }

    /// Candidates lost to throttling or network failures, in either stage
    pub fn failures(&self) -> u64 {
        self.filter.failures() + self.extraction.failures()
    }

    pub fn throttled(&self) -> u64 {
        self.filter.throttled + self.extraction.throttled
    }

    pub fn network_errors(&self) -> u64 {
        self.filter.network_errors + self.extraction.network_errors
    }

    /// Share of candidates that ended as records, in percent
    pub fn yield_percent(&self) -> f64 {
        if self.candidates() == 0 {
            return 0.0;
        }
        self.records as f64 * 100.0 / self.candidates() as f64
    }

    /// Every candidate was accounted for by exactly one terminal outcome
    pub fn is_balanced(&self) -> bool {
        let resolved = self.filter.rejected
            + self.filter.failures()
            + self.filter.undelivered
            + self.extraction.processed();
        resolved == self.candidates()
    }
}
