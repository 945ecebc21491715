//! Pipeline module for running a search end to end
//!
//! This module contains:
//! - Search resolution and sequential listing-page discovery
//! - Fixed-size worker pools with a completion barrier
//! - The filter and extraction workers
//! - The collector and the coordinator tying everything together

mod collector;
mod coordinator;
mod discovery;
mod pool;
mod report;
mod stages;

pub use collector::collect;
pub use coordinator::{Pipeline, PipelineOutcome};
pub use discovery::{resolve_plan, Discovery, DiscoveryReport, SearchPlan};
pub use pool::{SharedReceiver, StageWorker, Step, WorkerPool};
pub use report::RunReport;
pub use stages::{ExtractWorker, FilterWorker};
