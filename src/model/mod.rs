//! Data model for items moving through the pipeline
//!
//! - `Record`: the structured result of extracting one listing
//! - `ItemOutcome`: what a stage did with one item
//! - `StageTally`: outcome counts kept per worker and merged per stage

mod outcome;
mod record;

pub use outcome::{ItemOutcome, StageTally};
pub use record::{Record, RECORD_COLUMNS};
