//! Writes every artifact of a finished run

use crate::config::SearchConfig;
use crate::output::{write_csv, write_markdown_summary};
use crate::pipeline::PipelineOutcome;
use std::path::Path;

/// Writes the records CSV and, when `summary_path` is set, the markdown summary
pub fn export_run(
    outcome: &PipelineOutcome,
    search: &SearchConfig,
    csv_path: &Path,
    summary_path: Option<&Path>,
) -> crate::Result<()> {
    write_csv(csv_path, &outcome.records)?;

    if let Some(path) = summary_path {
        write_markdown_summary(&outcome.report, search, path)?;
    }

    Ok(())
}
