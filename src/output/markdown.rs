//! Markdown summary generation
//!
//! This module writes a human-readable summary of a run: the search that was
//! performed, how many candidates each stage handled, and what was lost.

use crate::config::SearchConfig;
use crate::output::OutputResult;
use crate::pipeline::RunReport;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of a run to `output_path`
///
/// # Arguments
///
/// * `report` - Accounting of the finished run
/// * `search` - Search conditions the run was started with
/// * `output_path` - Path where the markdown file should be written
pub fn write_markdown_summary(
    report: &RunReport,
    search: &SearchConfig,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(report, search);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Wrote run summary to {}", output_path.display());
    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(report: &RunReport, search: &SearchConfig) -> String {
    let mut md = String::new();

    md.push_str("# Prop-Sieve Run Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Started**: {}\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds\n",
        report.elapsed.as_secs_f64()
    ));
    md.push_str(&format!(
        "- **Workers**: {} filter, {} extract\n\n",
        report.filter_workers, report.extract_workers
    ));

    md.push_str("## Search\n\n");
    md.push_str(&format!("- **Postcode**: {}\n", search.postcode));
    md.push_str(&format!("- **Radius**: {:.1} miles\n", search.radius));
    md.push_str(&format!("- **Minimum bedrooms**: {}\n", search.min_bedrooms));
    if !search.keywords.is_empty() {
        md.push_str(&format!("- **Keywords**: {}\n", search.keywords.join(", ")));
    }
    if !search.tenure.is_empty() {
        md.push_str(&format!("- **Tenure**: {}\n", search.tenure.join(", ")));
    }
    md.push('\n');

    md.push_str("## Stages\n\n");
    md.push_str("| Stage | Processed | Forwarded | Rejected | Throttled | Network errors |\n");
    md.push_str("|-------|-----------|-----------|----------|-----------|----------------|\n");
    md.push_str(&format!(
        "| Filter | {} | {} | {} | {} | {} |\n",
        report.filter.processed(),
        report.filter.passed,
        report.filter.rejected,
        report.filter.throttled,
        report.filter.network_errors
    ));
    md.push_str(&format!(
        "| Extraction | {} | {} | - | {} | {} |\n\n",
        report.extraction.processed(),
        report.extraction.extracted,
        report.extraction.throttled,
        report.extraction.network_errors
    ));

    md.push_str("## Totals\n\n");
    md.push_str(&format!("- **Results advertised**: {}\n", report.result_count));
    md.push_str(&format!(
        "- **Listing pages**: {} of {} fetched\n",
        report.discovery.pages_fetched, report.discovery.pages_planned
    ));
    md.push_str(&format!("- **Candidates**: {}\n", report.candidates()));
    md.push_str(&format!("- **Records**: {}\n", report.records));
    md.push_str(&format!("- **Yield**: {:.2}%\n", report.yield_percent()));

    if report.discovery.pages_failed > 0 || report.failures() > 0 {
        md.push_str("\n## Losses\n\n");
        if report.discovery.pages_failed > 0 {
            md.push_str(&format!(
                "- {} listing pages could not be read\n",
                report.discovery.pages_failed
            ));
        }
        if report.throttled() > 0 {
            md.push_str(&format!(
                "- {} candidates dropped after throttling\n",
                report.throttled()
            ));
        }
        if report.network_errors() > 0 {
            md.push_str(&format!(
                "- {} candidates dropped after network errors\n",
                report.network_errors()
            ));
        }
    }

    md
}
