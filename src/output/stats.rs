//! Run statistics for the terminal
//!
//! This module renders a [`RunReport`] as the plain-text block printed at
//! the end of a run.

use crate::pipeline::RunReport;
use std::fmt::Write;

/// Formats the report as printed by [`print_report`]
pub fn format_report(report: &RunReport) -> String {
    let mut out = String::new();
    let candidates = report.candidates();

    let _ = writeln!(out, "=== Run Statistics ===\n");

    let _ = writeln!(out, "Discovery:");
    let _ = writeln!(out, "  Results advertised: {}", report.result_count);
    let _ = writeln!(
        out,
        "  Listing pages: {} fetched, {} failed, {} planned",
        report.discovery.pages_fetched, report.discovery.pages_failed, report.discovery.pages_planned
    );
    let _ = writeln!(out, "  Candidates discovered: {}", candidates);
    let _ = writeln!(out);

    let _ = writeln!(out, "Filter ({} workers):", report.filter_workers);
    let _ = writeln!(out, "  Passed: {}", report.filter.passed);
    let _ = writeln!(out, "  Rejected: {}", report.filter.rejected);
    let _ = writeln!(out, "  Failed: {}", report.filter.failures());
    let _ = writeln!(out);

    let _ = writeln!(out, "Extraction ({} workers):", report.extract_workers);
    let _ = writeln!(out, "  Extracted: {}", report.extraction.extracted);
    let _ = writeln!(out, "  Failed: {}", report.extraction.failures());
    let _ = writeln!(out);

    if report.failures() > 0 {
        let _ = writeln!(out, "Failures:");
        let _ = writeln!(out, "  Throttled: {}", report.throttled());
        let _ = writeln!(out, "  Network errors: {}", report.network_errors());
        let _ = writeln!(out);
    }

    let _ = writeln!(
        out,
        "Yield: {:.1}% ({} / {} candidates extracted) in {:.1}s",
        report.yield_percent(),
        report.records,
        candidates,
        report.elapsed.as_secs_f64()
    );

    out
}

/// Prints the run report to stdout
pub fn print_report(report: &RunReport) {
    println!();
    print!("{}", format_report(report));
}
