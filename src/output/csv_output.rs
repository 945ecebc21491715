//! CSV export of extracted records

use crate::model::{Record, RECORD_COLUMNS};
use crate::output::{OutputError, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes `records` to `output_path`, replacing any existing file
///
/// The header row is always written, even when there are no records, so the
/// column layout of an empty run is still recognizable.
pub fn write_csv(output_path: &Path, records: &[Record]) -> OutputResult<()> {
    let file = File::create(output_path)?;
    write_records(file, records)?;
    tracing::info!("Wrote {} records to {}", records.len(), output_path.display());
    Ok(())
}

/// Writes `records` as CSV into any writer
pub fn write_records<W: Write>(writer: W, records: &[Record]) -> OutputResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(RECORD_COLUMNS)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer
        .flush()
        .map_err(|e| OutputError::Write(e.to_string()))?;

    Ok(())
}
