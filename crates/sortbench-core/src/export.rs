//! CSV export of the score table.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::eval::ScoreRow;

/// Write rows as CSV with a header row and no index column.
///
/// Absent metrics (unparsed responses) serialize as empty fields, so
/// consumers can tell "scored zero" from "could not be scored".
pub fn write_csv<W: Write>(writer: W, rows: &[ScoreRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write rows to a CSV file at `path`.
pub fn write_csv_file(path: &Path, rows: &[ScoreRow]) -> Result<()> {
    write_csv(File::create(path)?, rows)
}
