use crate::error::GenError;
use crate::types::{LogRow, HEADER};
use csv::{Terminator, WriterBuilder};
use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

const BUFFER_SIZE: usize = 8192;

/// Write `rows` as CSV to `outfile`, creating parent directories as needed.
///
/// When appending to a file that already has content the header is skipped,
/// so the file keeps a single header line. Returns the number of rows written.
pub fn write_log(outfile: &Path, rows: &[LogRow], append: bool) -> Result<usize, GenError> {
    if let Some(parent) = outfile.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating directory {}", parent.display());
            fs::create_dir_all(parent)?;
        }
    }

    let has_content = append && fs::metadata(outfile).map(|m| m.len() > 0).unwrap_or(false);

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(outfile)?;

    info!(
        "Writing {} rows to {} ({})",
        rows.len(),
        outfile.display(),
        if append { "append" } else { "overwrite" }
    );

    write_rows(BufWriter::with_capacity(BUFFER_SIZE, file), rows, !has_content)
}

/// Write the header (optionally) and `rows` to any sink.
pub fn write_rows<W: Write>(sink: W, rows: &[LogRow], header: bool) -> Result<usize, GenError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(sink);

    if header {
        writer.write_record(HEADER)?;
    }
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;

    Ok(rows.len())
}
