use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::{Block, ProfilerResults, Track};

/// The CSV header row. Column names and order are stable.
pub const CSV_HEADER: &str =
    "track_index,block_index,name,file,line,duration_ns,duration_ms,duration_s";

/// Renders the results as CSV: a header row followed by one row per block.
///
/// Rows are ordered by track index, then by block index. The millisecond and second columns
/// are derived from the nanosecond column.
///
/// # Examples
///
/// ```
/// use stichotrope::{Profiler, to_csv_string};
///
/// let profiler = Profiler::new("csv");
/// drop(profiler.block(0, "work"));
///
/// let csv = to_csv_string(&profiler.get_results());
/// let mut lines = csv.lines();
///
/// assert_eq!(
///     lines.next(),
///     Some("track_index,block_index,name,file,line,duration_ns,duration_ms,duration_s")
/// );
/// assert!(lines.next().unwrap().starts_with("0,0,work,"));
/// ```
#[must_use]
pub fn to_csv_string(results: &ProfilerResults) -> String {
    let mut csv = String::with_capacity(
        CSV_HEADER
            .len()
            .saturating_add(1)
            .saturating_add(results.block_count().saturating_mul(80)),
    );

    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for track in results.tracks() {
        for block in track.blocks() {
            push_row(&mut csv, track, block);
        }
    }

    csv
}

/// Writes the results as CSV to a stream. See [`to_csv_string()`] for the format.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if writing to the stream fails.
pub fn write_csv(results: &ProfilerResults, mut writer: impl Write) -> Result<()> {
    writer.write_all(to_csv_string(results).as_bytes())?;
    Ok(())
}

/// Writes the results as CSV to a file, replacing any existing file. See
/// [`to_csv_string()`] for the format.
///
/// # Errors
///
/// Returns [`Error::InvalidDestination`](crate::Error::InvalidDestination) if `path` cannot
/// be a file (it is empty, names a directory or its parent directory does not exist) and
/// [`Error::Export`](crate::Error::Export) if writing the file fails.
pub fn export_csv(results: &ProfilerResults, path: impl AsRef<Path>) -> Result<()> {
    super::write_file(path.as_ref(), to_csv_string(results).as_bytes(), "csv")
}

fn push_row(csv: &mut String, track: &Track, block: &Block) {
    use std::fmt::Write as _;

    let location = block.location();

    // Writing into a String cannot fail.
    _ = writeln!(
        csv,
        "{},{},{},{},{},{},{},{}",
        track.track_index(),
        block.block_index(),
        escape(block.name()),
        escape(location.file()),
        location.line(),
        block.duration_ns(),
        block.duration_ms(),
        block.duration_s(),
    );
}

/// Quotes a field if it contains a delimiter, a quote or a line break, doubling any quotes.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
