//! Line-oriented CSV read/write helpers with a per-row transform.
//!
//! Both directions take a transform that returns `Ok(Some(_))` to keep a row
//! and `Ok(None)` to drop it. Errors from the transform stop the iteration
//! and are returned as-is. The generic `read_rows`/`write_rows` work on any
//! `io::Read`/`io::Write`; `read_file`/`write_file` open paths.

use crate::error::SqlPullError;
use crate::Result;
use csv::StringRecord;
use std::fs::File;
use std::io;
use std::path::Path;

/// Reads every physical row of `reader` in order, optionally discarding the
/// first.
///
/// Blank lines are rows too: they reach the transform as empty records,
/// and a leading blank line is what `skip_header` drops. The first row is
/// skipped by position; it is not checked to look like a header.
///
/// # Errors
/// Returns an I/O error if `reader` fails, a CSV error if a record cannot be
/// decoded, or whatever error the transform produced.
///
/// # Example
/// ```rust
/// use sqlpull_core::csv_rows::read_rows;
///
/// let data = "name,age\nada,36\nalan,41\n";
/// let names = read_rows(data.as_bytes(), true, |record| {
///     Ok(record.get(0).map(str::to_string))
/// })
/// .unwrap();
/// assert_eq!(names, vec!["ada", "alan"]);
/// ```
pub fn read_rows<R, T, F>(mut reader: R, skip_header: bool, mut transform: F) -> Result<Vec<T>>
where
    R: io::Read,
    F: FnMut(StringRecord) -> Result<Option<T>>,
{
    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(|e| SqlPullError::io("Failed to read CSV input", e))?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data.as_slice());

    let mut rows = Vec::new();
    let mut physical_row: usize = 0;
    let mut emit = |record: StringRecord| -> Result<()> {
        let index = physical_row;
        physical_row = physical_row.saturating_add(1);
        if skip_header && index == 0 {
            return Ok(());
        }
        if let Some(row) = transform(record)? {
            rows.push(row);
        }
        Ok(())
    };

    let mut record = StringRecord::new();
    loop {
        let start = byte_offset(csv_reader.position(), data.len());
        let more = csv_reader
            .read_record(&mut record)
            .map_err(|e| SqlPullError::csv("Failed to read CSV record", e))?;
        let end = if more {
            byte_offset(csv_reader.position(), data.len())
        } else {
            data.len()
        };

        // the parser steps over empty lines without reporting them
        for _ in 0..skipped_blank_lines(&data, start, end) {
            emit(StringRecord::new())?;
        }
        if !more {
            break;
        }
        emit(record.clone())?;
    }

    Ok(rows)
}

fn byte_offset(position: &csv::Position, len: usize) -> usize {
    usize::try_from(position.byte()).map_or(len, |offset| offset.min(len))
}

/// Counts the line terminators at the front of `data[start..end]`.
///
/// `\r\n`, `\r` and `\n` each end one row. A `\n` right at `start` that
/// completes the previous record's `\r\n` is not a row of its own.
fn skipped_blank_lines(data: &[u8], start: usize, end: usize) -> usize {
    let end = end.min(data.len());
    let mut i = start;
    if i > 0 && i < end && data[i] == b'\n' && data[i - 1] == b'\r' {
        i += 1;
    }

    let mut count: usize = 0;
    while i < end {
        match data[i] {
            b'\r' => {
                if data.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => {}
            _ => break,
        }
        count = count.saturating_add(1);
        i += 1;
    }
    count
}

/// Opens `path` and reads it with [`read_rows`].
///
/// # Errors
/// Returns an I/O error if the file cannot be opened, otherwise as
/// [`read_rows`].
pub fn read_file<P, T, F>(path: P, skip_header: bool, transform: F) -> Result<Vec<T>>
where
    P: AsRef<Path>,
    F: FnMut(StringRecord) -> Result<Option<T>>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| SqlPullError::io(format!("Failed to open {}", path.display()), e))?;

    tracing::debug!(path = %path.display(), skip_header, "Reading CSV rows");
    read_rows(file, skip_header, transform)
}

/// Writes an optional header followed by the kept transform results.
///
/// Rows are written as they are produced; on failure whatever was already
/// written stays in `writer`.
///
/// # Errors
/// Returns a CSV error if a record cannot be written or flushed, or the
/// transform's error.
///
/// # Example
/// ```rust
/// use sqlpull_core::csv_rows::write_rows;
///
/// let mut out = Vec::new();
/// write_rows(&mut out, Some(&["id", "name"]), [(1, "ada"), (2, "")], |(id, name)| {
///     Ok((!name.is_empty()).then(|| vec![id.to_string(), name.to_string()]))
/// })
/// .unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "id,name\n1,ada\n");
/// ```
pub fn write_rows<W, H, D, F, R>(writer: W, header: Option<H>, data: D, mut transform: F) -> Result<()>
where
    W: io::Write,
    H: IntoIterator,
    H::Item: AsRef<[u8]>,
    D: IntoIterator,
    F: FnMut(D::Item) -> Result<Option<R>>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    if let Some(header) = header {
        csv_writer
            .write_record(header)
            .map_err(|e| SqlPullError::csv("Failed to write CSV header", e))?;
    }

    for entry in data {
        if let Some(row) = transform(entry)? {
            csv_writer
                .write_record(row)
                .map_err(|e| SqlPullError::csv("Failed to write CSV record", e))?;
        }
    }

    csv_writer
        .flush()
        .map_err(|e| SqlPullError::io("Failed to flush CSV output", e))?;
    Ok(())
}

/// Creates (or truncates) `path` and writes it with [`write_rows`].
///
/// # Errors
/// Returns an I/O error if the file cannot be created, otherwise as
/// [`write_rows`].
pub fn write_file<P, H, D, F, R>(path: P, header: Option<H>, data: D, transform: F) -> Result<()>
where
    P: AsRef<Path>,
    H: IntoIterator,
    H::Item: AsRef<[u8]>,
    D: IntoIterator,
    F: FnMut(D::Item) -> Result<Option<R>>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| SqlPullError::io(format!("Failed to create {}", path.display()), e))?;

    tracing::debug!(path = %path.display(), "Writing CSV rows");
    write_rows(file, header, data, transform)
}
