//! MySQL cell to string rendering.
//!
//! Cells are rendered the way a JDBC `getString` would show them: numbers
//! and text verbatim, temporal values in ISO-like form, binary data as lossy
//! UTF-8. SQL NULL becomes `None`.

use crate::driver::Cells;
use crate::error::SqlPullError;
use crate::Result;
use sqlx::mysql::MySqlRow;
use sqlx::mysql::types::MySqlTime;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// Renders every cell of a row in column order.
///
/// # Errors
/// Returns a query error if a non-null cell has a type that cannot be
/// rendered.
pub fn render_row(row: &MySqlRow) -> Result<Cells> {
    (0..row.len()).map(|index| render_cell(row, index)).collect()
}

/// Renders one cell. Decoders are tried from most to least common.
fn render_cell(row: &MySqlRow, index: usize) -> Result<Option<String>> {
    let is_null = row
        .try_get_raw(index)
        .map_err(|e| SqlPullError::query_failed(format!("Failed to read column {}", index), e))?
        .is_null();
    if is_null {
        return Ok(None);
    }

    if let Ok(v) = row.try_get::<String, _>(index) {
        return Ok(Some(v));
    }
    if let Ok(v) = row.try_get::<i64, _>(index) {
        return Ok(Some(v.to_string()));
    }
    if let Ok(v) = row.try_get::<u64, _>(index) {
        return Ok(Some(v.to_string()));
    }
    if let Ok(v) = row.try_get::<f64, _>(index) {
        return Ok(Some(v.to_string()));
    }
    if let Ok(v) = row.try_get::<f32, _>(index) {
        return Ok(Some(v.to_string()));
    }
    if let Ok(v) = row.try_get::<chrono::NaiveDateTime, _>(index) {
        return Ok(Some(v.format("%Y-%m-%d %H:%M:%S%.f").to_string()));
    }
    if let Ok(v) = row.try_get::<chrono::NaiveDate, _>(index) {
        return Ok(Some(v.format("%Y-%m-%d").to_string()));
    }
    if let Ok(v) = row.try_get::<chrono::NaiveTime, _>(index) {
        return Ok(Some(v.format("%H:%M:%S%.f").to_string()));
    }
    // TIME is an interval: negative or past 24h does not fit NaiveTime
    if let Ok(v) = row.try_get::<MySqlTime, _>(index) {
        return Ok(Some(v.to_string()));
    }
    if let Ok(v) = row.try_get::<Vec<u8>, _>(index) {
        return Ok(Some(String::from_utf8_lossy(&v).into_owned()));
    }

    // DECIMAL, JSON, SET and friends arrive as text on the wire
    row.try_get_unchecked::<String, _>(index)
        .map(Some)
        .map_err(|e| {
            let type_name = row
                .columns()
                .get(index)
                .map_or("unknown", |column| column.type_info().name());
            SqlPullError::query_failed(
                format!("Cannot render column {} of type {}", index, type_name),
                e,
            )
        })
}
