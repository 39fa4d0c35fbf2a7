//! Record/column occupancy
//!
//! A record is active in a column when the two closed date intervals
//! intersect. A record spanning several columns is active in each of them.

use chrono::NaiveDate;
use plancal_core::{Column, Granularity, Record};

/// Last day covered by the column anchored at `anchor`
pub fn column_end(anchor: NaiveDate, unit: Granularity) -> NaiveDate {
    unit.span_end(anchor)
}

/// Whether `record` is active in the column anchored at `anchor`
pub fn is_active(record: &Record, anchor: NaiveDate, unit: Granularity) -> bool {
    record.start <= column_end(anchor, unit) && record.end >= anchor
}

/// Whether `record` overlaps an already-built column
pub fn is_active_in(record: &Record, column: &Column) -> bool {
    record.start <= column.end && record.end >= column.anchor
}

/// Indices of every column in which `record` is active
pub fn active_columns(record: &Record, columns: &[Column]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .filter(|(_, column)| is_active_in(record, column))
        .map(|(i, _)| i)
        .collect()
}
