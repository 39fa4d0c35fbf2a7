//! Column construction for a view window
//!
//! Columns are emitted in ascending order with no gaps or overlaps. For
//! week and month granularity the first anchor is pulled back to the unit
//! boundary; a partial trailing unit still gets its column.

use chrono::NaiveDate;
use plancal_core::{Column, Granularity, ViewWindow};

/// Lazy, restartable sequence of columns
#[derive(Clone, Debug)]
pub struct ColumnIter {
    cursor: Option<NaiveDate>,
    end: NaiveDate,
    unit: Granularity,
}

impl Iterator for ColumnIter {
    type Item = Column;

    fn next(&mut self) -> Option<Column> {
        let anchor = self.cursor.filter(|c| *c <= self.end)?;
        let next = self.unit.advance(anchor);
        // Guard against a non-advancing step at the edge of the date range
        self.cursor = (next > anchor).then_some(next);
        Some(Column::new(anchor, self.unit))
    }
}

/// Columns covering `[start, end]` at the given granularity.
///
/// `start > end` yields an empty sequence.
pub fn columns(start: NaiveDate, end: NaiveDate, unit: Granularity) -> ColumnIter {
    let cursor = (start <= end).then(|| unit.normalize(start));
    ColumnIter { cursor, end, unit }
}

/// Eagerly collect the columns of a view window
pub fn build_columns(window: &ViewWindow) -> Vec<Column> {
    columns(window.start, window.end, window.unit).collect()
}

/// Column anchors formatted as `YYYY-MM-DD`
pub fn column_anchors(window: &ViewWindow) -> Vec<String> {
    columns(window.start, window.end, window.unit)
        .map(|c| c.anchor_iso())
        .collect()
}
