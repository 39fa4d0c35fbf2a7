//! Layout engine
//!
//! Composes filtering, column building, color reconciliation, grouping and
//! occupancy into the render model. The only state carried between passes
//! is the color map, passed in explicitly.

use plancal_core::{
    Cell, ColorMap, FilterSelection, LayoutModel, Palette, Record, Row, Timeline, ViewWindow,
};
use tracing::debug;

use crate::columns::build_columns;
use crate::filter::filter_records;
use crate::grouping::{group_key, group_records, representative, GroupBy};
use crate::occupancy::is_active_in;

/// Knobs that shape a layout pass without being part of its data
#[derive(Clone, Debug, Default)]
pub struct LayoutOptions {
    pub group_by: GroupBy,
    pub palette: Palette,
}

impl LayoutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }
}

/// Compute the render model for one pass.
///
/// Steps: reconcile `colors` over the keys of every record, filter,
/// short-circuit to [`LayoutModel::Empty`], build columns, group and sort,
/// resolve each group/column cell.
///
/// Colors follow the full record set so a key hidden by a filter keeps its
/// color and is not pruned.
pub fn build_layout(
    records: &[Record],
    window: &ViewWindow,
    selection: &FilterSelection,
    colors: &mut ColorMap,
    options: &LayoutOptions,
) -> LayoutModel {
    let keys: Vec<String> = records.iter().map(|r| group_key(r, options.group_by)).collect();
    let changes = colors.reconcile(&keys, &options.palette);
    if !changes.is_noop() {
        debug!(
            assigned = ?changes.assigned,
            pruned = ?changes.pruned,
            "color map reconciled"
        );
    }

    let visible = filter_records(records, selection);
    if visible.is_empty() {
        debug!(total = records.len(), "no records match the active filters");
        return LayoutModel::Empty;
    }

    let columns = build_columns(window);

    let rows: Vec<Row> = group_records(&visible, options.group_by)
        .into_iter()
        .map(|group| {
            let cells = columns
                .iter()
                .map(|column| {
                    let active: Vec<&Record> = group
                        .entries
                        .iter()
                        .copied()
                        .filter(|r| is_active_in(r, column))
                        .collect();
                    match representative(&active) {
                        Some(rep) => Cell {
                            active: true,
                            representative: Some(rep.id.clone()),
                            records: active.iter().map(|r| r.id.clone()).collect(),
                        },
                        None => Cell::inactive(),
                    }
                })
                .collect();

            let color = colors
                .get(&group.key)
                .cloned()
                .unwrap_or_else(|| options.palette.first().clone());

            Row {
                color,
                entries: group.entries.iter().map(|r| r.id.clone()).collect(),
                key: group.key,
                cells,
            }
        })
        .collect();

    debug!(
        columns = columns.len(),
        rows = rows.len(),
        records = visible.len(),
        "layout built"
    );

    LayoutModel::Timeline(Timeline {
        unit: window.unit,
        columns,
        rows,
    })
}
