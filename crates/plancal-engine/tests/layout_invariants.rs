//! Layout Invariant Test Suite
//!
//! Properties that must hold for any window, record set and filter:
//!
//! 1. Columns are ascending, contiguous and cover the window
//! 2. A record is active exactly in the columns its range intersects
//! 3. Every filtered record appears in exactly one row
//! 4. A key's color does not change while the key stays present
//! 5. Filtering never lets a non-matching record through

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use plancal_core::{
    ColorMap, Facet, FilterSelection, Granularity, LayoutModel, Record, Selection, ViewWindow,
};
use plancal_engine::{build_columns, build_layout, filter_records, is_active, GroupBy, LayoutOptions};
use pretty_assertions::assert_eq;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A plan loosely shaped like a month of go-to-market work
fn plan() -> Vec<Record> {
    vec![
        Record::new("01", "Q1 Strategy Kickoff", "milestone", date(2026, 6, 1), date(2026, 6, 1)),
        Record::new("02", "Blog Post: Product Intro", "content", date(2026, 6, 5), date(2026, 6, 5))
            .channel("Organic")
            .sub_channel("Blog"),
        Record::new("03", "Paid Social Campaign", "marketing", date(2026, 6, 8), date(2026, 6, 22))
            .channel("Paid Social"),
        Record::new("04", "Sales Deck Update", "sales", date(2026, 6, 10), date(2026, 6, 11)),
        Record::new("05", "Email Nurture Sequence", "marketing", date(2026, 6, 21), date(2026, 6, 28))
            .channel("CRM")
            .sub_channel("Email"),
        Record::new("06", "Win-back Push", "marketing", date(2026, 6, 29), date(2026, 7, 3))
            .channel("CRM")
            .sub_channel("Push"),
        Record::new("07", "Monthly Review", "milestone", date(2026, 6, 28), date(2026, 6, 28)),
    ]
}

fn windows() -> Vec<ViewWindow> {
    let mut out = Vec::new();
    for unit in [Granularity::Day, Granularity::Week, Granularity::Month] {
        for start_offset in [0, 2, 6, 17] {
            for len in [0, 1, 6, 13, 40, 75] {
                let start = date(2026, 5, 28) + Duration::days(start_offset);
                let end = start + Duration::days(len);
                out.push(ViewWindow::new(start, end, unit).unwrap());
            }
        }
    }
    out
}

// ============================================================================
// INVARIANT 1: Column coverage
// ============================================================================

#[test]
fn columns_cover_every_window() {
    for window in windows() {
        let columns = build_columns(&window);
        assert!(!columns.is_empty(), "{window:?}");

        let first = columns.first().unwrap();
        let last = columns.last().unwrap();
        assert!(first.anchor <= window.start, "{window:?}");
        assert!(first.end >= window.start, "{window:?}");
        assert!(last.end >= window.end, "{window:?}");
        assert!(last.anchor <= window.end, "{window:?}");

        for pair in columns.windows(2) {
            assert_eq!(pair[0].end + Duration::days(1), pair[1].anchor, "{window:?}");
        }

        match window.unit {
            Granularity::Week => assert!(columns.iter().all(|c| c.anchor.weekday() == Weekday::Mon)),
            Granularity::Month => assert!(columns.iter().all(|c| c.anchor.day() == 1)),
            Granularity::Day => assert!(columns.iter().all(|c| c.width_days() == 1)),
        }
    }
}

// ============================================================================
// INVARIANT 2: Occupancy matches interval intersection
// ============================================================================

#[test]
fn cells_match_interval_intersection() {
    let records = plan();
    for window in windows() {
        let mut colors = ColorMap::new();
        let layout = build_layout(&records, &window, &FilterSelection::all(), &mut colors, &LayoutOptions::default());
        let timeline = layout.timeline().expect("records present");

        for row in &timeline.rows {
            for (column, cell) in timeline.columns.iter().zip(&row.cells) {
                let expected: Vec<&str> = row
                    .entries
                    .iter()
                    .filter(|id| {
                        let record = records.iter().find(|r| &r.id == *id).unwrap();
                        !(record.end < column.anchor || record.start > column.end)
                    })
                    .map(String::as_str)
                    .collect();
                let actual: Vec<&str> = cell.records.iter().map(String::as_str).collect();
                assert_eq!(actual, expected, "{} @ {}", row.key, column.anchor_iso());
                assert_eq!(cell.active, !expected.is_empty());
            }
        }
    }
}

#[test]
fn is_active_agrees_with_built_cells() {
    let records = plan();
    let window = ViewWindow::new(date(2026, 6, 1), date(2026, 7, 5), Granularity::Week).unwrap();
    let columns = build_columns(&window);
    for record in &records {
        let active: Vec<bool> = columns
            .iter()
            .map(|c| is_active(record, c.anchor, window.unit))
            .collect();
        assert!(active.iter().any(|a| *a), "{} never active", record.id);
        // Active columns form one contiguous run
        let runs = active.windows(2).filter(|w| w[0] != w[1]).count();
        assert!(runs <= 2, "{} has a gap", record.id);
    }
}

// ============================================================================
// INVARIANT 3: Each filtered record lands in exactly one row
// ============================================================================

#[test]
fn every_record_in_exactly_one_row() {
    let records = plan();
    let window = ViewWindow::new(date(2026, 6, 1), date(2026, 6, 30), Granularity::Week).unwrap();

    for group_by in [GroupBy::Group, GroupBy::GroupChannel, GroupBy::GroupChannelSubChannel] {
        let mut colors = ColorMap::new();
        let layout = build_layout(
            &records,
            &window,
            &FilterSelection::all(),
            &mut colors,
            &LayoutOptions::new().group_by(group_by),
        );
        let mut seen: Vec<String> = layout
            .timeline()
            .unwrap()
            .rows
            .iter()
            .flat_map(|r| r.entries.iter().cloned())
            .collect();
        seen.sort();
        let mut expected: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        expected.sort();
        assert_eq!(seen, expected, "{group_by:?}");
    }
}

// ============================================================================
// INVARIANT 4: Color stability
// ============================================================================

#[test]
fn colors_survive_edits_that_keep_the_key() {
    let mut records = plan();
    let window = ViewWindow::new(date(2026, 6, 1), date(2026, 6, 30), Granularity::Week).unwrap();
    let options = LayoutOptions::default();
    let mut colors = ColorMap::new();

    build_layout(&records, &window, &FilterSelection::all(), &mut colors, &options);
    let before = colors.clone();

    // Drop one sales record, add a new group, move a milestone
    records.retain(|r| r.group != "sales");
    records.push(Record::new("08", "Partner Webinar", "partnership", date(2026, 6, 18), date(2026, 6, 18)));
    records[0].start = date(2026, 6, 2);
    records[0].end = date(2026, 6, 2);

    let layout = build_layout(&records, &window, &FilterSelection::all(), &mut colors, &options);
    for row in &layout.timeline().unwrap().rows {
        if let Some(previous) = before.get(&row.key) {
            assert_eq!(&row.color, previous, "{}", row.key);
        }
    }
    assert!(colors.get("sales").is_none());
    assert!(colors.get("partnership").is_some());
}

// ============================================================================
// INVARIANT 5: Filter correctness
// ============================================================================

#[test]
fn crm_filter_end_to_end() {
    let records = plan();
    let selection = FilterSelection::all().with(Facet::Channel, Selection::only("CRM"));

    let visible = filter_records(&records, &selection);
    assert!(visible.iter().all(|r| r.first_value(Facet::Channel) == Some("CRM")));
    assert_eq!(visible.len(), 2);

    let window = ViewWindow::new(date(2026, 6, 1), date(2026, 7, 5), Granularity::Week).unwrap();
    let mut colors = ColorMap::new();
    let layout = build_layout(&records, &window, &selection, &mut colors, &LayoutOptions::default());
    let timeline = layout.timeline().unwrap();
    assert_eq!(timeline.rows.len(), 1);
    assert_eq!(timeline.rows[0].entries, vec!["05", "06"]);
    // Hidden groups keep their colors
    let keys: Vec<&str> = colors.iter().map(|(key, _)| key).collect();
    assert_eq!(keys, vec!["content", "marketing", "milestone", "sales"]);
}

#[test]
fn filter_matching_nothing_yields_empty_model() {
    let records = plan();
    let window = ViewWindow::new(date(2026, 6, 1), date(2026, 6, 30), Granularity::Week).unwrap();
    let selection = FilterSelection::all().with(Facet::Category, Selection::only("retention"));
    let mut colors = ColorMap::new();

    let layout = build_layout(&records, &window, &selection, &mut colors, &LayoutOptions::default());
    assert_eq!(layout, LayoutModel::Empty);
    assert_eq!(colors.len(), 4);
}
