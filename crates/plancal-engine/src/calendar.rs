//! Month calendar and agenda queries
//!
//! The month page pads the month with days of the neighbouring months so
//! that it always covers whole weeks. Day cells carry at most `max_chips`
//! record ids and report how many more were left out.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use plancal_core::dates::{add_days, add_months, days_between, last_of_month, week_start_on_or_before};
use plancal_core::{FilterSelection, Record, RecordId, ValidationError};

use crate::filter::filter_records;

/// Default number of chips shown per day cell
pub const DEFAULT_MAX_CHIPS: usize = 3;

/// Default length of the upcoming list
pub const DEFAULT_UPCOMING_LIMIT: usize = 6;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// The month currently shown
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthCursor {
    pub year: i32,
    /// 1-based month number
    pub month: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self::containing)
            .ok_or_else(|| ValidationError::InvalidDate(format!("{year:04}-{month:02}")))
    }

    /// Month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        last_of_month(self.first_day())
    }

    pub fn prev(&self) -> Self {
        Self::containing(add_months(self.first_day(), -1))
    }

    pub fn next(&self) -> Self {
        Self::containing(add_months(self.first_day(), 1))
    }

    /// Heading such as "June 2026"
    pub fn label(&self) -> String {
        let name = MONTH_NAMES
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("?");
        format!("{} {}", name, self.year)
    }
}

impl std::fmt::Display for MonthCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Options for building a month page
#[derive(Clone, Debug)]
pub struct MonthGridOptions {
    /// First column of every week
    pub week_start: Weekday,
    /// Chips shown before the "+N more" marker
    pub max_chips: usize,
    /// Day to highlight, if any
    pub today: Option<NaiveDate>,
}

impl Default for MonthGridOptions {
    fn default() -> Self {
        Self {
            week_start: Weekday::Sun,
            max_chips: DEFAULT_MAX_CHIPS,
            today: None,
        }
    }
}

impl MonthGridOptions {
    pub fn week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn max_chips(mut self, max_chips: usize) -> Self {
        self.max_chips = max_chips;
        self
    }

    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

/// One day on the month page
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,
    /// False for padding days from the neighbouring months
    pub in_month: bool,
    pub is_today: bool,
    /// Visible records active on this day, capped at `max_chips`
    pub chips: Vec<RecordId>,
    /// Active records left out of `chips`
    pub overflow: usize,
}

impl DayCell {
    /// Marker text for the hidden records, e.g. "+2 more"
    pub fn overflow_label(&self) -> Option<String> {
        (self.overflow > 0).then(|| format!("+{} more", self.overflow))
    }
}

/// A calendar page made of whole weeks
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthGrid {
    pub cursor: MonthCursor,
    pub week_start: Weekday,
    /// Days in display order; the length is a multiple of seven
    pub days: Vec<DayCell>,
}

impl MonthGrid {
    pub fn build(
        cursor: MonthCursor,
        records: &[Record],
        selection: &FilterSelection,
        options: &MonthGridOptions,
    ) -> Self {
        let visible = filter_records(records, selection);
        let first = cursor.first_day();
        let last = cursor.last_day();

        let grid_start = week_start_on_or_before(first, options.week_start);
        let grid_end = add_days(week_start_on_or_before(last, options.week_start), 6);

        let days = days_between(grid_start, grid_end)
            .map(|date| {
                let active: Vec<&Record> = visible.iter().copied().filter(|r| r.covers(date)).collect();
                let shown = active.len().min(options.max_chips);
                DayCell {
                    date,
                    in_month: first <= date && date <= last,
                    is_today: options.today == Some(date),
                    chips: active[..shown].iter().map(|r| r.id.clone()).collect(),
                    overflow: active.len() - shown,
                }
            })
            .collect();

        Self {
            cursor,
            week_start: options.week_start,
            days,
        }
    }

    /// Days grouped seven at a time
    pub fn weeks(&self) -> std::slice::Chunks<'_, DayCell> {
        self.days.chunks(7)
    }

    /// Weekday order of the header row
    pub fn weekday_header(&self) -> [Weekday; 7] {
        let mut header = [self.week_start; 7];
        let mut day = self.week_start;
        for slot in &mut header {
            *slot = day;
            day = day.succ();
        }
        header
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayCell> {
        self.days.iter().find(|d| d.date == date)
    }
}

/// Every record active on `date`, ignoring filters, in store order
pub fn records_on(records: &[Record], date: NaiveDate) -> Vec<&Record> {
    records.iter().filter(|r| r.covers(date)).collect()
}

/// Records starting on or after `today`, soonest first, at most `limit`
pub fn upcoming(records: &[Record], today: NaiveDate, limit: usize) -> Vec<&Record> {
    let mut list: Vec<&Record> = records.iter().filter(|r| r.start >= today).collect();
    list.sort_by_key(|r| r.start);
    list.truncate(limit);
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use plancal_core::{Facet, Selection};
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn cursor_navigation_wraps_years() {
        let dec = MonthCursor::new(2026, 12).unwrap();
        assert_eq!(dec.next(), MonthCursor::new(2027, 1).unwrap());
        assert_eq!(MonthCursor::new(2026, 1).unwrap().prev(), MonthCursor::new(2025, 12).unwrap());
        assert_eq!(dec.label(), "December 2026");
        assert_eq!(dec.to_string(), "2026-12");
        assert!(MonthCursor::new(2026, 13).is_err());
    }

    #[test]
    fn sunday_grid_shape() {
        // June 2026 starts on a Monday and ends on a Tuesday
        let grid = MonthGrid::build(
            MonthCursor::new(2026, 6).unwrap(),
            &[],
            &FilterSelection::all(),
            &MonthGridOptions::default(),
        );

        assert_eq!(grid.days.len(), 35);
        assert_eq!(grid.days[0].date, date(2026, 5, 31));
        assert!(!grid.days[0].in_month);
        assert_eq!(grid.days[1].date, date(2026, 6, 1));
        assert_eq!(grid.days.last().unwrap().date, date(2026, 7, 4));
        assert_eq!(grid.days.iter().filter(|d| d.in_month).count(), 30);
        assert_eq!(grid.weeks().count(), 5);
        assert_eq!(grid.weekday_header()[0], Weekday::Sun);
    }

    #[test]
    fn monday_grid_has_no_leading_days_when_month_starts_monday() {
        let grid = MonthGrid::build(
            MonthCursor::new(2026, 6).unwrap(),
            &[],
            &FilterSelection::all(),
            &MonthGridOptions::default().week_start(Weekday::Mon),
        );
        assert_eq!(grid.days[0].date, date(2026, 6, 1));
        assert_eq!(grid.days.len() % 7, 0);
        assert_eq!(grid.days.last().unwrap().date, date(2026, 7, 5));
    }

    #[test]
    fn february_starting_on_sunday_fills_four_weeks() {
        // 2026-02-01 is a Sunday; 28 days exactly
        let grid = MonthGrid::build(
            MonthCursor::new(2026, 2).unwrap(),
            &[],
            &FilterSelection::all(),
            &MonthGridOptions::default(),
        );
        assert_eq!(grid.days.len(), 28);
        assert!(grid.days.iter().all(|d| d.in_month));
    }

    #[test]
    fn chips_cap_and_overflow() {
        let records: Vec<Record> = (1..=5)
            .map(|i| Record::new(format!("r{i}"), format!("Item {i}"), "marketing", date(2026, 6, 10), date(2026, 6, 12)))
            .collect();
        let grid = MonthGrid::build(
            MonthCursor::new(2026, 6).unwrap(),
            &records,
            &FilterSelection::all(),
            &MonthGridOptions::default().today(date(2026, 6, 11)),
        );

        let cell = grid.day(date(2026, 6, 11)).unwrap();
        assert_eq!(cell.chips, vec!["r1", "r2", "r3"]);
        assert_eq!(cell.overflow, 2);
        assert_eq!(cell.overflow_label().as_deref(), Some("+2 more"));
        assert!(cell.is_today);

        let quiet = grid.day(date(2026, 6, 13)).unwrap();
        assert!(quiet.chips.is_empty());
        assert_eq!(quiet.overflow_label(), None);
        assert!(!quiet.is_today);
    }

    #[test]
    fn grid_honours_filters_but_day_list_does_not() {
        let records = vec![
            Record::new("a", "Launch", "launch", date(2026, 6, 21), date(2026, 6, 21)),
            Record::new("b", "Nurture", "marketing", date(2026, 6, 21), date(2026, 6, 28)).channel("CRM"),
        ];
        let crm = FilterSelection::all().with(Facet::Channel, Selection::only("CRM"));
        let grid = MonthGrid::build(
            MonthCursor::new(2026, 6).unwrap(),
            &records,
            &crm,
            &MonthGridOptions::default(),
        );
        assert_eq!(grid.day(date(2026, 6, 21)).unwrap().chips, vec!["b"]);

        let ids: Vec<&str> = records_on(&records, date(2026, 6, 21))
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(records_on(&records, date(2026, 6, 29)).is_empty());
    }

    #[test]
    fn upcoming_orders_by_start_and_truncates() {
        let records = vec![
            Record::new("past", "Past", "g", date(2026, 6, 1), date(2026, 6, 30)),
            Record::new("late", "Late", "g", date(2026, 6, 28), date(2026, 6, 28)),
            Record::new("today", "Today", "g", date(2026, 6, 15), date(2026, 6, 15)),
            Record::new("mid-1", "Mid", "g", date(2026, 6, 20), date(2026, 6, 20)),
            Record::new("mid-2", "Mid", "g", date(2026, 6, 20), date(2026, 6, 22)),
        ];
        let ids = |list: Vec<&Record>| list.iter().map(|r| r.id.clone()).collect::<Vec<_>>();

        assert_eq!(
            ids(upcoming(&records, date(2026, 6, 15), DEFAULT_UPCOMING_LIMIT)),
            vec!["today", "mid-1", "mid-2", "late"]
        );
        assert_eq!(ids(upcoming(&records, date(2026, 6, 15), 2)), vec!["today", "mid-1"]);
        assert!(upcoming(&records, date(2026, 7, 1), 6).is_empty());
    }
}
