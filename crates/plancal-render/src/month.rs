//! Plain-text month calendar page
//!
//! Each week is a band of lines: the day numbers first, then one line per
//! chip, then the "+N more" marker where a day overflows. Days from the
//! neighbouring months are shown in parentheses and today carries a `*`.

use std::collections::HashMap;
use std::fmt::Write;

use chrono::{Datelike, Weekday};
use plancal_core::{Record, RecordId, RenderError};
use plancal_engine::{DayCell, MonthGrid};

use crate::{pad, truncate};

/// Text renderer for [`MonthGrid`]
#[derive(Clone, Debug)]
pub struct MonthTextRenderer {
    /// Characters per day column
    pub cell_width: usize,
    titles: HashMap<RecordId, String>,
}

impl Default for MonthTextRenderer {
    fn default() -> Self {
        Self {
            cell_width: 14,
            titles: HashMap::new(),
        }
    }
}

impl MonthTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, records: &[Record]) -> Self {
        self.titles = records.iter().map(|r| (r.id.clone(), r.title.clone())).collect();
        self
    }

    pub fn cell_width(mut self, width: usize) -> Self {
        self.cell_width = width.max(6);
        self
    }

    pub fn render(&self, grid: &MonthGrid) -> Result<String, RenderError> {
        let mut out = String::new();
        let fmt = |e: std::fmt::Error| RenderError::Format(e.to_string());

        writeln!(out, "{}", grid.cursor.label()).map_err(fmt)?;
        let header: String = grid
            .weekday_header()
            .iter()
            .map(|day| pad(weekday_name(*day), self.cell_width))
            .collect();
        writeln!(out, "{}", header.trim_end()).map_err(fmt)?;
        let rule = "-".repeat(self.cell_width * 7);

        for week in grid.weeks() {
            writeln!(out, "{}", rule).map_err(fmt)?;
            let height = week.iter().map(cell_height).max().unwrap_or(1);
            for line_no in 0..height {
                let line: String = week
                    .iter()
                    .map(|day| pad(&self.cell_line(day, line_no), self.cell_width))
                    .collect();
                writeln!(out, "{}", line.trim_end()).map_err(fmt)?;
            }
        }
        writeln!(out, "{}", rule).map_err(fmt)?;

        Ok(out)
    }

    fn cell_line(&self, day: &DayCell, line_no: usize) -> String {
        let width = self.cell_width.saturating_sub(1);
        if line_no == 0 {
            return day_label(day);
        }
        match day.chips.get(line_no - 1) {
            Some(id) => {
                let title = self.titles.get(id).map_or(id.as_str(), String::as_str);
                truncate(&format!("- {}", title), width)
            }
            None if line_no == day.chips.len() + 1 => day.overflow_label().unwrap_or_default(),
            None => String::new(),
        }
    }
}

fn cell_height(day: &DayCell) -> usize {
    1 + day.chips.len() + usize::from(day.overflow > 0)
}

fn day_label(day: &DayCell) -> String {
    let mut label = if day.in_month {
        day.date.day().to_string()
    } else {
        format!("({})", day.date.day())
    };
    if day.is_today {
        label.push('*');
    }
    label
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use plancal_core::FilterSelection;
    use plancal_engine::{MonthCursor, MonthGridOptions};
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, day).unwrap()
    }

    #[test]
    fn february_page_layout() {
        // 2026-02-01 is a Sunday, so the page is exactly four weeks
        let records = vec![Record::new("r", "Kickoff", "milestone", date(2), date(2))];
        let grid = MonthGrid::build(
            MonthCursor::new(2026, 2).unwrap(),
            &records,
            &FilterSelection::all(),
            &MonthGridOptions::default().today(date(3)),
        );
        let text = MonthTextRenderer::new().cell_width(6).with_records(&records).render(&grid).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "February 2026");
        assert_eq!(lines[1], "Sun   Mon   Tue   Wed   Thu   Fri   Sat");
        assert_eq!(lines[2], "-".repeat(42));
        assert_eq!(lines[3], "1     2     3*    4     5     6     7");
        assert_eq!(lines[4], "      - Ki…");
        assert_eq!(lines[5], "-".repeat(42));
        // Header, rule, four weeks (first has two lines), closing rule
        assert_eq!(lines.len(), 2 + 1 + 2 + 3 * 2 + 1);
    }

    #[test]
    fn overflow_and_padding_days() {
        let records: Vec<Record> = (1..=4)
            .map(|i| {
                Record::new(
                    format!("r{i}"),
                    format!("Item {i}"),
                    "g",
                    NaiveDate::from_ymd_opt(2026, 6, 10).unwrap(),
                    NaiveDate::from_ymd_opt(2026, 6, 10).unwrap(),
                )
            })
            .collect();
        let grid = MonthGrid::build(
            MonthCursor::new(2026, 6).unwrap(),
            &records,
            &FilterSelection::all(),
            &MonthGridOptions::default(),
        );
        let text = MonthTextRenderer::new().with_records(&records).render(&grid).unwrap();

        assert!(text.contains("(31)"), "{text}");
        assert!(text.contains("- Item 3"), "{text}");
        assert!(!text.contains("- Item 4"), "{text}");
        assert!(text.contains("+1 more"), "{text}");
    }
}
