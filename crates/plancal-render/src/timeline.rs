//! Plain-text timeline grid
//!
//! One line per row, one fixed-width field per column. A cell prints the
//! title of its representative record and `+N` when other records share it.
//!
//! ## Example Output
//!
//! ```text
//!               Jun 01        Jun 08
//! ■ marketing   Paid Social…  Paid Social…
//! ■ milestone   Q1 Strategy…  ·
//!
//! ■ marketing   #f45d6e
//! ■ milestone   #f9a825
//! ```

use std::collections::HashMap;
use std::fmt::Write;

use plancal_core::{Cell, Color, Granularity, LayoutModel, Record, RecordId, RenderError, Renderer, Row, Timeline};

use crate::{pad, truncate};

const MARKER: char = '■';
const INACTIVE: &str = "·";

/// Text renderer for [`LayoutModel`]
#[derive(Clone, Debug)]
pub struct TextTimelineRenderer {
    /// Characters per column
    pub column_width: usize,
    /// Paint row markers with 24-bit ANSI colors
    pub ansi: bool,
    /// Append the key → color legend
    pub show_legend: bool,
    /// Message printed for an empty model
    pub empty_message: String,
    titles: HashMap<RecordId, String>,
}

impl Default for TextTimelineRenderer {
    fn default() -> Self {
        Self {
            column_width: 14,
            ansi: false,
            show_legend: true,
            empty_message: "No records match the current filters.".into(),
            titles: HashMap::new(),
        }
    }
}

impl TextTimelineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve cell ids to record titles
    pub fn with_records(mut self, records: &[Record]) -> Self {
        self.titles = records.iter().map(|r| (r.id.clone(), r.title.clone())).collect();
        self
    }

    pub fn column_width(mut self, width: usize) -> Self {
        self.column_width = width.max(4);
        self
    }

    pub fn ansi(mut self, enabled: bool) -> Self {
        self.ansi = enabled;
        self
    }

    pub fn no_legend(mut self) -> Self {
        self.show_legend = false;
        self
    }

    fn title<'a>(&'a self, id: &'a str) -> &'a str {
        self.titles.get(id).map_or(id, String::as_str)
    }

    fn marker(&self, color: &Color) -> String {
        if !self.ansi {
            return MARKER.to_string();
        }
        match hex_rgb(color.as_str()) {
            Some((r, g, b)) => format!("\x1b[38;2;{};{};{}m{}\x1b[0m", r, g, b, MARKER),
            None => MARKER.to_string(),
        }
    }

    fn cell_text(&self, cell: &Cell) -> String {
        let Some(rep) = cell.representative.as_deref() else {
            return INACTIVE.to_string();
        };
        let width = self.column_width.saturating_sub(2);
        let title = self.title(rep);
        match cell.hidden_count() {
            0 => truncate(title, width),
            hidden => {
                let suffix = format!(" +{}", hidden);
                let room = width.saturating_sub(suffix.chars().count());
                format!("{}{}", truncate(title, room), suffix)
            }
        }
    }

    /// Row label with its marker, padded to `label_width` visible characters
    fn label(&self, row: &Row, label_width: usize) -> String {
        let visible = row.key.chars().count() + 2;
        format!(
            "{} {}{}",
            self.marker(&row.color),
            row.key,
            " ".repeat(label_width.saturating_sub(visible))
        )
    }

    fn render_timeline(&self, timeline: &Timeline) -> Result<String, RenderError> {
        let label_width = timeline
            .rows
            .iter()
            .map(|r| r.key.chars().count() + 2)
            .max()
            .unwrap_or(0)
            + 2;

        let mut out = String::new();
        let mut header = " ".repeat(label_width);
        if timeline.columns.is_empty() {
            header.push_str("(no columns in view)");
        }
        for column in &timeline.columns {
            header.push_str(&pad(&column_heading(column.anchor, timeline.unit), self.column_width));
        }
        writeln!(out, "{}", header.trim_end()).map_err(format_error)?;

        for row in &timeline.rows {
            let mut line = self.label(row, label_width);
            for cell in &row.cells {
                line.push_str(&pad(&self.cell_text(cell), self.column_width));
            }
            writeln!(out, "{}", line.trim_end()).map_err(format_error)?;
        }

        if self.show_legend && !timeline.rows.is_empty() {
            writeln!(out).map_err(format_error)?;
            for row in &timeline.rows {
                writeln!(out, "{}{}", self.label(row, label_width), row.color).map_err(format_error)?;
            }
        }

        Ok(out)
    }
}

impl Renderer for TextTimelineRenderer {
    type Output = String;

    fn render(&self, layout: &LayoutModel) -> Result<String, RenderError> {
        match layout {
            LayoutModel::Empty => Ok(format!("{}\n", self.empty_message)),
            LayoutModel::Timeline(timeline) => self.render_timeline(timeline),
        }
    }
}

fn column_heading(anchor: chrono::NaiveDate, unit: Granularity) -> String {
    match unit {
        Granularity::Day => anchor.format("%a %d").to_string(),
        Granularity::Week => anchor.format("%b %d").to_string(),
        Granularity::Month => anchor.format("%b %Y").to_string(),
    }
}

fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn format_error(e: std::fmt::Error) -> RenderError {
    RenderError::Format(e.to_string())
}
