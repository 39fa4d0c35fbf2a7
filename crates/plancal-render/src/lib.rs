//! # plancal-render
//!
//! Output backends for plancal.
//!
//! This crate provides:
//! - Plain-text timeline grid (`TextTimelineRenderer`)
//! - Plain-text month calendar page (`MonthTextRenderer`)
//! - Upcoming list and day panel text (`agenda`)
//! - JSON dump of the layout model (`JsonRenderer`)
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use plancal_core::{ColorMap, FilterSelection, Granularity, Record, Renderer, ViewWindow};
//! use plancal_engine::{build_layout, LayoutOptions};
//! use plancal_render::TextTimelineRenderer;
//!
//! let d = |day| NaiveDate::from_ymd_opt(2026, 6, day).unwrap();
//! let records = vec![Record::new("A", "Story A", "T1", d(1), d(6))];
//! let window = ViewWindow::new(d(1), d(14), Granularity::Week).unwrap();
//! let layout = build_layout(&records, &window, &FilterSelection::all(), &mut ColorMap::new(), &LayoutOptions::default());
//!
//! let text = TextTimelineRenderer::new().with_records(&records).render(&layout).unwrap();
//! assert!(text.contains("Story A"));
//! ```

pub mod agenda;
pub mod month;
pub mod timeline;

pub use agenda::{render_day, render_upcoming};
pub use month::MonthTextRenderer;
pub use timeline::TextTimelineRenderer;

use plancal_core::{LayoutModel, RenderError, Renderer};

/// Pretty-printed JSON of the layout model
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for JsonRenderer {
    type Output = String;

    fn render(&self, layout: &LayoutModel) -> Result<String, RenderError> {
        serde_json::to_string_pretty(layout).map_err(|e| RenderError::Format(e.to_string()))
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with `…`
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push('…');
    out
}

/// Left-align `text` in a field of `width` characters
pub(crate) fn pad(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}
