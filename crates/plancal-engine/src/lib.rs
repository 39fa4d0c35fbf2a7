//! # plancal-engine
//!
//! Timeline materialization for plancal.
//!
//! Given the record collection, a view window and the active facet
//! filters, the engine computes:
//! - the column grid (`columns`)
//! - which records occupy which columns (`occupancy`)
//! - the filtered set (`filter`)
//! - rows of co-located records and their order (`grouping`)
//! - the render model, with stable per-row colors (`layout`)
//!
//! It also provides the month calendar page and agenda queries
//! (`calendar`) and the application state with its intent reducer and
//! controller (`app`).
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use plancal_core::{ColorMap, FilterSelection, Granularity, Record, ViewWindow};
//! use plancal_engine::{build_layout, LayoutOptions};
//!
//! let d = |day| NaiveDate::from_ymd_opt(2026, 6, day).unwrap();
//! let records = vec![
//!     Record::new("A", "Story A", "T1", d(1), d(6)),
//!     Record::new("B", "Story B", "T1", d(8), d(10)),
//! ];
//! let window = ViewWindow::new(d(1), d(14), Granularity::Week).unwrap();
//! let mut colors = ColorMap::new();
//!
//! let layout = build_layout(&records, &window, &FilterSelection::all(), &mut colors, &LayoutOptions::default());
//! let timeline = layout.timeline().unwrap();
//! assert_eq!(timeline.columns.len(), 2);
//! assert_eq!(timeline.rows[0].cells[1].representative.as_deref(), Some("B"));
//! ```

pub mod app;
pub mod calendar;
pub mod columns;
pub mod filter;
pub mod grouping;
pub mod layout;
pub mod occupancy;

pub use app::{
    reduce, AppState, CommandError, Controller, Dispatched, Intent, PersistenceWarning, Transition,
};
pub use calendar::{
    records_on, upcoming, DayCell, MonthCursor, MonthGrid, MonthGridOptions, DEFAULT_MAX_CHIPS,
    DEFAULT_UPCOMING_LIMIT,
};
pub use columns::{build_columns, columns, ColumnIter};
pub use filter::{filter_records, known_values};
pub use grouping::{group_key, GroupBy};
pub use layout::{build_layout, LayoutOptions};
pub use occupancy::is_active;
