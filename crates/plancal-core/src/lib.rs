//! # plancal-core
//!
//! Core domain model and traits for the plancal timeline engine.
//!
//! This crate provides:
//! - Domain types: `Record`, `ViewWindow`, `Column`, `FilterSelection`, `LayoutModel`
//! - Date grid arithmetic (`dates`), the record store (`store`) and the
//!   stable color assignment map (`palette`)
//! - Collaborator traits: `RecordStorage`, `Renderer`, `IdGenerator`
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use plancal_core::{RecordFields, RecordStore, SequentialIds};
//!
//! let mut store = RecordStore::new();
//! let mut ids = SequentialIds::new("ev");
//! let fields = RecordFields::new("Press Release", "pr")
//!     .start(NaiveDate::from_ymd_opt(2026, 6, 14).unwrap())
//!     .channel("PR");
//! let record = store.create(fields, &mut ids).unwrap();
//! assert_eq!(record.id, "ev-1");
//! assert_eq!(record.end, record.start);
//! ```

pub mod dates;
pub mod palette;
pub mod store;

pub use palette::{Color, ColorMap, Palette, Reconciliation};
pub use store::RecordStore;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for a record
pub type RecordId = String;

// ============================================================================
// Facets
// ============================================================================

/// A categorical dimension usable for filtering
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    /// The record's grouping key (theme / category)
    Group,
    /// Marketing channel (e.g. "CRM", "Paid Social")
    Channel,
    /// Sub-channel within a channel
    SubChannel,
    /// Free category tags (a record may carry several)
    Category,
}

impl Facet {
    pub const ALL: [Facet; 4] = [Facet::Group, Facet::Channel, Facet::SubChannel, Facet::Category];

    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Group => "group",
            Facet::Channel => "channel",
            Facet::SubChannel => "sub_channel",
            Facet::Category => "category",
        }
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facet {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "group" | "theme" => Ok(Facet::Group),
            "channel" => Ok(Facet::Channel),
            "sub_channel" | "sub-channel" | "subchannel" => Ok(Facet::SubChannel),
            "category" | "categories" => Ok(Facet::Category),
            other => Err(ValidationError::UnknownFacet(other.to_string())),
        }
    }
}

// ============================================================================
// Record
// ============================================================================

/// Promotion annotation carried opaquely through the pipeline
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promo {
    /// Optional promo message shown next to the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A single date-ranged planning entry (event or story)
///
/// A stored record may omit `end`; it then loads as a single-day record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Unique identifier, immutable after creation
    pub id: RecordId,
    /// Display title / story name
    pub title: String,
    /// Grouping key (theme or category)
    pub group: String,
    /// Facet tags other than the grouping key
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub facets: BTreeMap<Facet, Vec<String>>,
    /// First day (inclusive)
    pub start: NaiveDate,
    /// Last day (inclusive), never before `start`
    pub end: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo: Option<Promo>,
}

/// On-disk shape of a [`Record`]
#[derive(Deserialize)]
struct RecordWire {
    id: RecordId,
    title: String,
    group: String,
    #[serde(default)]
    facets: BTreeMap<Facet, Vec<String>>,
    start: NaiveDate,
    #[serde(default)]
    end: Option<NaiveDate>,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    promo: Option<Promo>,
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = RecordWire::deserialize(deserializer)?;
        Ok(Record {
            end: wire.end.unwrap_or(wire.start),
            id: wire.id,
            title: wire.title,
            group: wire.group,
            facets: wire.facets,
            start: wire.start,
            owner: wire.owner,
            notes: wire.notes,
            promo: wire.promo,
        })
    }
}

impl Record {
    /// Create a record without validation. Use [`RecordFields`] for user input.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        group: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            group: group.into(),
            facets: BTreeMap::new(),
            start,
            end,
            owner: None,
            notes: None,
            promo: None,
        }
    }

    /// Add a facet value
    pub fn tag(mut self, facet: Facet, value: impl Into<String>) -> Self {
        self.facets.entry(facet).or_default().push(value.into());
        self
    }

    /// Set the channel
    pub fn channel(self, channel: impl Into<String>) -> Self {
        self.tag(Facet::Channel, channel)
    }

    /// Set the sub-channel
    pub fn sub_channel(self, sub_channel: impl Into<String>) -> Self {
        self.tag(Facet::SubChannel, sub_channel)
    }

    /// Add a category tag
    pub fn category(self, category: impl Into<String>) -> Self {
        self.tag(Facet::Category, category)
    }

    /// Set the owner
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set the notes
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Flag the record as a promotion
    pub fn promo(mut self, message: Option<String>) -> Self {
        self.promo = Some(Promo { message });
        self
    }

    /// Values held for a facet. The grouping key answers for [`Facet::Group`].
    pub fn facet_values(&self, facet: Facet) -> Vec<&str> {
        match facet {
            Facet::Group => vec![self.group.as_str()],
            other => self
                .facets
                .get(&other)
                .map(|values| values.iter().map(String::as_str).collect())
                .unwrap_or_default(),
        }
    }

    /// First value of a single-valued facet
    pub fn first_value(&self, facet: Facet) -> Option<&str> {
        self.facet_values(facet).into_iter().next()
    }

    /// Check whether the record covers a calendar date
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days spanned (inclusive)
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// User-supplied fields for creating or updating a record
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub title: String,
    pub group: String,
    #[serde(default)]
    pub facets: BTreeMap<Facet, Vec<String>>,
    pub start: Option<NaiveDate>,
    /// Defaults to `start` when absent
    pub end: Option<NaiveDate>,
    pub owner: Option<String>,
    pub notes: Option<String>,
    pub promo: Option<Promo>,
}

impl RecordFields {
    pub fn new(title: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            group: group.into(),
            ..Default::default()
        }
    }

    pub fn start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    pub fn tag(mut self, facet: Facet, value: impl Into<String>) -> Self {
        self.facets.entry(facet).or_default().push(value.into());
        self
    }

    pub fn channel(self, channel: impl Into<String>) -> Self {
        self.tag(Facet::Channel, channel)
    }

    pub fn sub_channel(self, sub_channel: impl Into<String>) -> Self {
        self.tag(Facet::SubChannel, sub_channel)
    }

    pub fn category(self, category: impl Into<String>) -> Self {
        self.tag(Facet::Category, category)
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn promo(mut self, message: Option<String>) -> Self {
        self.promo = Some(Promo { message });
        self
    }

    /// Fields describing an existing record, for partial edits
    pub fn from_record(record: &Record) -> Self {
        Self {
            title: record.title.clone(),
            group: record.group.clone(),
            facets: record.facets.clone(),
            start: Some(record.start),
            end: Some(record.end),
            owner: record.owner.clone(),
            notes: record.notes.clone(),
            promo: record.promo.clone(),
        }
    }

    /// Validate and build a record carrying the given id.
    ///
    /// Text fields are trimmed; blank annotations become `None`; an absent
    /// end date collapses to the start date.
    pub fn into_record(self, id: RecordId) -> Result<Record, ValidationError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyField("title"));
        }
        let group = self.group.trim().to_string();
        if group.is_empty() {
            return Err(ValidationError::EmptyField("group"));
        }
        let start = self.start.ok_or(ValidationError::MissingStart)?;
        let end = self.end.unwrap_or(start);
        if end < start {
            return Err(ValidationError::EndBeforeStart { start, end });
        }

        let facets = self
            .facets
            .into_iter()
            .filter(|(facet, _)| *facet != Facet::Group)
            .map(|(facet, values)| {
                let values: Vec<String> = values
                    .into_iter()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect();
                (facet, values)
            })
            .filter(|(_, values)| !values.is_empty())
            .collect();

        Ok(Record {
            id,
            title,
            group,
            facets,
            start,
            end,
            owner: non_blank(self.owner),
            notes: non_blank(self.notes),
            promo: self.promo.map(|p| Promo {
                message: non_blank(p.message),
            }),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Order two display labels: case-insensitive first, then ordinal.
///
/// Stands in for a locale-aware collation so that "beta" sorts before
/// "Gamma" while the result stays total and reproducible.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

// ============================================================================
// View Window
// ============================================================================

/// Width of one timeline column
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    #[default]
    Week,
    Month,
}

impl Granularity {
    /// First column anchor for a window starting on `start`
    pub fn normalize(self, start: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => start,
            Granularity::Week => dates::monday_on_or_before(start),
            Granularity::Month => dates::first_of_month(start),
        }
    }

    /// Last day (inclusive) of the column anchored at `anchor`
    pub fn span_end(self, anchor: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => anchor,
            Granularity::Week => dates::add_days(anchor, 6),
            Granularity::Month => dates::last_of_month(anchor),
        }
    }

    /// Anchor of the column following the one anchored at `anchor`
    pub fn advance(self, anchor: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => dates::add_days(anchor, 1),
            Granularity::Week => dates::add_days(anchor, 7),
            Granularity::Month => dates::add_months(dates::first_of_month(anchor), 1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "d" => Ok(Granularity::Day),
            "week" | "w" => Ok(Granularity::Week),
            "month" | "m" => Ok(Granularity::Month),
            other => Err(ValidationError::UnknownGranularity(other.to_string())),
        }
    }
}

/// The visible date range and its column granularity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub unit: Granularity,
}

impl ViewWindow {
    /// Create a window, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate, unit: Granularity) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::WindowEndBeforeStart { start, end });
        }
        Ok(Self { start, end, unit })
    }

    /// Window covering the calendar month that contains `date`
    pub fn month_of(date: NaiveDate, unit: Granularity) -> Self {
        Self {
            start: dates::first_of_month(date),
            end: dates::last_of_month(date),
            unit,
        }
    }

    /// Change the granularity, keeping the declared bounds
    pub fn with_unit(mut self, unit: Granularity) -> Self {
        self.unit = unit;
        self
    }

    /// Start after normalization to the unit boundary
    pub fn effective_start(&self) -> NaiveDate {
        self.unit.normalize(self.start)
    }
}

/// One unit (day, week or month) of the visible timeline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// First day of the column
    pub anchor: NaiveDate,
    /// Last day of the column (inclusive)
    pub end: NaiveDate,
}

impl Column {
    pub fn new(anchor: NaiveDate, unit: Granularity) -> Self {
        Self {
            anchor,
            end: unit.span_end(anchor),
        }
    }

    /// Anchor formatted as `YYYY-MM-DD`
    pub fn anchor_iso(&self) -> String {
        dates::format_iso(self.anchor)
    }

    pub fn width_days(&self) -> i64 {
        (self.end - self.anchor).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.anchor <= date && date <= self.end
    }
}

// ============================================================================
// Filter Selection
// ============================================================================

/// Selection for a single facet dimension
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// No filtering on this dimension
    #[default]
    All,
    /// Only records holding one of these values
    Only(BTreeSet<String>),
}

static SELECT_ALL: Selection = Selection::All;

impl Selection {
    /// Parse `"all"` or a comma-separated list of values
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Selection::All;
        }
        Selection::Only(
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    /// Selection of exactly one value
    pub fn only(value: impl Into<String>) -> Self {
        Selection::Only(std::iter::once(value.into()).collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// True when any of the record's values is selected
    pub fn matches_any<'a>(&self, values: impl IntoIterator<Item = &'a str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(selected) => values.into_iter().any(|v| selected.contains(v)),
        }
    }
}

/// Active facet selection across all dimensions; absent dimensions are `All`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    dimensions: BTreeMap<Facet, Selection>,
}

impl FilterSelection {
    /// Selection that filters nothing
    pub fn all() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSelection::set`]
    pub fn with(mut self, facet: Facet, selection: Selection) -> Self {
        self.set(facet, selection);
        self
    }

    /// Replace the selection for one dimension
    pub fn set(&mut self, facet: Facet, selection: Selection) {
        match selection {
            Selection::All => {
                self.dimensions.remove(&facet);
            }
            only => {
                self.dimensions.insert(facet, only);
            }
        }
    }

    pub fn get(&self, facet: Facet) -> &Selection {
        self.dimensions.get(&facet).unwrap_or(&SELECT_ALL)
    }

    /// Dimensions carrying a concrete selection
    pub fn active(&self) -> impl Iterator<Item = (Facet, &Selection)> {
        self.dimensions.iter().map(|(facet, sel)| (*facet, sel))
    }

    pub fn is_unfiltered(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Flip one value of a dimension, checkbox style.
    ///
    /// `universe` lists every value the dimension can take. Toggling while
    /// the dimension is `All` keeps everything except `value`; a selection
    /// that ends up equal to the universe collapses back to `All`.
    pub fn toggle(&mut self, facet: Facet, value: &str, universe: &[String]) {
        let mut selected: BTreeSet<String> = match self.get(facet) {
            Selection::All => universe.iter().cloned().collect(),
            Selection::Only(values) => values.clone(),
        };
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }

        let covers_universe = !universe.is_empty() && universe.iter().all(|v| selected.contains(v));
        if covers_universe {
            self.set(facet, Selection::All);
        } else {
            self.set(facet, Selection::Only(selected));
        }
    }
}

// ============================================================================
// Layout Model (Result)
// ============================================================================

/// The render-ready result of a layout pass
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutModel {
    /// No record survived filtering; renderers show an explicit empty state
    Empty,
    /// Records are present (the column list itself may still be empty)
    Timeline(Timeline),
}

impl LayoutModel {
    pub fn is_empty(&self) -> bool {
        matches!(self, LayoutModel::Empty)
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        match self {
            LayoutModel::Empty => None,
            LayoutModel::Timeline(timeline) => Some(timeline),
        }
    }
}

/// Ordered columns by ordered rows
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub unit: Granularity,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Timeline {
    /// Find a row by grouping key
    pub fn row(&self, key: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.key == key)
    }
}

/// One display row: every record sharing a grouping key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub key: String,
    pub color: Color,
    /// Record ids in display order
    pub entries: Vec<RecordId>,
    /// One cell per column
    pub cells: Vec<Cell>,
}

/// Occupancy of one row in one column
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub active: bool,
    /// Record whose detail is shown in the cell
    pub representative: Option<RecordId>,
    /// Every record active in the cell, in row order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<RecordId>,
}

impl Cell {
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Number of active records hidden behind the representative
    pub fn hidden_count(&self) -> usize {
        self.records.len().saturating_sub(1)
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Persistence collaborator for the record collection
pub trait RecordStorage {
    /// Load the stored collection; `Ok(None)` when nothing was stored yet
    fn load(&self) -> Result<Option<Vec<Record>>, PersistenceError>;

    /// Replace the stored collection
    fn save(&self, records: &[Record]) -> Result<(), PersistenceError>;
}

/// Source of fresh record identifiers
pub trait IdGenerator {
    fn next_id(&mut self) -> RecordId;
}

/// Random v4 UUID identifiers
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> RecordId {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Deterministic `prefix-N` identifiers
#[derive(Clone, Debug)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> RecordId {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render a layout model to the output format
    fn render(&self, layout: &LayoutModel) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// User-supplied values that break an invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("Start date is required")]
    MissingStart,

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("View window end {end} is before its start {start}")]
    WindowEndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown facet: {0}")]
    UnknownFacet(String),

    #[error("Unknown granularity: {0}")]
    UnknownGranularity(String),

    #[error("Unknown row grouping: {0}")]
    UnknownGroupBy(String),

    #[error("Palette must contain at least one color")]
    EmptyPalette,
}

/// Record store error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Record not found: {0}")]
    NotFound(RecordId),

    #[error("Duplicate record id: {0}")]
    DuplicateId(RecordId),
}

/// Storage collaborator failure
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed data: {0}")]
    Malformed(String),

    #[error("Serialization failed: {0}")]
    Serialize(String),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),
}

// ============================================================================
// Tests
// ============================================================================
