//! Application state and intent handling
//!
//! All mutable state lives in one [`AppState`]. User actions arrive as
//! [`Intent`] values; [`reduce`] turns the current state and an intent into
//! the next state without touching the old one, so a rejected intent leaves
//! everything as it was. The [`Controller`] owns the live state, commits
//! transitions, persists record changes and recomputes the layout.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use plancal_core::{
    ColorMap, Facet, FilterSelection, Granularity, IdGenerator, LayoutModel, Record, RecordFields,
    RecordId, RecordStorage, RecordStore, Selection, StoreError, UuidGenerator, ValidationError,
    ViewWindow,
};

use crate::calendar::{MonthCursor, MonthGrid, MonthGridOptions};
use crate::filter::known_values;
use crate::grouping::GroupBy;
use crate::layout::{build_layout, LayoutOptions};

// ============================================================================
// State
// ============================================================================

/// Everything a render pass depends on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppState {
    pub records: RecordStore,
    pub window: ViewWindow,
    pub selection: FilterSelection,
    /// Color history carried between passes
    pub colors: ColorMap,
    pub group_by: GroupBy,
}

impl AppState {
    pub fn new(records: RecordStore, window: ViewWindow) -> Self {
        Self {
            records,
            window,
            selection: FilterSelection::all(),
            colors: ColorMap::new(),
            group_by: GroupBy::default(),
        }
    }

    pub fn with_colors(mut self, colors: ColorMap) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn with_selection(mut self, selection: FilterSelection) -> Self {
        self.selection = selection;
        self
    }
}

// ============================================================================
// Intents
// ============================================================================

/// A user action against the application state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    CreateRecord(RecordFields),
    UpdateRecord { id: RecordId, fields: RecordFields },
    DeleteRecord(RecordId),
    /// Move the visible range, keeping the granularity
    SetWindow { start: NaiveDate, end: NaiveDate },
    SetFilter { facet: Facet, selection: Selection },
    /// Flip a single value of a dimension, checkbox style
    ToggleFilter { facet: Facet, value: String },
    SetGranularity(Granularity),
    SetGroupBy(GroupBy),
    /// Replace the whole collection (e.g. with the seed data)
    ResetStore(Vec<Record>),
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::CreateRecord(_) => "create_record",
            Intent::UpdateRecord { .. } => "update_record",
            Intent::DeleteRecord(_) => "delete_record",
            Intent::SetWindow { .. } => "set_window",
            Intent::SetFilter { .. } => "set_filter",
            Intent::ToggleFilter { .. } => "toggle_filter",
            Intent::SetGranularity(_) => "set_granularity",
            Intent::SetGroupBy(_) => "set_group_by",
            Intent::ResetStore(_) => "reset_store",
        }
    }
}

/// Result of reducing one intent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub state: AppState,
    /// Whether the record collection differs from the previous state
    pub records_changed: bool,
    /// Record created, updated or deleted by the intent
    pub affected: Option<RecordId>,
}

/// Rejected intent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Compute the state that follows `intent`.
///
/// The input state is never modified; on error there is no next state.
pub fn reduce(
    state: &AppState,
    intent: Intent,
    ids: &mut dyn IdGenerator,
) -> Result<Transition, CommandError> {
    let mut next = state.clone();
    let mut affected = None;

    let records_changed = match intent {
        Intent::CreateRecord(fields) => {
            let record = next.records.create(fields, ids)?;
            affected = Some(record.id.clone());
            true
        }
        Intent::UpdateRecord { id, fields } => {
            next.records.update(&id, fields)?;
            affected = Some(id);
            true
        }
        Intent::DeleteRecord(id) => {
            next.records.delete(&id)?;
            affected = Some(id);
            true
        }
        Intent::SetWindow { start, end } => {
            next.window = ViewWindow::new(start, end, next.window.unit)?;
            false
        }
        Intent::SetFilter { facet, selection } => {
            next.selection.set(facet, selection);
            false
        }
        Intent::ToggleFilter { facet, value } => {
            let universe = known_values(next.records.records(), facet);
            next.selection.toggle(facet, &value, &universe);
            false
        }
        Intent::SetGranularity(unit) => {
            next.window = next.window.with_unit(unit);
            false
        }
        Intent::SetGroupBy(group_by) => {
            next.group_by = group_by;
            false
        }
        Intent::ResetStore(records) => {
            next.records.reset(records)?;
            true
        }
    };

    Ok(Transition {
        state: next,
        records_changed,
        affected,
    })
}

// ============================================================================
// Controller
// ============================================================================

/// Storage degradation reported alongside a result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceWarning {
    #[error("Could not load saved records, showing sample data instead: {0}")]
    LoadFailed(String),

    #[error("Could not save changes, continuing in memory: {0}")]
    SaveFailed(String),
}

/// Outcome of a committed intent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatched {
    pub layout: LayoutModel,
    pub affected: Option<RecordId>,
    pub warning: Option<PersistenceWarning>,
}

/// Owner of the live application state
pub struct Controller<S: RecordStorage> {
    state: AppState,
    storage: S,
    options: LayoutOptions,
    ids: Box<dyn IdGenerator>,
    /// Cleared after the first failed save
    persistent: bool,
    open_warning: Option<PersistenceWarning>,
}

impl<S: RecordStorage> Controller<S> {
    /// Load records from `storage`, falling back to `seed` when nothing is
    /// stored yet or the stored data cannot be used.
    pub fn open(storage: S, seed: Vec<Record>, window: ViewWindow, options: LayoutOptions) -> Self {
        let (records, open_warning) = match storage.load() {
            Ok(Some(records)) => match RecordStore::from_records(records) {
                Ok(store) => {
                    info!(records = store.len(), "loaded records");
                    (store, None)
                }
                Err(e) => {
                    warn!(error = %e, "stored records are inconsistent, using seed data");
                    (seed_store(seed), Some(PersistenceWarning::LoadFailed(e.to_string())))
                }
            },
            Ok(None) => {
                info!("no stored records, using seed data");
                (seed_store(seed), None)
            }
            Err(e) => {
                warn!(error = %e, "failed to load records, using seed data");
                (seed_store(seed), Some(PersistenceWarning::LoadFailed(e.to_string())))
            }
        };

        let state = AppState::new(records, window).with_group_by(options.group_by);
        Self {
            state,
            storage,
            options,
            ids: Box::new(UuidGenerator),
            persistent: true,
            open_warning,
        }
    }

    /// Use a different id source for new records
    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Start from a previously saved color history
    pub fn with_colors(mut self, colors: ColorMap) -> Self {
        self.state.colors = colors;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn records(&self) -> &[Record] {
        self.state.records.records()
    }

    pub fn colors(&self) -> &ColorMap {
        &self.state.colors
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Warning produced while opening, if the load failed
    pub fn open_warning(&self) -> Option<&PersistenceWarning> {
        self.open_warning.as_ref()
    }

    /// True once a save failed and changes are no longer persisted
    pub fn is_in_memory(&self) -> bool {
        !self.persistent
    }

    /// Apply an intent, persist record changes and recompute the layout
    pub fn dispatch(&mut self, intent: Intent) -> Result<Dispatched, CommandError> {
        let name = intent.name();
        let transition = match reduce(&self.state, intent, self.ids.as_mut()) {
            Ok(transition) => transition,
            Err(e) => {
                debug!(intent = name, error = %e, "intent rejected");
                return Err(e);
            }
        };

        self.state = transition.state;
        let mut warning = None;
        if transition.records_changed {
            info!(
                intent = name,
                record = transition.affected.as_deref().unwrap_or("-"),
                total = self.state.records.len(),
                "records changed"
            );
            warning = self.persist();
        } else {
            debug!(intent = name, "view changed");
        }

        Ok(Dispatched {
            layout: self.layout(),
            affected: transition.affected,
            warning,
        })
    }

    /// Recompute the timeline for the current state
    pub fn layout(&mut self) -> LayoutModel {
        let options = self.options.clone().group_by(self.state.group_by);
        build_layout(
            self.state.records.records(),
            &self.state.window,
            &self.state.selection,
            &mut self.state.colors,
            &options,
        )
    }

    /// Month page for the current records and filters
    pub fn month_grid(&self, cursor: MonthCursor, options: &MonthGridOptions) -> MonthGrid {
        MonthGrid::build(cursor, self.state.records.records(), &self.state.selection, options)
    }

    fn persist(&mut self) -> Option<PersistenceWarning> {
        if !self.persistent {
            debug!("in-memory mode, skipping save");
            return None;
        }
        match self.storage.save(self.state.records.records()) {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "save failed, switching to in-memory mode");
                self.persistent = false;
                Some(PersistenceWarning::SaveFailed(e.to_string()))
            }
        }
    }
}

fn seed_store(seed: Vec<Record>) -> RecordStore {
    RecordStore::from_records(seed).unwrap_or_else(|e| {
        warn!(error = %e, "seed data rejected, starting empty");
        RecordStore::new()
    })
}
