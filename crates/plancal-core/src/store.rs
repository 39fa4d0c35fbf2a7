//! In-memory record store
//!
//! The store is the sole owner of record identity. Records keep insertion
//! order; every mutation is validated before anything changes, so a failed
//! call leaves the store exactly as it was.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use plancal_core::{RecordFields, RecordStore, SequentialIds, StoreError};
//!
//! let mut store = RecordStore::new();
//! let mut ids = SequentialIds::new("ev");
//! let start = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
//!
//! let id = store
//!     .create(RecordFields::new("Kickoff", "milestone").start(start), &mut ids)
//!     .unwrap()
//!     .id
//!     .clone();
//! assert!(store.find(&id).is_some());
//!
//! store.delete(&id).unwrap();
//! assert!(matches!(store.delete(&id), Err(StoreError::NotFound(_))));
//! ```

use serde::{Deserialize, Serialize};

use crate::{IdGenerator, Record, RecordFields, RecordId, StoreError, ValidationError};

/// Ordered collection of records
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from previously persisted records.
    ///
    /// Fails when a record breaks an invariant (blank id or title, end
    /// before start) or when two records share an id.
    pub fn from_records(records: Vec<Record>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Validate `fields`, assign a fresh id and append the record
    pub fn create(
        &mut self,
        fields: RecordFields,
        ids: &mut dyn IdGenerator,
    ) -> Result<&Record, StoreError> {
        let record = fields.into_record(ids.next_id())?;
        self.insert(record)
    }

    /// Append an already-built record
    pub fn insert(&mut self, record: Record) -> Result<&Record, StoreError> {
        check_record(&record)?;
        if self.contains(&record.id) {
            return Err(StoreError::DuplicateId(record.id));
        }
        self.records.push(record);
        let last = self.records.len() - 1;
        Ok(&self.records[last])
    }

    /// Replace the fields of an existing record, keeping its id and position
    pub fn update(&mut self, id: &str, fields: RecordFields) -> Result<&Record, StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let record = fields.into_record(id.to_string())?;
        self.records[index] = record;
        Ok(&self.records[index])
    }

    /// Remove a record, returning it
    pub fn delete(&mut self, id: &str) -> Result<Record, StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(self.records.remove(index))
    }

    /// Get a record by id
    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Check if a record with the given id exists
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Drop every record and start over from `records`
    pub fn reset(&mut self, records: Vec<Record>) -> Result<(), StoreError> {
        *self = Self::from_records(records)?;
        Ok(())
    }

    /// All records in insertion order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// List all record ids in insertion order
    pub fn ids(&self) -> Vec<&RecordId> {
        self.records.iter().map(|r| &r.id).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn check_record(record: &Record) -> Result<(), ValidationError> {
    if record.id.trim().is_empty() {
        return Err(ValidationError::EmptyField("id"));
    }
    if record.title.trim().is_empty() {
        return Err(ValidationError::EmptyField("title"));
    }
    if record.group.trim().is_empty() {
        return Err(ValidationError::EmptyField("group"));
    }
    if record.end < record.start {
        return Err(ValidationError::EndBeforeStart {
            start: record.start,
            end: record.end,
        });
    }
    Ok(())
}
