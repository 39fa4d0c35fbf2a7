//! # plancal-storage
//!
//! Persistence for plancal: a JSON file implementation of
//! [`plancal_core::RecordStorage`], the color history sidecar, and the
//! demo data used when nothing has been saved yet.

pub mod json;
pub mod seed;

pub use json::JsonFileStorage;
pub use seed::seed_records;
