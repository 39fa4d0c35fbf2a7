//! Stable color assignment for grouping keys
//!
//! A [`ColorMap`] remembers which palette color each grouping key received.
//! Reconciling it against the keys of a new render pass never changes the
//! color of a key that is still present:
//!
//! 1. colors already assigned are marked as used;
//! 2. each present key without a color, in label order, takes the first
//!    unused palette color (or `palette[0]` once the palette is exhausted);
//! 3. keys that disappeared are dropped.
//!
//! # Example
//!
//! ```rust
//! use plancal_core::{ColorMap, Palette};
//!
//! let palette = Palette::default();
//! let mut colors = ColorMap::new();
//! colors.reconcile(["A", "B", "C"], &palette);
//! let a = colors.get("A").cloned();
//!
//! colors.reconcile(["A", "C", "D"], &palette);
//! assert_eq!(colors.get("A").cloned(), a);
//! assert!(colors.get("B").is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{compare_labels, ValidationError};

/// A CSS-style color value (e.g. `#f45d6e`)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Default palette, in assignment order
pub const DEFAULT_COLORS: [&str; 10] = [
    "#f45d6e", // red
    "#f9a825", // amber
    "#26c6da", // cyan
    "#66bb6a", // green
    "#ab47bc", // purple
    "#ff7043", // orange
    "#5b6ef5", // indigo
    "#8d6e63", // brown
    "#ec407a", // pink
    "#26a69a", // teal
];

/// Fixed, ordered list of colors; never empty
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.iter().map(|c| Color::new(*c)).collect(),
        }
    }
}

impl Palette {
    /// Create a palette; duplicates are dropped, order is kept
    pub fn new(colors: impl IntoIterator<Item = Color>) -> Result<Self, ValidationError> {
        let mut seen = BTreeSet::new();
        let colors: Vec<Color> = colors
            .into_iter()
            .filter(|c| seen.insert(c.clone()))
            .collect();
        if colors.is_empty() {
            return Err(ValidationError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Fallback color used once every palette entry is taken
    pub fn first(&self) -> &Color {
        &self.colors[0]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// What a reconciliation pass changed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Keys that received a color in this pass
    pub assigned: Vec<String>,
    /// Keys whose assignment was dropped
    pub pruned: Vec<String>,
}

impl Reconciliation {
    pub fn is_noop(&self) -> bool {
        self.assigned.is_empty() && self.pruned.is_empty()
    }
}

/// Persistent mapping from grouping key to palette color
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorMap {
    assignments: BTreeMap<String, Color>,
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Color> {
        self.assignments.get(key)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Color)> {
        self.assignments.iter().map(|(k, c)| (k.as_str(), c))
    }

    /// Bring the map in line with the keys present in the record set
    pub fn reconcile<I, S>(&mut self, keys: I, palette: &Palette) -> Reconciliation
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut present: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        present.sort_by(|a, b| compare_labels(a, b));
        present.dedup();

        let mut used: BTreeSet<Color> = self.assignments.values().cloned().collect();
        let mut outcome = Reconciliation::default();

        for key in &present {
            if self.assignments.contains_key(key) {
                continue;
            }
            let color = palette
                .colors()
                .iter()
                .find(|c| !used.contains(*c))
                .unwrap_or_else(|| palette.first())
                .clone();
            used.insert(color.clone());
            self.assignments.insert(key.clone(), color);
            outcome.assigned.push(key.clone());
        }

        let keep: BTreeSet<&str> = present.iter().map(String::as_str).collect();
        let stale: Vec<String> = self
            .assignments
            .keys()
            .filter(|k| !keep.contains(k.as_str()))
            .cloned()
            .collect();
        for key in stale {
            self.assignments.remove(&key);
            outcome.pruned.push(key);
        }

        outcome
    }
}
