//! JSON file storage
//!
//! Records are kept as a pretty-printed JSON array. Writes go to a
//! temporary file next to the target and are renamed over it, so a crash
//! mid-write leaves the previous file intact. The color history lives in a
//! sidecar file beside the data file.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use plancal_core::{ColorMap, PersistenceError, Record, RecordStorage};
use tracing::debug;

/// Record storage backed by a single JSON file
#[derive(Clone, Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `plan.json` keeps its colors in `plan.colors.json`
    pub fn colors_path(&self) -> PathBuf {
        self.path.with_extension("colors.json")
    }

    /// Load the saved color history; `Ok(None)` when there is none yet
    pub fn load_colors(&self) -> Result<Option<ColorMap>, PersistenceError> {
        let path = self.colors_path();
        let Some(content) = read_optional(&path)? else {
            return Ok(None);
        };
        let colors: ColorMap = serde_json::from_str(&content)
            .map_err(|e| PersistenceError::Malformed(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), keys = colors.len(), "loaded color history");
        Ok(Some(colors))
    }

    pub fn save_colors(&self, colors: &ColorMap) -> Result<(), PersistenceError> {
        let content = serde_json::to_string_pretty(colors)
            .map_err(|e| PersistenceError::Serialize(e.to_string()))?;
        write_atomic(&self.colors_path(), &content)
    }
}

impl RecordStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<Vec<Record>>, PersistenceError> {
        let Some(content) = read_optional(&self.path)? else {
            debug!(path = %self.path.display(), "no data file");
            return Ok(None);
        };
        let records: Vec<Record> = serde_json::from_str(&content)
            .map_err(|e| PersistenceError::Malformed(format!("{}: {}", self.path.display(), e)))?;
        debug!(path = %self.path.display(), records = records.len(), "loaded data file");
        Ok(Some(records))
    }

    fn save(&self, records: &[Record]) -> Result<(), PersistenceError> {
        let content = serde_json::to_string_pretty(records)
            .map_err(|e| PersistenceError::Serialize(e.to_string()))?;
        write_atomic(&self.path, &content)?;
        debug!(path = %self.path.display(), records = records.len(), "saved data file");
        Ok(())
    }
}

/// File contents, or `None` when the file does not exist
fn read_optional(path: &Path) -> Result<Option<String>, PersistenceError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write via temp file + rename
fn write_atomic(path: &Path, content: &str) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()?;
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}
