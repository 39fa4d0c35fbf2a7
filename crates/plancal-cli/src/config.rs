//! `plancal.toml` configuration
//!
//! Every key is optional. Command-line flags override the file and the file
//! overrides the built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Weekday;
use serde::Deserialize;

use plancal_core::{Color, Granularity, Palette, ValidationError};
use plancal_engine::{GroupBy, DEFAULT_MAX_CHIPS, DEFAULT_UPCOMING_LIMIT};

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "plancal.toml";

/// Data file used when neither the flag nor the config names one
pub const DEFAULT_DATA_FILE: &str = "plancal.json";

/// First column of the month calendar
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data_file: Option<PathBuf>,
    pub default_unit: Granularity,
    pub week_start: WeekStart,
    pub max_chips: usize,
    pub upcoming_limit: usize,
    pub group_by: GroupBy,
    /// Replaces the built-in palette when present
    pub palette: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            default_unit: Granularity::Week,
            week_start: WeekStart::Sunday,
            max_chips: DEFAULT_MAX_CHIPS,
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
            group_by: GroupBy::Group,
            palette: None,
        }
    }
}

impl Config {
    /// Load `path`, or `plancal.toml` from `dir` when no path is given.
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>, dir: &Path) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = dir.join(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Effective data file: flag, then config, then the default name in `dir`
    pub fn data_file(&self, flag: Option<&Path>, dir: &Path) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.data_file.clone())
            .unwrap_or_else(|| dir.join(DEFAULT_DATA_FILE))
    }

    pub fn palette(&self) -> Result<Palette, ValidationError> {
        match &self.palette {
            Some(colors) => Palette::new(colors.iter().map(Color::new)),
            None => Ok(Palette::default()),
        }
    }
}
