//! Host-supplied configuration for a timeline session.
//!
//! The core never reads environment variables; hosts build a
//! [`TimelineConfig`] (or parse one from JSON) and pass it in.

use crate::logging::default_log_level;
use crate::view::window::{TimelineWindow, DEFAULT_ZOOM_INDEX, ZOOM_LEVELS};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "timeline.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvertedRange {
        start: NaiveDate,
        end: NaiveDate,
    },
    ZoomIndexOutOfRange(usize),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid timeline config: {err}"),
            Self::InvertedRange { start, end } => {
                write!(f, "initial range end {end} is before start {start}")
            }
            Self::ZoomIndexOutOfRange(index) => write!(
                f,
                "initial zoom index {index} exceeds max {}",
                ZOOM_LEVELS.len() - 1
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling logs. `None` leaves logging to the host.
    pub log_dir: Option<PathBuf>,
    pub initial_range_start: NaiveDate,
    pub initial_range_end: NaiveDate,
    pub initial_zoom_index: usize,
    /// Seed sample data when the store holds no events.
    pub seed_when_empty: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            initial_range_start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            initial_range_end: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default(),
            initial_zoom_index: DEFAULT_ZOOM_INDEX,
            seed_when_empty: true,
        }
    }
}

impl TimelineConfig {
    /// Parses a JSON document; missing keys take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_range_end < self.initial_range_start {
            return Err(ConfigError::InvertedRange {
                start: self.initial_range_start,
                end: self.initial_range_end,
            });
        }
        if self.initial_zoom_index >= ZOOM_LEVELS.len() {
            return Err(ConfigError::ZoomIndexOutOfRange(self.initial_zoom_index));
        }
        Ok(())
    }

    /// Builds the initial window described by this config.
    pub fn initial_window(&self) -> Result<TimelineWindow, ConfigError> {
        self.validate()?;
        TimelineWindow::with_zoom(
            self.initial_range_start,
            self.initial_range_end,
            self.initial_zoom_index,
        )
        .map_err(|err| ConfigError::InvertedRange {
            start: err.start,
            end: err.end,
        })
    }
}
