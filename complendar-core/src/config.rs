//! Conversion settings.
//!
//! Everything that shapes a conversion (synonyms, sampling thresholds,
//! reminder offsets, calendar envelope) lives in one immutable
//! `ComplendarConfig` value that callers pass down by reference.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{ComplendarError, ComplendarResult};
use crate::header::LexicalMatch;

/// Placeholder year for event start dates. A leap year, so Feb 29 exists.
const DEFAULT_ANCHOR_YEAR: i32 = 2000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplendarConfig {
    pub resolver: ResolverConfig,
    pub calendar: CalendarConfig,
}

/// Tuning for header resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Data rows inspected when guessing a column from its values
    pub sample_size: usize,
    /// Minimum share of sampled cells that must parse as dates
    pub date_ratio_threshold: f64,
    /// Minimum share of sampled cells that must look like names
    pub name_ratio_threshold: f64,
    /// Weakest header match still trusted without looking at the values
    pub min_lexical_match: LexicalMatch,
    pub extra_name_synonyms: Vec<String>,
    pub extra_date_synonyms: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            sample_size: 8,
            date_ratio_threshold: 0.5,
            name_ratio_threshold: 0.5,
            min_lexical_match: LexicalMatch::Partial,
            extra_name_synonyms: Vec::new(),
            extra_date_synonyms: Vec::new(),
        }
    }
}

/// Calendar envelope and per-event constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub prod_id: String,
    pub calendar_name: String,
    /// Right-hand side of every event UID
    pub uid_domain: String,
    /// Year every event starts in. Must be a leap year.
    pub anchor_year: i32,
    pub reminders: Vec<ReminderConfig>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        CalendarConfig {
            prod_id: "-//Complendar//EN".to_string(),
            calendar_name: "Birthdays".to_string(),
            uid_domain: "complendar.event".to_string(),
            anchor_year: DEFAULT_ANCHOR_YEAR,
            reminders: vec![
                ReminderConfig {
                    before: "1day".to_string(),
                    message: "Tomorrow is {who} birthday!".to_string(),
                },
                ReminderConfig {
                    before: "0s".to_string(),
                    message: "Today is {who} birthday! 🎉".to_string(),
                },
            ],
        }
    }
}

/// A display alarm relative to the start of the birthday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// How long before the start of the day, e.g. `"1day"`, `"12h"`, `"0s"`
    pub before: String,
    /// Alarm text; `{who}` becomes the possessive name ("Jane's")
    pub message: String,
}

impl ReminderConfig {
    pub fn offset(&self) -> ComplendarResult<Duration> {
        humantime::parse_duration(&self.before).map_err(|e| {
            ComplendarError::Config(format!("Invalid reminder offset '{}': {e}", self.before))
        })
    }

    pub fn message_for(&self, possessive: &str) -> String {
        self.message.replace("{who}", possessive)
    }
}

impl ComplendarConfig {
    /// Default config file location: ~/.config/complendar/config.toml
    pub fn config_path() -> ComplendarResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ComplendarError::Config("Could not determine config directory".into()))?
            .join("complendar");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location (if present) and the environment.
    pub fn load() -> ComplendarResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path` (if present) and `COMPLENDAR_<SECTION>__<KEY>` environment variables.
    pub fn load_from(path: &Path) -> ComplendarResult<Self> {
        let config: ComplendarConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("COMPLENDAR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ComplendarError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ComplendarError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ComplendarResult<()> {
        let resolver = &self.resolver;
        if resolver.sample_size == 0 {
            return Err(ComplendarError::Config("resolver.sample_size must be at least 1".into()));
        }
        for (key, value) in [
            ("date_ratio_threshold", resolver.date_ratio_threshold),
            ("name_ratio_threshold", resolver.name_ratio_threshold),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ComplendarError::Config(format!(
                    "resolver.{key} must be in (0, 1], got {value}"
                )));
            }
        }

        let calendar = &self.calendar;
        if chrono::NaiveDate::from_ymd_opt(calendar.anchor_year, 2, 29).is_none() {
            return Err(ComplendarError::Config(format!(
                "calendar.anchor_year must be a leap year, got {}",
                calendar.anchor_year
            )));
        }
        for reminder in &calendar.reminders {
            reminder.offset()?;
        }

        Ok(())
    }
}
