use crate::entities::{PickerError, PopperPosition};
use crate::picker::DatePickerOptions;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "DATEPICKER_CONFIG";
pub const LOG_FILE_ENV: &str = "DATEPICKER_LOG_FILE";

/// Picker defaults read from the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerSettings {
    pub theme: Option<String>,
    pub touch: Option<bool>,
    pub position: Option<PopperPosition>,
    pub locale: Option<String>,
    pub highlight_weekends: Option<bool>,
    pub minimum_date: Option<NaiveDate>,
    pub maximum_date: Option<NaiveDate>,
    pub disabled_days: Vec<NaiveDate>,
    pub selector_starting_year: Option<i32>,
    pub selector_ending_year: Option<i32>,
}

impl PickerSettings {
    /// Apply file defaults to `options`.
    pub fn apply_to(&self, mut options: DatePickerOptions) -> DatePickerOptions {
        if let Some(touch) = self.touch {
            options = options.touch(touch);
        }
        if let Some(position) = self.position {
            options = options.calendar_popper_position(position);
        }
        if let Some(locale) = &self.locale {
            options = options.locale(locale.clone());
        }
        if let Some(highlight) = self.highlight_weekends {
            options = options.should_highlight_weekends(highlight);
        }
        if let Some(minimum) = self.minimum_date {
            options = options.minimum_date(minimum);
        }
        if let Some(maximum) = self.maximum_date {
            options = options.maximum_date(maximum);
        }
        if !self.disabled_days.is_empty() {
            options = options.disabled_days(self.disabled_days.clone());
        }
        options.selector_starting_year = self.selector_starting_year.or(options.selector_starting_year);
        options.selector_ending_year = self.selector_ending_year.or(options.selector_ending_year);
        options
    }
}

pub struct Config {
    pub config_path: PathBuf,
    pub log_path: PathBuf,
    pub settings: PickerSettings,
}

impl Config {
    /// Resolve file locations from the environment without reading anything.
    pub fn from_env() -> Self {
        let config_path = std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("datepicker")
                    .join("config.json")
            });

        let log_path = std::env::var(LOG_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("datepicker")
                    .join("datepicker.log")
            });

        Self {
            config_path,
            log_path,
            settings: PickerSettings::default(),
        }
    }

    /// Resolve locations and read the settings file. `config_path` wins over
    /// the environment.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, PickerError> {
        let mut config = Self::from_env();
        if let Some(path) = config_path {
            config.config_path = path;
        }
        config.settings = Self::read_settings(&config.config_path)?;
        Ok(config)
    }

    /// A missing file yields the defaults.
    pub fn read_settings(path: &Path) -> Result<PickerSettings, PickerError> {
        if !path.exists() {
            return Ok(PickerSettings::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
