//! TOML-based user settings.
//!
//! Four scalar values live at `~/.config/restcycle/settings.toml`:
//!
//! ```toml
//! work_minutes = 20
//! rest_minutes = 10
//! show_notifications = true
//! always_on_top = true
//! ```
//!
//! Loading never fails. A missing file is created with defaults, a damaged
//! one is salvaged field by field, and every numeric value is clamped into
//! its range before anyone sees it.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::config_dir;
use crate::error::SettingsError;

pub const DEFAULT_WORK_MINUTES: u32 = 20;
pub const DEFAULT_REST_MINUTES: u32 = 10;
pub const WORK_MINUTES_RANGE: RangeInclusive<u32> = 1..=240;
pub const REST_MINUTES_RANGE: RangeInclusive<u32> = 1..=120;

const SETTINGS_FILE: &str = "settings.toml";

/// Persisted user settings.
///
/// Field order here is the order written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub work_minutes: u32,
    pub rest_minutes: u32,
    pub show_notifications: bool,
    pub always_on_top: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            rest_minutes: DEFAULT_REST_MINUTES,
            show_notifications: true,
            always_on_top: true,
        }
    }
}

pub fn clamp_work_minutes(minutes: i64) -> u32 {
    clamp_into(minutes, &WORK_MINUTES_RANGE)
}

pub fn clamp_rest_minutes(minutes: i64) -> u32 {
    clamp_into(minutes, &REST_MINUTES_RANGE)
}

fn clamp_into(value: i64, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(i64::from(*range.start()), i64::from(*range.end())) as u32
}

impl Settings {
    /// Same record with both minute fields snapped into range.
    pub fn clamped(self) -> Self {
        Self {
            work_minutes: clamp_work_minutes(i64::from(self.work_minutes)),
            rest_minutes: clamp_rest_minutes(i64::from(self.rest_minutes)),
            ..self
        }
    }

    /// Salvage whatever is usable from a parsed table.
    ///
    /// Missing or unreadable keys take their default; unknown keys are ignored.
    fn recover(table: &toml::Table) -> Self {
        let defaults = Self::default();
        let work_minutes = recover_int(table.get("work_minutes"))
            .map(clamp_work_minutes)
            .unwrap_or(defaults.work_minutes);
        let rest_minutes = recover_int(table.get("rest_minutes"))
            .map(clamp_rest_minutes)
            .unwrap_or(defaults.rest_minutes);
        Self {
            work_minutes,
            rest_minutes,
            show_notifications: recover_bool(table.get("show_notifications"))
                .unwrap_or(defaults.show_notifications),
            always_on_top: recover_bool(table.get("always_on_top"))
                .unwrap_or(defaults.always_on_top),
        }
    }

    /// Update one field from its textual form, clamping numbers.
    ///
    /// Used by settings editors; keys are the on-disk key names.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        match key {
            "work_minutes" | "work" => {
                let minutes = value
                    .parse::<i64>()
                    .map_err(|_| format!("cannot parse '{value}' as minutes"))?;
                self.work_minutes = clamp_work_minutes(minutes);
            }
            "rest_minutes" | "rest" => {
                let minutes = value
                    .parse::<i64>()
                    .map_err(|_| format!("cannot parse '{value}' as minutes"))?;
                self.rest_minutes = clamp_rest_minutes(minutes);
            }
            "show_notifications" | "notify" => {
                self.show_notifications =
                    parse_flag(value).ok_or_else(|| format!("cannot parse '{value}' as bool"))?;
            }
            "always_on_top" | "ontop" => {
                self.always_on_top =
                    parse_flag(value).ok_or_else(|| format!("cannot parse '{value}' as bool"))?;
            }
            _ => return Err(format!("unknown settings key: {key}")),
        }
        Ok(())
    }
}

fn recover_int(value: Option<&toml::Value>) -> Option<i64> {
    match value? {
        toml::Value::Integer(n) => Some(*n),
        toml::Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        toml::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn recover_bool(value: Option<&toml::Value>) -> Option<bool> {
    match value? {
        toml::Value::Boolean(b) => Some(*b),
        toml::Value::Integer(n) => Some(*n != 0),
        toml::Value::String(s) => parse_flag(s),
        _ => None,
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Reads and writes [`Settings`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the per-user location, `~/.config/restcycle/settings.toml`.
    pub fn open_default() -> Self {
        Self::new(config_dir().join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, falling back to defaults on any problem.
    ///
    /// A missing file is written with defaults. A file that cannot be read
    /// or parsed is left untouched.
    pub fn load(&self) -> Settings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "using default settings");
                Settings::default()
            }
        }
    }

    fn try_load(&self) -> Result<Settings, SettingsError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let table: toml::Table = content.parse()?;
                Ok(Settings::recover(&table))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Settings::default();
                if let Err(e) = self.save(&settings) {
                    warn!(error = %e, "could not write default settings");
                }
                Ok(settings)
            }
            Err(source) => Err(SettingsError::ReadFailed {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Persist the full record.
    ///
    /// The file is written beside the target and renamed over it, so a
    /// reader sees either the old record or the new one.
    ///
    /// # Errors
    /// Returns an error if the record cannot be serialized or written.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let content = toml::to_string_pretty(&settings.clamped())?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let save_failed = |message: String| SettingsError::SaveFailed {
            path: self.path.clone(),
            message,
        };

        std::fs::create_dir_all(&dir).map_err(|source| SettingsError::DirUnavailable {
            path: dir.clone(),
            source,
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| save_failed(e.to_string()))?;
        tmp.write_all(content.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| save_failed(e.to_string()))?;
        tmp.persist(&self.path)
            .map_err(|e| save_failed(e.error.to_string()))?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

/// Startup adjustments from the command line.
///
/// Never persisted on their own; they only shape the [`RunConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub work_minutes: Option<i64>,
    pub rest_minutes: Option<i64>,
    pub no_notify: bool,
    pub no_ontop: bool,
    /// Run both phases with the short fast-test countdown.
    pub fast_test: bool,
}

impl Overrides {
    pub fn apply(&self, settings: Settings) -> RunConfig {
        let mut settings = settings.clamped();
        if let Some(minutes) = self.work_minutes {
            settings.work_minutes = clamp_work_minutes(minutes);
        }
        if let Some(minutes) = self.rest_minutes {
            settings.rest_minutes = clamp_rest_minutes(minutes);
        }
        if self.no_notify {
            settings.show_notifications = false;
        }
        if self.no_ontop {
            settings.always_on_top = false;
        }
        RunConfig {
            settings,
            fast_test: self.fast_test,
        }
    }
}

/// Effective configuration for this process run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    pub settings: Settings,
    pub fast_test: bool,
}

impl RunConfig {
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            settings: settings.clamped(),
            fast_test: false,
        }
    }

    /// Work phase length; zero in fast-test mode.
    pub fn work_seconds(&self) -> u64 {
        if self.fast_test {
            0
        } else {
            u64::from(self.settings.work_minutes) * 60
        }
    }

    /// Rest phase length; zero in fast-test mode.
    pub fn rest_seconds(&self) -> u64 {
        if self.fast_test {
            0
        } else {
            u64::from(self.settings.rest_minutes) * 60
        }
    }

    pub fn notifications_enabled(&self) -> bool {
        self.settings.show_notifications
    }

    pub fn always_on_top(&self) -> bool {
        self.settings.always_on_top
    }

    /// Human-readable work length for notification bodies.
    pub fn work_label(&self) -> String {
        if self.fast_test {
            "fast test".to_string()
        } else {
            format!("{} min", self.settings.work_minutes)
        }
    }

    pub fn rest_label(&self) -> String {
        if self.fast_test {
            "fast test".to_string()
        } else {
            format!("{} min", self.settings.rest_minutes)
        }
    }
}
