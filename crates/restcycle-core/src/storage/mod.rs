mod settings;

pub use settings::{
    clamp_rest_minutes, clamp_work_minutes, Overrides, RunConfig, Settings, SettingsStore,
    DEFAULT_REST_MINUTES, DEFAULT_WORK_MINUTES, REST_MINUTES_RANGE, WORK_MINUTES_RANGE,
};

use std::path::PathBuf;

/// Returns `~/.config/restcycle[-dev]/` based on RESTCYCLE_ENV.
///
/// Set RESTCYCLE_ENV=dev to use a development settings directory. The
/// directory is created on first save.
pub fn config_dir() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("RESTCYCLE_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("restcycle-dev")
    } else {
        base_dir.join("restcycle")
    }
}
