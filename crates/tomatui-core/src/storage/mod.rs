mod config;
pub mod database;

pub use config::{
    Config, LongBreakConfig, Notification, SessionEndPolicy, Task, TaskType, TimerArt,
};
pub use database::{AllTimeStats, DailyStat, Database};

use std::path::PathBuf;

/// Returns `~/.config/tomatui[-dev]/`, creating it if needed.
///
/// Set TOMATUI_ENV=dev to use the development directories instead.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn config_dir() -> std::io::Result<PathBuf> {
    let base = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    let dir = base.join(app_dir_name());
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Returns the state directory (`$XDG_STATE_HOME/tomatui[-dev]/` on Linux,
/// with platform fallbacks), creating it if needed. The database and the
/// materialized default notification icon live here.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn state_dir() -> std::io::Result<PathBuf> {
    let base = dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/state")))
        .unwrap_or_else(|| PathBuf::from("."));

    let dir = base.join(app_dir_name());
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn app_dir_name() -> &'static str {
    let env = std::env::var("TOMATUI_ENV").unwrap_or_default();
    if env == "dev" {
        "tomatui-dev"
    } else {
        "tomatui"
    }
}
