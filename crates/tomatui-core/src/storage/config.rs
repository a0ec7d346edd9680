//! TOML-based configuration management.
//!
//! Configuration lives at `~/.config/tomatui/config.toml`. Every field is
//! optional in the file: values are overlaid onto the built-in defaults, so a
//! config containing only `[work] duration = "31m"` still yields a complete
//! [`Config`]. A missing or unreadable file never stops a session: callers
//! use [`Config::load_or_default`] and get the defaults with a logged
//! warning.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::duration;
use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.toml";

/// The two task kinds a session can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Work,
    Break,
}

impl TaskType {
    pub fn opposite(self) -> TaskType {
        match self {
            TaskType::Work => TaskType::Break,
            TaskType::Break => TaskType::Work,
        }
    }

    /// The string stored in the `sessions.type` column.
    pub fn session_type(self) -> &'static str {
        match self {
            TaskType::Work => "work",
            TaskType::Break => "break",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.session_type())
    }
}

/// What happens when a session's timer reaches zero.
///
/// Unrecognized strings are preserved as [`SessionEndPolicy::Unknown`] and
/// decided at completion time (treated as quit, with a logged warning) rather
/// than silently rewritten at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionEndPolicy {
    Ask,
    Start,
    Quit,
    Unknown(String),
}

impl SessionEndPolicy {
    pub fn as_str(&self) -> &str {
        match self {
            SessionEndPolicy::Ask => "ask",
            SessionEndPolicy::Start => "start",
            SessionEndPolicy::Quit => "quit",
            SessionEndPolicy::Unknown(value) => value,
        }
    }
}

impl Default for SessionEndPolicy {
    fn default() -> Self {
        SessionEndPolicy::Ask
    }
}

impl From<String> for SessionEndPolicy {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ask" => SessionEndPolicy::Ask,
            "start" => SessionEndPolicy::Start,
            "quit" => SessionEndPolicy::Quit,
            _ => SessionEndPolicy::Unknown(value),
        }
    }
}

impl From<SessionEndPolicy> for String {
    fn from(policy: SessionEndPolicy) -> Self {
        policy.as_str().to_string()
    }
}

/// Desktop notification settings for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub enabled: bool,
    pub urgent: bool,
    pub title: String,
    pub message: String,
    /// Custom icon path; the embedded default icon is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<PathBuf>,
}

/// A named timed activity plus its post-completion side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub title: String,
    #[serde(with = "duration::serde_str")]
    pub duration: Duration,
    /// Commands run after the task completes, in order.
    pub then: Vec<Vec<String>>,
    pub notification: Notification,
}

/// Periodic long break settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LongBreakConfig {
    pub enabled: bool,
    /// Number of work sessions per cycle; the break after the `after`-th
    /// work session is the long one. Must be ≥ 1.
    pub after: u32,
    #[serde(with = "duration::serde_str")]
    pub duration: Duration,
}

/// Big block-digit clock rendering options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerArt {
    pub enabled: bool,
    /// Color name or `#rrggbb` value, parsed by the renderer.
    pub color: String,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub on_session_end: SessionEndPolicy,
    /// Duration of the "short session" continuation offered by the confirm
    /// prompt.
    #[serde(with = "duration::serde_str")]
    pub short_session: Duration,
    pub alt_screen: bool,
    pub timer_art: TimerArt,
    pub work: Task,
    #[serde(rename = "break")]
    pub break_task: Task,
    pub long_break: LongBreakConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            on_session_end: SessionEndPolicy::Ask,
            short_session: Duration::from_secs(2 * 60),
            alt_screen: true,
            timer_art: TimerArt {
                enabled: true,
                color: "red".to_string(),
            },
            work: Task {
                title: "work".to_string(),
                duration: Duration::from_secs(25 * 60),
                then: Vec::new(),
                notification: Notification {
                    enabled: true,
                    urgent: false,
                    title: "tomatui".to_string(),
                    message: "work finished!".to_string(),
                    icon: None,
                },
            },
            break_task: Task {
                title: "break".to_string(),
                duration: Duration::from_secs(5 * 60),
                then: Vec::new(),
                notification: Notification {
                    enabled: true,
                    urgent: false,
                    title: "tomatui".to_string(),
                    message: "break finished!".to_string(),
                    icon: None,
                },
            },
            long_break: LongBreakConfig {
                enabled: true,
                after: 4,
                duration: Duration::from_secs(15 * 60),
            },
        }
    }
}

impl Config {
    pub fn task(&self, task_type: TaskType) -> &Task {
        match task_type {
            TaskType::Work => &self.work,
            TaskType::Break => &self.break_task,
        }
    }

    pub fn task_mut(&mut self, task_type: TaskType) -> &mut Task {
        match task_type {
            TaskType::Work => &mut self.work,
            TaskType::Break => &mut self.break_task,
        }
    }

    /// Default configuration file location, creating the config directory.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be created.
    pub fn default_path() -> std::io::Result<PathBuf> {
        Ok(super::config_dir()?.join(CONFIG_FILE))
    }

    /// Load configuration from `path`, overlaying the file onto defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// contains an invalid value (bad duration, `long_break.after = 0`).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|err| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_toml(&text)
    }

    /// Parse configuration from a TOML string, overlaying it onto defaults.
    ///
    /// # Errors
    /// Returns an error if the text is not valid TOML or a value is invalid.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(text).map_err(|err| ConfigError::ParseFailed(err.to_string()))?;
        raw.merge_into(Config::default())
    }

    /// Load the configuration from the default location, falling back to the
    /// built-in defaults when the file is missing or invalid.
    pub fn load_or_default() -> Self {
        let path = match Self::default_path() {
            Ok(path) => path,
            Err(err) => {
                warn!("failed to resolve config path, using defaults: {err}");
                return Config::default();
            }
        };

        if !path.exists() {
            debug!("no config file at {}, using defaults", path.display());
            return Config::default();
        }

        match Self::load(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!("using default config: {err}");
                Config::default()
            }
        }
    }

    /// Serialize the effective configuration to TOML.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|err| ConfigError::ParseFailed(err.to_string()))
    }

    /// Write the configuration to `path`.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = self.to_toml().map_err(|err| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        std::fs::write(path, text).map_err(|err| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

// ── File overlay ─────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    on_session_end: Option<SessionEndPolicy>,
    short_session: Option<String>,
    alt_screen: Option<bool>,
    timer_art: Option<RawTimerArt>,
    work: Option<RawTask>,
    #[serde(rename = "break")]
    break_task: Option<RawTask>,
    long_break: Option<RawLongBreak>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTask {
    title: Option<String>,
    duration: Option<String>,
    then: Option<Vec<Vec<String>>>,
    notification: Option<RawNotification>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawNotification {
    enabled: Option<bool>,
    urgent: Option<bool>,
    title: Option<String>,
    message: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLongBreak {
    enabled: Option<bool>,
    after: Option<u32>,
    duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTimerArt {
    enabled: Option<bool>,
    color: Option<String>,
}

impl RawConfig {
    fn merge_into(self, mut config: Config) -> Result<Config, ConfigError> {
        if let Some(policy) = self.on_session_end {
            config.on_session_end = policy;
        }
        if let Some(text) = self.short_session {
            config.short_session = parse_duration_value(&text, "short_session")?;
        }
        if let Some(alt_screen) = self.alt_screen {
            config.alt_screen = alt_screen;
        }
        if let Some(art) = self.timer_art {
            if let Some(enabled) = art.enabled {
                config.timer_art.enabled = enabled;
            }
            if let Some(color) = art.color {
                config.timer_art.color = color;
            }
        }
        if let Some(task) = self.work {
            task.merge_into(&mut config.work, "work")?;
        }
        if let Some(task) = self.break_task {
            task.merge_into(&mut config.break_task, "break")?;
        }
        if let Some(long_break) = self.long_break {
            long_break.merge_into(&mut config.long_break)?;
        }
        Ok(config)
    }
}

impl RawTask {
    fn merge_into(self, task: &mut Task, key: &str) -> Result<(), ConfigError> {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(text) = self.duration {
            task.duration = parse_duration_value(&text, &format!("{key}.duration"))?;
        }
        if let Some(then) = self.then {
            task.then = then;
        }
        if let Some(notification) = self.notification {
            if let Some(enabled) = notification.enabled {
                task.notification.enabled = enabled;
            }
            if let Some(urgent) = notification.urgent {
                task.notification.urgent = urgent;
            }
            if let Some(title) = notification.title {
                task.notification.title = title;
            }
            if let Some(message) = notification.message {
                task.notification.message = message;
            }
            if let Some(icon) = notification.icon {
                task.notification.icon = if icon.is_empty() {
                    None
                } else {
                    Some(expand_path(&icon))
                };
            }
        }
        Ok(())
    }
}

impl RawLongBreak {
    fn merge_into(self, long_break: &mut LongBreakConfig) -> Result<(), ConfigError> {
        if let Some(enabled) = self.enabled {
            long_break.enabled = enabled;
        }
        if let Some(after) = self.after {
            if after == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "long_break.after".to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
            long_break.after = after;
        }
        if let Some(text) = self.duration {
            long_break.duration = parse_duration_value(&text, "long_break.duration")?;
        }
        Ok(())
    }
}

fn parse_duration_value(text: &str, key: &str) -> Result<Duration, ConfigError> {
    duration::parse(text).map_err(|err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: err.to_string(),
    })
}

/// Expand a leading `~/` to the user's home directory. Everything else,
/// including a standalone `~` and mid-path tildes, passes through untouched.
fn expand_path(input: &str) -> PathBuf {
    if input == "~/" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = input.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(input)
}
