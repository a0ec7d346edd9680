//! Desktop notifications via platform helper programs.
//!
//! Detect-then-dispatch: pick the best helper available on the current
//! platform, build its argument list, run it to completion. When no helper
//! exists the notification goes to the log instead, so an active terminal
//! UI is never corrupted by stray output.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::NotifyError;
use crate::storage::{state_dir, Notification};

static DEFAULT_ICON: &[u8] = include_bytes!("../assets/icon.png");

/// Available notification helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Linux notify-send
    NotifySend,
    /// macOS osascript
    OsaScript,
    /// No helper available; write to the log
    Log,
}

impl Backend {
    /// Detect the best helper for the current platform.
    pub async fn detect() -> Self {
        #[cfg(target_os = "macos")]
        {
            Backend::OsaScript
        }

        #[cfg(not(target_os = "macos"))]
        {
            if command_exists("notify-send").await {
                Backend::NotifySend
            } else {
                Backend::Log
            }
        }
    }

    /// Dispatch `notification` using this helper.
    ///
    /// # Errors
    /// Returns an error if the helper cannot be launched or exits with a
    /// failure status.
    pub async fn send(self, notification: &Notification) -> Result<(), NotifyError> {
        match self {
            Backend::NotifySend => send_notify_send(notification).await,
            Backend::OsaScript => send_osascript(notification).await,
            Backend::Log => {
                info!("{}: {}", notification.title, notification.message);
                Ok(())
            }
        }
    }
}

/// Dispatch `notification` with the detected platform helper.
///
/// # Errors
/// Returns an error if the helper cannot be launched or reports failure.
pub async fn send(notification: &Notification) -> Result<(), NotifyError> {
    Backend::detect().await.send(notification).await
}

async fn send_notify_send(notification: &Notification) -> Result<(), NotifyError> {
    let mut cmd = Command::new("notify-send");
    cmd.args(["--app-name", "tomatui"])
        .arg(&notification.title)
        .arg(&notification.message);

    if let Some(icon) = icon_path(notification) {
        cmd.arg("--icon").arg(icon);
    }
    if notification.urgent {
        cmd.args(["--urgency", "critical"]);
    }

    run("notify-send", cmd).await
}

async fn send_osascript(notification: &Notification) -> Result<(), NotifyError> {
    let title = notification.title.replace('"', r#"\""#);
    let message = notification.message.replace('"', r#"\""#);

    let mut script = format!(r#"display notification "{message}" with title "{title}""#);
    if notification.urgent {
        script.push_str(r#" sound name "Basso""#);
    }

    let mut cmd = Command::new("osascript");
    cmd.args(["-e", &script]);
    run("osascript", cmd).await
}

async fn run(command: &'static str, mut cmd: Command) -> Result<(), NotifyError> {
    let status = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|source| NotifyError::Launch { command, source })?;

    if !status.success() {
        return Err(NotifyError::Failed { command, status });
    }
    Ok(())
}

/// The configured icon if one is set, else the embedded default
/// materialized into the state directory. File-based helpers need a real
/// path, so the bundled bytes are written out once and reused.
fn icon_path(notification: &Notification) -> Option<PathBuf> {
    if let Some(icon) = &notification.icon {
        return Some(icon.clone());
    }
    match default_icon_path() {
        Ok(path) => Some(path),
        Err(err) => {
            debug!("default icon unavailable: {err}");
            None
        }
    }
}

fn default_icon_path() -> std::io::Result<PathBuf> {
    let path = state_dir()?.join("icon.png");
    if !path.exists() {
        std::fs::write(&path, DEFAULT_ICON)?;
    }
    Ok(path)
}

#[cfg(not(target_os = "macos"))]
async fn command_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> Notification {
        Notification {
            enabled: true,
            urgent: false,
            title: "tomatui".to_string(),
            message: "work finished!".to_string(),
            icon: None,
        }
    }

    #[tokio::test]
    async fn log_backend_always_succeeds() {
        Backend::Log.send(&notification()).await.unwrap();
    }

    #[test]
    fn embedded_icon_is_a_png() {
        assert_eq!(&DEFAULT_ICON[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn configured_icon_wins_over_default() {
        let mut n = notification();
        n.icon = Some(PathBuf::from("/tmp/custom.png"));
        assert_eq!(icon_path(&n), Some(PathBuf::from("/tmp/custom.png")));
    }
}
