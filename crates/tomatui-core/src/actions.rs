//! Post-session side effects.
//!
//! When a session completes, its notification and `then` commands run in the
//! background so the next session can start immediately. Both units share
//! one deadline: the notification is dispatched concurrently while the
//! commands run sequentially, and whatever is still going when the deadline
//! passes (or the handle is cancelled) gets killed rather than orphaned.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::{oneshot, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::notify;
use crate::storage::{Notification, Task};

/// Default deadline for one set of post actions.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to one running set of post actions.
///
/// Completion is observed through [`PostActions::take_done`]; cancelling
/// kills whatever is still running and skips the rest. Dropping the handle
/// leaves the actions running to their deadline.
#[derive(Debug)]
pub struct PostActions {
    cancel: watch::Sender<bool>,
    done: Option<oneshot::Receiver<()>>,
}

impl PostActions {
    /// Abort in-flight actions. Idempotent.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// The completion receiver. Available exactly once; it resolves after
    /// both units have finished, timed out, or been cancelled.
    pub fn take_done(&mut self) -> Option<oneshot::Receiver<()>> {
        self.done.take()
    }
}

/// Launch the notification and command units for a completed task.
///
/// # Panics
/// Panics if called outside a tokio runtime.
pub fn run(task: &Task) -> PostActions {
    run_with_timeout(task, DEFAULT_TIMEOUT)
}

fn run_with_timeout(task: &Task, timeout: Duration) -> PostActions {
    let deadline = Instant::now() + timeout;
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let (done_tx, done_rx) = oneshot::channel();

    let notify_handle = tokio::spawn(notification_unit(
        task.notification.clone(),
        deadline,
        cancel_rx.clone(),
    ));
    let command_handle = tokio::spawn(command_unit(task.then.clone(), deadline, cancel_rx));

    tokio::spawn(async move {
        let _ = notify_handle.await;
        let _ = command_handle.await;
        let _ = done_tx.send(());
    });

    PostActions {
        cancel: cancel_tx,
        done: Some(done_rx),
    }
}

// ── Units ────────────────────────────────────────────────────────

async fn notification_unit(
    notification: Notification,
    deadline: Instant,
    mut cancel: watch::Receiver<bool>,
) {
    if !notification.enabled {
        return;
    }

    tokio::select! {
        result = notify::send(&notification) => {
            if let Err(err) = result {
                warn!("notification failed: {err}");
            }
        }
        _ = sleep_until(deadline) => {
            warn!("notification timed out");
        }
        _ = cancelled(&mut cancel) => {
            debug!("notification cancelled");
        }
    }
}

async fn command_unit(
    commands: Vec<Vec<String>>,
    deadline: Instant,
    mut cancel: watch::Receiver<bool>,
) {
    for command in commands {
        if Instant::now() >= deadline || *cancel.borrow() {
            debug!("deadline passed, skipping remaining commands");
            return;
        }
        run_command(&command, deadline, &mut cancel).await;
    }
}

/// Run a single command to completion, the deadline, or cancellation.
/// Failures are logged; the caller moves on to the next command either way.
async fn run_command(command: &[String], deadline: Instant, cancel: &mut watch::Receiver<bool>) {
    let Some((program, args)) = command.split_first() else {
        return;
    };

    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(err) => {
            warn!("failed to launch {program}: {err}");
            return;
        }
    };

    tokio::select! {
        status = child.wait() => match status {
            Ok(status) if status.success() => debug!("{program} finished"),
            Ok(status) => warn!("{program} exited with {status}"),
            Err(err) => warn!("failed to wait for {program}: {err}"),
        },
        _ = sleep_until(deadline) => {
            warn!("{program} hit the deadline, killing it");
            kill(&mut child, program).await;
        }
        _ = cancelled(cancel) => {
            debug!("{program} cancelled, killing it");
            kill(&mut child, program).await;
        }
    }
}

async fn kill(child: &mut Child, program: &str) {
    if let Err(err) = child.start_kill() {
        warn!("failed to kill {program}: {err}");
        return;
    }
    let _ = child.wait().await;
}

/// Resolves when the cancel flag is raised. Never resolves if the handle
/// was dropped without cancelling.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TaskType;
    use tokio::time::timeout;

    fn task_with(then: Vec<Vec<String>>) -> Task {
        let mut task = crate::storage::Config::default()
            .task(TaskType::Work)
            .clone();
        task.notification.enabled = false;
        task.then = then;
        task
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    async fn wait_done(actions: &mut PostActions, limit: Duration) {
        let done = actions.take_done().unwrap();
        timeout(limit, done)
            .await
            .expect("post actions did not settle in time")
            .unwrap();
    }

    #[tokio::test]
    async fn empty_task_settles_immediately() {
        let mut actions = run(&task_with(Vec::new()));
        wait_done(&mut actions, Duration::from_secs(1)).await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn commands_run_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut actions = run(&task_with(vec![
            sh(&format!("echo first >> {}", out.display())),
            sh(&format!("echo second >> {}", out.display())),
        ]));
        wait_done(&mut actions, Duration::from_secs(3)).await;

        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text, "first\nsecond\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failure_does_not_stop_the_queue() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut actions = run(&task_with(vec![
            vec!["false".to_string()],
            vec!["does-not-exist-anywhere".to_string()],
            sh(&format!("echo survived >> {}", out.display())),
        ]));
        wait_done(&mut actions, Duration::from_secs(3)).await;

        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text, "survived\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancel_kills_a_running_command() {
        let mut actions = run(&task_with(vec![sh("sleep 30")]));
        tokio::time::sleep(Duration::from_millis(100)).await;
        actions.cancel();
        // settles well before the sleep would finish
        wait_done(&mut actions, Duration::from_secs(2)).await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn deadline_bounds_a_stuck_command() {
        let task = task_with(vec![sh("sleep 30"), sh("echo never")]);
        let mut actions = run_with_timeout(&task, Duration::from_millis(200));
        wait_done(&mut actions, Duration::from_secs(2)).await;
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let mut actions = run(&task_with(Vec::new()));
        actions.cancel();
        actions.cancel();
        wait_done(&mut actions, Duration::from_secs(1)).await;
    }
}
