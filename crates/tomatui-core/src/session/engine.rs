//! Session state machine.
//!
//! The engine is input-driven: the caller feeds it ticks, key commands, and
//! confirm choices, and no transition ever blocks. Completed sessions are
//! recorded synchronously, then their post actions run in the background
//! (see [`crate::actions`]); the engine waits for those only on the way
//! out, in [`SessionState::WaitingForCommands`].

use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::actions::{self, PostActions};
use crate::storage::{Config, Database, SessionEndPolicy, Task, TaskType};

use super::summary::SessionSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Paused,
    /// The end-of-session prompt is on screen.
    ShowingConfirm,
    /// Quit requested while post actions are still running.
    WaitingForCommands,
    /// Terminal. The event loop must stop when this is reached.
    Quitting,
}

/// Drives timed work/break sessions.
///
/// Owns a value copy of the configuration, the current task, and the running
/// summary. The caller owns the clock: [`SessionEngine::tick`] advances
/// elapsed time by whatever interval the event loop uses.
pub struct SessionEngine {
    config: Config,
    store: Option<Database>,

    state: SessionState,
    task_type: TaskType,
    task: Task,
    elapsed: Duration,
    duration: Duration,
    is_short_session: bool,
    /// Breaks completed since the last long break, starting at 1.
    cycle_position: u32,
    confirm_shown_at: Option<Instant>,

    summary: SessionSummary,
    actions: Option<PostActions>,
}

impl SessionEngine {
    /// Create an engine running the given task type.
    ///
    /// `store` is `None` when the database could not be opened; sessions
    /// then live only in the in-memory summary, which is flagged so the
    /// final report can say so.
    pub fn new(config: Config, task_type: TaskType, store: Option<Database>) -> Self {
        let task = config.task(task_type).clone();
        let duration = task.duration;

        let mut summary = SessionSummary::default();
        if store.is_none() {
            summary.mark_store_unavailable();
        }

        Self {
            config,
            store,
            state: SessionState::Running,
            task_type,
            task,
            elapsed: Duration::ZERO,
            duration,
            is_short_session: false,
            cycle_position: 1,
            confirm_shown_at: None,
            summary,
            actions: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn title(&self) -> &str {
        &self.task.title
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed)
    }

    /// Elapsed time as a fraction of the duration, floored to two decimal
    /// places so the progress bar never shows 100% before the completion
    /// event actually fires.
    pub fn percent(&self) -> f64 {
        let duration_ms = self.duration.as_millis();
        if duration_ms == 0 {
            return 1.0;
        }
        let elapsed_ms = self.elapsed.as_millis() as f64;
        (elapsed_ms / duration_ms as f64 * 100.0).floor() / 100.0
    }

    pub fn is_short_session(&self) -> bool {
        self.is_short_session
    }

    pub fn cycle_position(&self) -> u32 {
        self.cycle_position
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// How long the confirm prompt has been waiting for an answer.
    pub fn confirm_idle(&self) -> Option<Duration> {
        self.confirm_shown_at.map(|shown| shown.elapsed())
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Advance the timer by one event-loop interval. Only a running session
    /// accumulates time; reaching the duration triggers the completion
    /// handler.
    pub fn tick(&mut self, interval: Duration) {
        if self.state != SessionState::Running {
            return;
        }

        self.elapsed += interval;
        if self.elapsed >= self.duration {
            self.complete();
        }
    }

    /// Stretch the current session by one minute.
    pub fn increase_duration(&mut self) {
        if matches!(self.state, SessionState::Running | SessionState::Paused) {
            self.duration += Duration::from_secs(60);
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            SessionState::Running => self.state = SessionState::Paused,
            SessionState::Paused => self.state = SessionState::Running,
            _ => {}
        }
    }

    /// Restart the current session from zero with its original duration.
    pub fn reset(&mut self) {
        if matches!(self.state, SessionState::Running | SessionState::Paused) {
            self.elapsed = Duration::ZERO;
            self.duration = self.task.duration;
        }
    }

    /// Record whatever ran so far and move on to the next session.
    pub fn skip(&mut self) {
        if !matches!(self.state, SessionState::Running | SessionState::Paused) {
            return;
        }
        self.record_session();
        self.cancel_actions();
        self.advance_session();
    }

    /// Quit. Which path this takes depends on the state: a live session is
    /// recorded first, an unanswered confirm prompt is abandoned, and a
    /// second quit while waiting for post actions force-kills them.
    pub fn quit(&mut self) {
        match self.state {
            SessionState::Running | SessionState::Paused => {
                self.record_session();
                self.quit_internal();
            }
            SessionState::ShowingConfirm | SessionState::WaitingForCommands => {
                self.quit_internal();
            }
            SessionState::Quitting => {}
        }
    }

    /// Confirm choice: keep going with the next session.
    pub fn confirm_continue(&mut self) {
        if self.state != SessionState::ShowingConfirm {
            return;
        }
        self.cancel_actions();
        self.advance_session();
    }

    /// Confirm choice: squeeze in a short continuation of the same task.
    pub fn confirm_short_session(&mut self) {
        if self.state != SessionState::ShowingConfirm {
            return;
        }
        self.cancel_actions();
        self.start_short_session();
    }

    /// Confirm choice: stop here.
    pub fn confirm_cancel(&mut self) {
        if self.state != SessionState::ShowingConfirm {
            return;
        }
        self.quit_internal();
    }

    /// The completion receiver for in-flight post actions, if any. The
    /// event loop takes it when the engine enters
    /// [`SessionState::WaitingForCommands`] and calls
    /// [`SessionEngine::actions_finished`] once it resolves.
    pub fn take_actions_done(&mut self) -> Option<oneshot::Receiver<()>> {
        self.actions.as_mut().and_then(PostActions::take_done)
    }

    /// Post actions settled while we were waiting on them; finish quitting.
    pub fn actions_finished(&mut self) {
        if self.state != SessionState::WaitingForCommands {
            return;
        }
        self.cancel_actions();
        self.state = SessionState::Quitting;
    }

    // ── Internal ─────────────────────────────────────────────────

    /// The timer reached its duration: record, fire post actions, then
    /// continue per the configured end-of-session policy.
    fn complete(&mut self) {
        debug!("session completed: {}", self.task.title);
        self.record_session();

        // settle anything left from the previous completion first
        self.cancel_actions();
        self.actions = Some(actions::run(&self.task));

        match self.config.on_session_end.clone() {
            SessionEndPolicy::Ask => {
                self.state = SessionState::ShowingConfirm;
                self.confirm_shown_at = Some(Instant::now());
            }
            SessionEndPolicy::Start => self.advance_session(),
            SessionEndPolicy::Quit => self.quit_internal(),
            SessionEndPolicy::Unknown(value) => {
                warn!("unknown on_session_end value {value:?}, defaulting to quit");
                self.quit_internal();
            }
        }
    }

    /// Swap to the opposite task, inserting the periodic long break.
    fn advance_session(&mut self) {
        if self.config.long_break.enabled {
            if self.task_type == TaskType::Break {
                self.cycle_position += 1;
            }

            if self.task_type == TaskType::Work
                && self.cycle_position == self.config.long_break.after
            {
                self.start_long_break();
                return;
            }

            if self.cycle_position > self.config.long_break.after {
                self.cycle_position = 1;
            }
        }

        let next = self.task_type.opposite();
        let task = self.config.task(next).clone();
        self.start_session(next, task, false);
    }

    fn start_long_break(&mut self) {
        let mut task = self.config.task(TaskType::Break).clone();
        task.duration = self.config.long_break.duration;
        task.title = format!("long {}", task.title);
        self.start_session(TaskType::Break, task, false);
    }

    fn start_short_session(&mut self) {
        let mut task = self.task.clone();
        task.duration = self.config.short_session;
        task.title = format!("short {}", self.config.task(self.task_type).title);
        self.start_session(self.task_type, task, true);
    }

    fn start_session(&mut self, task_type: TaskType, task: Task, short: bool) {
        self.task_type = task_type;
        self.task = task;
        self.is_short_session = short;
        self.elapsed = Duration::ZERO;
        self.duration = self.task.duration;
        self.confirm_shown_at = None;
        self.state = SessionState::Running;
    }

    /// Fold the finished session into the summary and, when a store is
    /// available, append a durable record. Sub-second sessions are noise
    /// and short sessions are extensions, so neither counts as a session.
    fn record_session(&mut self) {
        if self.elapsed < Duration::from_secs(1) {
            return;
        }

        if self.is_short_session {
            self.summary.add_duration(self.task_type, self.elapsed);
            return;
        }

        self.summary.add_session(self.task_type, self.elapsed);

        let Some(store) = &self.store else {
            return;
        };
        if let Err(err) = store.create_session(Utc::now(), self.elapsed, self.task_type) {
            warn!("failed to record session: {err}");
        }
    }

    fn quit_internal(&mut self) {
        if self.state == SessionState::WaitingForCommands {
            debug!("force quitting");
            self.cancel_actions();
            self.state = SessionState::Quitting;
            return;
        }

        if self.actions.is_some() {
            debug!("waiting for post actions before quitting");
            self.state = SessionState::WaitingForCommands;
            return;
        }

        self.state = SessionState::Quitting;
    }

    fn cancel_actions(&mut self) {
        if let Some(actions) = self.actions.take() {
            actions.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    const MINUTE: Duration = Duration::from_secs(60);

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.work.notification.enabled = false;
        config.break_task.notification.enabled = false;
        config
    }

    fn work_engine(config: Config) -> SessionEngine {
        SessionEngine::new(config, TaskType::Work, None)
    }

    /// Tick straight through the rest of the current session.
    fn finish(engine: &mut SessionEngine) {
        engine.tick(engine.remaining());
    }

    #[test]
    fn starts_running_the_requested_task() {
        let engine = work_engine(quiet_config());
        assert_eq!(engine.state(), SessionState::Running);
        assert_eq!(engine.task_type(), TaskType::Work);
        assert_eq!(engine.title(), "work");
        assert_eq!(engine.duration(), 25 * MINUTE);
        assert_eq!(engine.percent(), 0.0);
        assert!(engine.summary().store_unavailable());
    }

    #[test]
    fn pause_freezes_the_clock() {
        let mut engine = work_engine(quiet_config());
        engine.tick(Duration::from_secs(10));
        assert_eq!(engine.elapsed(), Duration::from_secs(10));

        engine.toggle_pause();
        assert_eq!(engine.state(), SessionState::Paused);
        engine.tick(Duration::from_secs(10));
        assert_eq!(engine.elapsed(), Duration::from_secs(10));

        engine.toggle_pause();
        assert_eq!(engine.state(), SessionState::Running);
        engine.tick(Duration::from_secs(5));
        assert_eq!(engine.elapsed(), Duration::from_secs(15));
    }

    #[test]
    fn increase_stretches_reset_restores() {
        let mut engine = work_engine(quiet_config());
        engine.increase_duration();
        engine.increase_duration();
        assert_eq!(engine.duration(), 27 * MINUTE);

        engine.tick(Duration::from_secs(30));
        engine.reset();
        assert_eq!(engine.elapsed(), Duration::ZERO);
        assert_eq!(engine.duration(), 25 * MINUTE);
    }

    #[test]
    fn percent_is_floored_to_two_decimals() {
        let mut config = quiet_config();
        config.work.duration = Duration::from_secs(3);
        let mut engine = work_engine(config);

        engine.tick(Duration::from_secs(2));
        // 2/3 = 0.666..; the floor keeps it just under the next percent
        assert_eq!(engine.percent(), 0.66);
    }

    #[test]
    fn skip_records_partial_time_and_advances() {
        let mut engine = work_engine(quiet_config());
        engine.tick(Duration::from_secs(30));
        engine.skip();

        assert_eq!(engine.state(), SessionState::Running);
        assert_eq!(engine.task_type(), TaskType::Break);
        assert_eq!(engine.elapsed(), Duration::ZERO);
        assert_eq!(engine.summary().sessions(TaskType::Work), 1);
        assert_eq!(engine.summary().time(TaskType::Work), Duration::from_secs(30));
    }

    #[test]
    fn sub_second_sessions_vanish() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tomatui.db");
        let store = Database::open(&path).unwrap();

        let mut engine = SessionEngine::new(quiet_config(), TaskType::Work, Some(store));
        engine.tick(Duration::from_millis(500));
        engine.skip();

        assert_eq!(engine.summary().sessions(TaskType::Work), 0);
        assert_eq!(engine.summary().time(TaskType::Work), Duration::ZERO);

        let reader = Database::open(&path).unwrap();
        assert_eq!(reader.all_time_stats().unwrap().sessions, 0);
    }

    #[tokio::test]
    async fn recorded_sessions_reach_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tomatui.db");
        let store = Database::open(&path).unwrap();

        let mut config = quiet_config();
        config.on_session_end = SessionEndPolicy::Start;
        let mut engine = SessionEngine::new(config, TaskType::Work, Some(store));
        finish(&mut engine);

        let reader = Database::open(&path).unwrap();
        let stats = reader.all_time_stats().unwrap();
        assert_eq!(stats.sessions, 1);
        assert_eq!(stats.work_time, 25 * MINUTE);
    }

    #[tokio::test]
    async fn ask_policy_prompts_then_continue_starts_break() {
        let mut engine = work_engine(quiet_config());
        finish(&mut engine);

        assert_eq!(engine.state(), SessionState::ShowingConfirm);
        assert!(engine.confirm_idle().is_some());
        assert_eq!(engine.summary().sessions(TaskType::Work), 1);

        // keys that only make sense mid-session are ignored here
        engine.increase_duration();
        engine.reset();
        engine.tick(Duration::from_secs(1));
        assert_eq!(engine.state(), SessionState::ShowingConfirm);

        engine.confirm_continue();
        assert_eq!(engine.state(), SessionState::Running);
        assert_eq!(engine.task_type(), TaskType::Break);
        assert_eq!(engine.elapsed(), Duration::ZERO);
        assert_eq!(engine.duration(), 5 * MINUTE);
        assert!(engine.confirm_idle().is_none());
    }

    #[tokio::test]
    async fn start_policy_advances_without_prompting() {
        let mut config = quiet_config();
        config.on_session_end = SessionEndPolicy::Start;
        let mut engine = work_engine(config);
        finish(&mut engine);

        assert_eq!(engine.state(), SessionState::Running);
        assert_eq!(engine.task_type(), TaskType::Break);
    }

    #[tokio::test]
    async fn unknown_policy_falls_back_to_quit() {
        let mut config = quiet_config();
        config.on_session_end = SessionEndPolicy::Unknown("later".to_string());
        let mut engine = work_engine(config);
        finish(&mut engine);

        // post actions were just launched, so quitting waits for them
        assert_eq!(engine.state(), SessionState::WaitingForCommands);
        let done = engine.take_actions_done().unwrap();
        timeout(Duration::from_secs(2), done).await.unwrap().unwrap();
        engine.actions_finished();
        assert_eq!(engine.state(), SessionState::Quitting);
    }

    #[tokio::test]
    async fn short_session_extends_without_counting() {
        let mut engine = work_engine(quiet_config());
        finish(&mut engine);
        engine.confirm_short_session();

        assert_eq!(engine.state(), SessionState::Running);
        assert!(engine.is_short_session());
        assert_eq!(engine.title(), "short work");
        assert_eq!(engine.task_type(), TaskType::Work);
        assert_eq!(engine.duration(), 2 * MINUTE);

        finish(&mut engine);
        assert_eq!(engine.summary().sessions(TaskType::Work), 1);
        assert_eq!(engine.summary().time(TaskType::Work), 27 * MINUTE);
    }

    #[tokio::test]
    async fn long_break_after_four_work_sessions() {
        let mut config = quiet_config();
        config.on_session_end = SessionEndPolicy::Start;
        config.long_break.duration = 7 * MINUTE;
        let mut engine = work_engine(config);

        for _ in 0..3 {
            finish(&mut engine); // work -> break
            assert_eq!(engine.title(), "break");
            finish(&mut engine); // break -> work
            assert_eq!(engine.task_type(), TaskType::Work);
        }

        finish(&mut engine); // 4th work session ends
        assert_eq!(engine.task_type(), TaskType::Break);
        assert_eq!(engine.title(), "long break");
        assert_eq!(engine.duration(), 7 * MINUTE);

        finish(&mut engine); // long break ends
        assert_eq!(engine.task_type(), TaskType::Work);
        assert_eq!(engine.cycle_position(), 1);
    }

    #[tokio::test]
    async fn disabled_long_break_just_alternates() {
        let mut config = quiet_config();
        config.on_session_end = SessionEndPolicy::Start;
        config.long_break.enabled = false;
        let mut engine = work_engine(config);

        for _ in 0..8 {
            finish(&mut engine);
            assert_ne!(engine.title(), "long break");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn quit_waits_for_post_actions() {
        let mut config = quiet_config();
        config.work.then = vec![vec![
            "sh".to_string(),
            "-c".to_string(),
            "sleep 0.2".to_string(),
        ]];
        let mut engine = work_engine(config);
        finish(&mut engine);
        assert_eq!(engine.state(), SessionState::ShowingConfirm);

        engine.confirm_cancel();
        assert_eq!(engine.state(), SessionState::WaitingForCommands);

        let done = engine.take_actions_done().unwrap();
        timeout(Duration::from_secs(3), done).await.unwrap().unwrap();
        engine.actions_finished();
        assert_eq!(engine.state(), SessionState::Quitting);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn second_quit_kills_a_stuck_command() {
        let mut config = quiet_config();
        config.work.then = vec![vec![
            "sh".to_string(),
            "-c".to_string(),
            "sleep 30".to_string(),
        ]];
        let mut engine = work_engine(config);
        finish(&mut engine);

        engine.quit();
        assert_eq!(engine.state(), SessionState::WaitingForCommands);
        let done = engine.take_actions_done().unwrap();

        engine.quit();
        assert_eq!(engine.state(), SessionState::Quitting);

        // the force quit cancelled the command; it settles long before the
        // sleep would
        timeout(Duration::from_secs(2), done).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn quit_policy_waits_then_quits() {
        let mut config = quiet_config();
        config.on_session_end = SessionEndPolicy::Quit;
        let mut engine = work_engine(config);
        finish(&mut engine);

        assert_eq!(engine.state(), SessionState::WaitingForCommands);
        let done = engine.take_actions_done().unwrap();
        timeout(Duration::from_secs(2), done).await.unwrap().unwrap();
        engine.actions_finished();
        assert_eq!(engine.state(), SessionState::Quitting);
    }

    #[test]
    fn quit_mid_session_records_it() {
        let mut engine = work_engine(quiet_config());
        engine.tick(Duration::from_secs(90));
        engine.quit();

        assert_eq!(engine.state(), SessionState::Quitting);
        assert_eq!(engine.summary().sessions(TaskType::Work), 1);
        assert_eq!(engine.summary().time(TaskType::Work), Duration::from_secs(90));
    }
}
