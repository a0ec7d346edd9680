//! The session screen: wires terminal events into the engine and renders
//! after every event.

use std::io;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::style::Color;
use tokio::sync::{mpsc, oneshot};

use tomatui_core::storage::{Config, Database, SessionEndPolicy, TaskType};
use tomatui_core::{SessionEngine, SessionState, SessionSummary};

use super::confirm::{ConfirmChoice, ConfirmDialog};
use super::event::{EventHandler, TuiEvent};
use super::terminal::{self, Tui};
use super::ui;

/// The engine counts time in whole seconds, same as the displayed clock.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub struct App {
    engine: SessionEngine,
    confirm: ConfirmDialog,
    timer_color: Color,
    help_line: String,
}

impl App {
    fn new(config: Config, task_type: TaskType, store: Option<Database>) -> Self {
        let timer_color = config.timer_art.color.parse().unwrap_or(Color::Red);
        let help_line = build_help_line(&config.on_session_end);

        Self {
            engine: SessionEngine::new(config, task_type, store),
            confirm: ConfirmDialog::default(),
            timer_color,
            help_line,
        }
    }

    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    pub fn confirm(&self) -> &ConfirmDialog {
        &self.confirm
    }

    pub fn timer_color(&self) -> Color {
        self.timer_color
    }

    pub fn help_line(&self) -> &str {
        &self.help_line
    }

    fn handle_event(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Tick => self.engine.tick(TICK_INTERVAL),
            TuiEvent::Key(key) => self.handle_key(key),
            TuiEvent::Resize => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.engine.state() {
            SessionState::Running | SessionState::Paused => self.handle_session_key(key),
            SessionState::ShowingConfirm => self.handle_confirm_key(key),
            SessionState::WaitingForCommands => {
                if is_quit(key) {
                    self.engine.quit();
                }
            }
            SessionState::Quitting => {}
        }
    }

    fn handle_session_key(&mut self, key: KeyEvent) {
        if is_quit(key) {
            self.engine.quit();
            return;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.engine.increase_duration(),
            KeyCode::Char(' ') => self.engine.toggle_pause(),
            KeyCode::Left | KeyCode::Char('h') => self.engine.reset(),
            KeyCode::Char('s') => self.engine.skip(),
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let Some(choice) = self.confirm.handle_key(key) else {
            return;
        };

        match choice {
            ConfirmChoice::Continue => self.engine.confirm_continue(),
            ConfirmChoice::ShortSession => self.engine.confirm_short_session(),
            ConfirmChoice::Cancel => self.engine.confirm_cancel(),
        }
        self.confirm.reset();
    }
}

fn is_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Char('q')
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

fn build_help_line(policy: &SessionEndPolicy) -> String {
    let mut parts = vec!["↑ +1 minute", "space pause/resume", "← reset"];
    if matches!(policy, SessionEndPolicy::Ask) {
        parts.push("s skip");
    }
    parts.push("q quit");
    parts.join(" · ")
}

/// Run one session screen to completion and return the final summary.
///
/// # Errors
/// Returns an error if the terminal cannot be set up or drawn to.
pub async fn run_session(
    config: Config,
    task_type: TaskType,
    store: Option<Database>,
) -> io::Result<SessionSummary> {
    terminal::install_panic_hook();
    let mut tui = Tui::new(config.alt_screen)?;

    let (event_tx, mut event_rx) = mpsc::channel(64);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(EventHandler::new(event_tx, shutdown_rx, TICK_INTERVAL).run());

    let mut app = App::new(config, task_type, store);
    let mut actions_done: Option<oneshot::Receiver<()>> = None;

    while app.engine.state() != SessionState::Quitting {
        tui.draw(|frame| ui::draw(frame, &app))?;

        let event = match actions_done.as_mut() {
            Some(done) => tokio::select! {
                _ = done => {
                    app.engine.actions_finished();
                    actions_done = None;
                    continue;
                }
                event = event_rx.recv() => event,
            },
            None => event_rx.recv().await,
        };

        let Some(event) = event else {
            break;
        };
        app.handle_event(event);

        if app.engine.state() == SessionState::WaitingForCommands && actions_done.is_none() {
            actions_done = app.engine.take_actions_done();
            if actions_done.is_none() {
                app.engine.actions_finished();
            }
        }
    }

    let _ = shutdown_tx.send(());
    tui.restore()?;

    Ok(*app.engine.summary())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_policy(policy: SessionEndPolicy) -> App {
        let mut config = Config::default();
        config.on_session_end = policy;
        config.work.notification.enabled = false;
        config.break_task.notification.enabled = false;
        App::new(config, TaskType::Work, None)
    }

    #[test]
    fn space_toggles_pause() {
        let mut app = app_with_policy(SessionEndPolicy::Ask);

        app.handle_event(TuiEvent::Key(press(KeyCode::Char(' '))));
        assert_eq!(app.engine.state(), SessionState::Paused);

        app.handle_event(TuiEvent::Key(press(KeyCode::Char(' '))));
        assert_eq!(app.engine.state(), SessionState::Running);
    }

    #[test]
    fn ticks_advance_the_clock() {
        let mut app = app_with_policy(SessionEndPolicy::Ask);

        app.handle_event(TuiEvent::Tick);
        app.handle_event(TuiEvent::Tick);
        assert_eq!(app.engine.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn q_quits_a_running_session() {
        let mut app = app_with_policy(SessionEndPolicy::Ask);

        app.handle_event(TuiEvent::Key(press(KeyCode::Char('q'))));
        assert_eq!(app.engine.state(), SessionState::Quitting);
    }

    #[tokio::test]
    async fn confirm_keys_drive_the_prompt() {
        let mut app = app_with_policy(SessionEndPolicy::Ask);

        let remaining = app.engine.remaining();
        app.engine.tick(remaining);
        assert_eq!(app.engine.state(), SessionState::ShowingConfirm);

        // tab moves the highlight but does not answer
        app.handle_event(TuiEvent::Key(press(KeyCode::Tab)));
        assert_eq!(app.engine.state(), SessionState::ShowingConfirm);

        app.handle_event(TuiEvent::Key(press(KeyCode::Char('y'))));
        assert_eq!(app.engine.state(), SessionState::Running);
        assert_eq!(app.engine.task_type(), TaskType::Break);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = app_with_policy(SessionEndPolicy::Ask);

        let mut key = press(KeyCode::Char(' '));
        key.kind = KeyEventKind::Release;
        app.handle_event(TuiEvent::Key(key));
        assert_eq!(app.engine.state(), SessionState::Running);
    }

    #[test]
    fn help_line_mentions_skip_only_when_asking() {
        assert!(build_help_line(&SessionEndPolicy::Ask).contains("s skip"));
        assert!(!build_help_line(&SessionEndPolicy::Start).contains("s skip"));
    }
}
