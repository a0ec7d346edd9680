//! Session screen rendering.
//!
//! One centered column: the clock (block digits or a plain line), the task
//! title with its status indicators, a progress bar, and the key help.

use std::time::Duration;

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Gauge, Paragraph};
use ratatui::Frame;

use tomatui_core::duration;
use tomatui_core::storage::TaskType;
use tomatui_core::SessionState;

use super::app::App;
use super::digits;

const MAX_BAR_WIDTH: u16 = 80;
const BAR_MARGIN: u16 = 8;

pub fn draw(frame: &mut Frame, app: &App) {
    match app.engine().state() {
        SessionState::Running | SessionState::Paused => draw_session(frame, app),
        SessionState::ShowingConfirm => draw_confirm(frame, app),
        SessionState::WaitingForCommands => draw_waiting(frame),
        SessionState::Quitting => {}
    }
}

/// Center a `width` x `height` box inside `area`, clamped to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_session(frame: &mut Frame, app: &App) {
    let engine = app.engine();
    let config = engine.config();
    let paused = engine.state() == SessionState::Paused;
    let area = frame.area();

    let clock = duration::format_clock(engine.remaining());

    let mut content: Vec<Line> = Vec::new();
    if config.timer_art.enabled {
        let style = if paused {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(app.timer_color())
        };
        for row in digits::render(&clock) {
            content.push(Line::styled(row, style));
        }
        content.push(Line::from(""));
        content.push(Line::from(format!("{}{}", engine.title(), indicators(app, paused))));
    } else {
        content.push(Line::from(format!(
            "{} — {}{}",
            engine.title(),
            clock,
            indicators(app, paused),
        )));
    }

    let chunks = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(content.len() as u16),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .split(area);

    let body = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(body, chunks[1]);

    let bar_width = area.width.saturating_sub(BAR_MARGIN).min(MAX_BAR_WIDTH);
    let bar_area = centered(chunks[3], bar_width, 1);
    let bar = Gauge::default()
        .gauge_style(Style::default().fg(app.timer_color()))
        .use_unicode(true)
        .ratio(engine.percent());
    frame.render_widget(bar, bar_area);

    let help = Paragraph::new(Line::styled(
        app.help_line().to_string(),
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(help, chunks[5]);
}

/// Cycle counter and pause marker appended to the title line.
fn indicators(app: &App, paused: bool) -> String {
    let config = app.engine().config();
    let mut text = String::new();

    if config.long_break.enabled {
        text.push_str(&format!(
            " · {}/{}",
            app.engine().cycle_position(),
            config.long_break.after,
        ));
    }
    if paused {
        text.push_str(" (paused)");
    }

    text
}

fn draw_confirm(frame: &mut Frame, app: &App) {
    let engine = app.engine();
    let config = engine.config();

    let next = engine.task_type().opposite();
    let mut title = config.task(next).title.clone();
    if next == TaskType::Break
        && config.long_break.enabled
        && engine.cycle_position() == config.long_break.after
    {
        title = format!("long {title}");
    }
    let prompt = format!("start {title}?");

    let idle = engine.confirm_idle().unwrap_or_default();
    let idle_text = (idle >= Duration::from_secs(1))
        .then(|| format!("idle {}", duration::format(Duration::from_secs(idle.as_secs()))));

    app.confirm().render(frame, &prompt, idle_text.as_deref());
}

fn draw_waiting(frame: &mut Frame) {
    let lines = vec![
        Line::from("Waiting for post commands to complete..."),
        Line::from(""),
        Line::styled("q quit", Style::default().fg(Color::DarkGray)),
    ];

    let chunks = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(lines.len() as u16),
        Constraint::Min(0),
    ])
    .split(frame.area());

    let message = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(message, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_box_sits_in_the_middle() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered(area, 20, 10);
        assert_eq!(rect, Rect::new(40, 15, 20, 10));
    }

    #[test]
    fn centered_box_is_clamped_to_the_area() {
        let area = Rect::new(0, 0, 10, 5);
        let rect = centered(area, 100, 50);
        assert_eq!(rect, area);
    }
}
