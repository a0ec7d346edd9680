//! Interactive statistics view for the `stats` command.
//!
//! Everything is read from the store once, before the terminal switches
//! modes; the view itself only toggles between the weekly chart and the
//! monthly heat strip.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Paragraph};
use ratatui::Frame;
use tokio::sync::{mpsc, oneshot};

use tomatui_core::duration;
use tomatui_core::error::DatabaseError;
use tomatui_core::stats::streak;
use tomatui_core::storage::{AllTimeStats, DailyStat, Database};
use tomatui_core::Streak;

use super::event::{EventHandler, TuiEvent};
use super::terminal::{self, Tui};
use super::ui;

const CHART_HEIGHT: u16 = 12;
const BAR_WIDTH: u16 = 5;
const BAR_GAP: u16 = 2;
const RATIO_WIDTH: usize = 40;

/// Everything the view renders, loaded up front.
pub struct StatsReport {
    pub all_time: AllTimeStats,
    pub weekly: Vec<DailyStat>,
    pub monthly: Vec<DailyStat>,
    pub streak: Streak,
}

impl StatsReport {
    /// # Errors
    /// Returns an error if any of the statistics queries fail.
    pub fn load(db: &Database, today: NaiveDate) -> Result<Self, DatabaseError> {
        Ok(Self {
            all_time: db.all_time_stats()?,
            weekly: db.weekly_stats(today)?,
            monthly: db.monthly_stats(today)?,
            streak: streak::from_database(db, today)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Range {
    Weekly,
    Monthly,
}

/// Show the report until the user quits.
///
/// # Errors
/// Returns an error if the terminal cannot be set up or drawn to.
pub async fn run(report: StatsReport) -> io::Result<()> {
    terminal::install_panic_hook();
    let mut tui = Tui::new(true)?;

    let (event_tx, mut event_rx) = mpsc::channel(64);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(EventHandler::new(event_tx, shutdown_rx, Duration::from_secs(1)).run());

    let mut range = Range::Weekly;

    loop {
        tui.draw(|frame| draw_stats(frame, &report, range))?;

        let Some(event) = event_rx.recv().await else {
            break;
        };
        let TuiEvent::Key(key) = event else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
            KeyCode::Char('w') => range = Range::Weekly,
            KeyCode::Char('m') => range = Range::Monthly,
            _ => {}
        }
    }

    let _ = shutdown_tx.send(());
    tui.restore()?;
    Ok(())
}

fn draw_stats(frame: &mut Frame, report: &StatsReport, range: Range) {
    let chunks = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1), // title
        Constraint::Length(1),
        Constraint::Length(4), // all-time block
        Constraint::Length(1),
        Constraint::Length(1), // streak
        Constraint::Length(1),
        Constraint::Length(CHART_HEIGHT),
        Constraint::Length(1),
        Constraint::Length(3), // ratio bar
        Constraint::Length(1),
        Constraint::Length(1), // help
        Constraint::Min(0),
    ])
    .split(frame.area());

    let title = Paragraph::new(Line::styled(
        "Pomodoro statistics",
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[1]);

    draw_all_time(frame, chunks[3], &report.all_time);

    let streak = Paragraph::new(format!(
        "streak {}d · best {}d",
        report.streak.current, report.streak.best,
    ))
    .alignment(Alignment::Center);
    frame.render_widget(streak, chunks[5]);

    match range {
        Range::Weekly => draw_weekly(frame, chunks[7], &report.weekly),
        Range::Monthly => draw_monthly(frame, chunks[7], &report.monthly),
    }

    draw_ratio(frame, chunks[9], &report.all_time);

    let help = Paragraph::new(Line::styled(
        "w weekly · m monthly · q quit",
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(help, chunks[11]);
}

fn draw_all_time(frame: &mut Frame, area: Rect, all_time: &AllTimeStats) {
    let lines = vec![
        Line::from("All-time stats:"),
        Line::from(format!("  sessions: {}", all_time.sessions)),
        Line::from(format!("  work:     {}", duration::format(all_time.work_time))),
        Line::from(format!("  break:    {}", duration::format(all_time.break_time))),
    ];

    let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
    let block = ui::centered(area, width, area.height);
    frame.render_widget(Paragraph::new(lines), block);
}

fn draw_weekly(frame: &mut Frame, area: Rect, weekly: &[DailyStat]) {
    let bars: Vec<Bar> = weekly
        .iter()
        .map(|stat| {
            let value = stat.work_time.as_secs();
            let text = if value == 0 {
                String::new()
            } else {
                duration::format_compact(stat.work_time)
            };
            Bar::default()
                .value(value)
                .text_value(text)
                .label(Line::from(stat.day.format("%a").to_string()))
        })
        .collect();

    let max = weekly
        .iter()
        .map(|stat| stat.work_time.as_secs())
        .max()
        .unwrap_or(0);

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(BAR_WIDTH)
        .bar_gap(BAR_GAP)
        .bar_style(Style::default().fg(Color::Red))
        .value_style(Style::default().fg(Color::White).bg(Color::Red))
        .label_style(Style::default().fg(Color::DarkGray))
        .max(max.max(1));

    let width = weekly.len() as u16 * BAR_WIDTH + (weekly.len() as u16).saturating_sub(1) * BAR_GAP;
    frame.render_widget(chart, ui::centered(area, width, area.height));
}

fn draw_monthly(frame: &mut Frame, area: Rect, monthly: &[DailyStat]) {
    let cells: Vec<Span> = monthly
        .iter()
        .map(|stat| Span::styled("▇ ", Style::default().fg(heat_color(stat.work_time))))
        .collect();

    let range_label = match (monthly.first(), monthly.last()) {
        (Some(first), Some(last)) => format!(
            "{} – {}",
            first.day.format("%b %d"),
            last.day.format("%b %d"),
        ),
        _ => String::new(),
    };

    let legend = Line::from(vec![
        Span::styled("less ", Style::default().fg(Color::DarkGray)),
        Span::styled("▇ ", Style::default().fg(HEAT_COLORS[0])),
        Span::styled("▇ ", Style::default().fg(HEAT_COLORS[1])),
        Span::styled("▇ ", Style::default().fg(HEAT_COLORS[2])),
        Span::styled("▇ ", Style::default().fg(HEAT_COLORS[3])),
        Span::styled("▇ ", Style::default().fg(HEAT_COLORS[4])),
        Span::styled("more", Style::default().fg(Color::DarkGray)),
    ]);

    let lines = vec![
        Line::from(cells),
        Line::from(""),
        Line::styled(range_label, Style::default().fg(Color::DarkGray)),
        Line::from(""),
        legend,
    ];

    let strip = Paragraph::new(lines).alignment(Alignment::Center);
    let height = 5.min(area.height);
    frame.render_widget(strip, ui::centered(area, area.width, height));
}

const HEAT_COLORS: [Color; 5] = [
    Color::Rgb(0x16, 0x1b, 0x22),
    Color::Rgb(0x0e, 0x44, 0x29),
    Color::Rgb(0x00, 0x6d, 0x32),
    Color::Rgb(0x26, 0xa6, 0x41),
    Color::Rgb(0x39, 0xd3, 0x53),
];

fn heat_color(work_time: Duration) -> Color {
    if work_time < Duration::from_secs(1) {
        HEAT_COLORS[0]
    } else if work_time <= Duration::from_secs(30 * 60) {
        HEAT_COLORS[1]
    } else if work_time <= Duration::from_secs(60 * 60) {
        HEAT_COLORS[2]
    } else if work_time <= Duration::from_secs(2 * 60 * 60) {
        HEAT_COLORS[3]
    } else {
        HEAT_COLORS[4]
    }
}

fn draw_ratio(frame: &mut Frame, area: Rect, all_time: &AllTimeStats) {
    let total = all_time.work_time + all_time.break_time;
    if total.is_zero() {
        return;
    }

    let ratio = all_time.work_time.as_secs_f64() / total.as_secs_f64();
    let work_pct = (ratio * 100.0).round() as u32;
    let break_pct = 100 - work_pct.min(100);

    let filled = ((RATIO_WIDTH as f64) * ratio) as usize;
    let filled = filled.min(RATIO_WIDTH);

    let work_label = duration::format(all_time.work_time);
    let break_label = duration::format(all_time.break_time);

    let lines = vec![
        Line::from(spread(&work_label, &break_label)),
        Line::from(vec![
            Span::styled("█".repeat(filled), Style::default().fg(Color::Red)),
            Span::raw("░".repeat(RATIO_WIDTH - filled)),
        ]),
        Line::styled(
            spread(&format!("{work_pct}%"), &format!("{break_pct}%")),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let bar = ui::centered(area, RATIO_WIDTH as u16, 3);
    frame.render_widget(Paragraph::new(lines), bar);
}

/// Left and right labels padded apart to the ratio bar width.
fn spread(left: &str, right: &str) -> String {
    let padding = RATIO_WIDTH
        .saturating_sub(left.chars().count())
        .saturating_sub(right.chars().count());
    format!("{left}{}{right}", " ".repeat(padding))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_bands_follow_work_time() {
        assert_eq!(heat_color(Duration::ZERO), HEAT_COLORS[0]);
        assert_eq!(heat_color(Duration::from_secs(10 * 60)), HEAT_COLORS[1]);
        assert_eq!(heat_color(Duration::from_secs(45 * 60)), HEAT_COLORS[2]);
        assert_eq!(heat_color(Duration::from_secs(90 * 60)), HEAT_COLORS[3]);
        assert_eq!(heat_color(Duration::from_secs(5 * 60 * 60)), HEAT_COLORS[4]);
    }

    #[test]
    fn spread_fills_the_full_width() {
        let line = spread("1h", "30m");
        assert_eq!(line.chars().count(), RATIO_WIDTH);
        assert!(line.starts_with("1h"));
        assert!(line.ends_with("30m"));
    }

    #[test]
    fn report_loads_from_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("stats.db")).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let report = StatsReport::load(&db, today).unwrap();

        assert_eq!(report.all_time.sessions, 0);
        assert_eq!(report.weekly.len(), 7);
        assert_eq!(report.monthly.len(), 30);
        assert_eq!(report.streak, Streak::default());
    }
}
