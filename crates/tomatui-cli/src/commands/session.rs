//! Session launchers: load config, apply CLI duration overrides, run the
//! TUI, print the summary once the terminal is back to normal.

use crossterm::style::Stylize;

use tomatui_core::duration;
use tomatui_core::storage::{Config, Database, TaskType};
use tomatui_core::SessionSummary;

use crate::tui;

/// Start a work session (bare `tomatui`, with optional positional
/// overrides for both durations).
pub fn start(
    work: Option<String>,
    break_duration: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    launch(TaskType::Work, work.as_deref(), break_duration.as_deref())
}

/// `tomatui work [DURATION]`.
pub fn work(duration: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    launch(TaskType::Work, duration.as_deref(), None)
}

/// `tomatui break [DURATION]`.
pub fn break_session(duration: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    launch(TaskType::Break, None, duration.as_deref())
}

fn launch(
    task_type: TaskType,
    work_duration: Option<&str>,
    break_duration: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();

    // A bad duration argument is fatal; a broken config file already fell
    // back to defaults with a warning inside load_or_default.
    if let Some(text) = work_duration {
        config.work.duration = duration::parse(text)?;
    }
    if let Some(text) = break_duration {
        config.break_task.duration = duration::parse(text)?;
    }

    let store = match Database::open_default() {
        Ok(db) => Some(db),
        Err(err) => {
            tracing::warn!("sessions will not be saved: {err}");
            None
        }
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let summary = runtime.block_on(tui::run_session(config, task_type, store))?;

    print_summary(&summary);
    Ok(())
}

// ── Exit summary ─────────────────────────────────────────────────

fn print_summary(summary: &SessionSummary) {
    if summary.is_empty() {
        return;
    }

    let work = summary.time(TaskType::Work);
    let breaks = summary.time(TaskType::Break);

    println!("{}", "Session Summary:".dark_green());

    if !work.is_zero() {
        println!(
            " Work : {} ({} {})",
            duration::format(work),
            summary.sessions(TaskType::Work),
            count_noun(summary.sessions(TaskType::Work)),
        );
    }

    if !breaks.is_zero() {
        println!(
            " Break: {} ({} {})",
            duration::format(breaks),
            summary.sessions(TaskType::Break),
            count_noun(summary.sessions(TaskType::Break)),
        );
    }

    if !work.is_zero() && !breaks.is_zero() {
        println!(" Total: {}", duration::format(summary.total_time()));
    }

    if !work.is_zero() {
        print_ratio_bar(summary.work_ratio());
    }

    if summary.store_unavailable() {
        println!("\n {}", "Not saved (database unavailable)".red());
    }
}

fn count_noun(count: u32) -> &'static str {
    if count == 1 {
        "session"
    } else {
        "sessions"
    }
}

fn print_ratio_bar(work_ratio: f64) {
    const WIDTH: usize = 30;

    let filled = (work_ratio * WIDTH as f64) as usize;
    let filled = filled.min(WIDTH);

    println!(
        "\n [{}{}] {:.0}% work",
        "█".repeat(filled).red(),
        "░".repeat(WIDTH - filled),
        work_ratio * 100.0,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn empty_summary_prints_nothing() {
        let summary = SessionSummary::default();
        assert!(summary.is_empty());
    }

    #[test]
    fn count_noun_matches_count() {
        assert_eq!(count_noun(1), "session");
        assert_eq!(count_noun(0), "sessions");
        assert_eq!(count_noun(3), "sessions");
    }

    #[test]
    fn summary_totals_cover_both_task_types() {
        let mut summary = SessionSummary::default();
        summary.add_session(TaskType::Work, Duration::from_secs(1500));
        summary.add_session(TaskType::Break, Duration::from_secs(300));

        assert_eq!(summary.total_time(), Duration::from_secs(1800));
        assert!((summary.work_ratio() - 1500.0 / 1800.0).abs() < 1e-9);
    }
}
