//! In-memory summary of everything finished during the current run.
//!
//! The summary exists independently of the statistics store: it is built up
//! as sessions complete and printed when the program exits, even when the
//! database could not be opened.

use std::time::Duration;

use crate::storage::TaskType;

/// Per-type session counts and accumulated time for one program run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    work_sessions: u32,
    break_sessions: u32,
    work_time: Duration,
    break_time: Duration,
    store_unavailable: bool,
}

impl SessionSummary {
    /// Count a completed session and add its elapsed time.
    pub fn add_session(&mut self, task_type: TaskType, elapsed: Duration) {
        match task_type {
            TaskType::Work => {
                self.work_sessions += 1;
                self.work_time += elapsed;
            }
            TaskType::Break => {
                self.break_sessions += 1;
                self.break_time += elapsed;
            }
        }
    }

    /// Add elapsed time without counting a session. Short continuation
    /// sessions extend totals but are not new sessions.
    pub fn add_duration(&mut self, task_type: TaskType, elapsed: Duration) {
        match task_type {
            TaskType::Work => self.work_time += elapsed,
            TaskType::Break => self.break_time += elapsed,
        }
    }

    /// Flag that sessions from this run were not durably recorded.
    pub fn mark_store_unavailable(&mut self) {
        self.store_unavailable = true;
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn sessions(&self, task_type: TaskType) -> u32 {
        match task_type {
            TaskType::Work => self.work_sessions,
            TaskType::Break => self.break_sessions,
        }
    }

    pub fn time(&self, task_type: TaskType) -> Duration {
        match task_type {
            TaskType::Work => self.work_time,
            TaskType::Break => self.break_time,
        }
    }

    pub fn total_time(&self) -> Duration {
        self.work_time + self.break_time
    }

    /// Fraction of total time spent on work, 0.0 when nothing was recorded.
    pub fn work_ratio(&self) -> f64 {
        let total = self.total_time();
        if total.is_zero() {
            return 0.0;
        }
        self.work_time.as_secs_f64() / total.as_secs_f64()
    }

    /// True when no time was accumulated at all; callers skip printing.
    pub fn is_empty(&self) -> bool {
        self.work_sessions == 0 && self.break_sessions == 0 && self.total_time().is_zero()
    }

    pub fn store_unavailable(&self) -> bool {
        self.store_unavailable
    }
}
