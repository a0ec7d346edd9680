//! SQLite-based session storage and statistics.
//!
//! Completed sessions are appended to a single `sessions` table and never
//! updated; statistics are computed with aggregate queries at read time.
//! Durations are stored as integer nanoseconds, timestamps as RFC 3339 text,
//! so the file stays portable across tools that read it.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rusqlite::{params, Connection};

use crate::error::DatabaseError;

use super::{state_dir, TaskType};

const DATABASE_FILE: &str = "tomatui.db";

/// Lifetime totals across every recorded session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllTimeStats {
    pub sessions: i64,
    pub work_time: Duration,
    pub break_time: Duration,
}

/// Total work time recorded on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyStat {
    pub day: NaiveDate,
    pub work_time: Duration,
}

/// SQLite database for completed sessions.
///
/// Holds a single connection; the application never needs more than one.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.local/state/tomatui/tomatui.db`.
    ///
    /// Creates the state directory, the database file, and the schema if
    /// they don't exist.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened or migrated.
    pub fn open_default() -> Result<Self, DatabaseError> {
        let dir = state_dir().map_err(DatabaseError::StateDir)?;
        Self::open(&dir.join(DATABASE_FILE))
    }

    /// Open the database at `path`, creating the schema if needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|err| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source: err,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|err| DatabaseError::OpenFailed {
            path: ":memory:".into(),
            source: err,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS sessions (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    type       TEXT NOT NULL,
                    duration   INTEGER NOT NULL,
                    started_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_sessions_started_at ON sessions(started_at);",
            )
            .map_err(|err| DatabaseError::MigrationFailed(err.to_string()))
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Record a completed session.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn create_session(
        &self,
        started_at: DateTime<Utc>,
        duration: Duration,
        task_type: TaskType,
    ) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO sessions (type, duration, started_at) VALUES (?1, ?2, ?3)",
            params![
                task_type.session_type(),
                duration.as_nanos() as i64,
                started_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Lifetime session count and accumulated work/break time.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn all_time_stats(&self) -> Result<AllTimeStats, DatabaseError> {
        let (sessions, work_nanos, break_nanos) = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(duration * (type = 'work')), 0),
                    COALESCE(SUM(duration * (type = 'break')), 0)
             FROM sessions",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        )?;
        Ok(AllTimeStats {
            sessions,
            work_time: nanos_to_duration(work_nanos),
            break_time: nanos_to_duration(break_nanos),
        })
    }

    /// Daily work totals for the 7 days ending at `today`, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn weekly_stats(&self, today: NaiveDate) -> Result<Vec<DailyStat>, DatabaseError> {
        self.daily_work(today - Days::new(6), today)
    }

    /// Daily work totals for the 30 days ending at `today`, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn monthly_stats(&self, today: NaiveDate) -> Result<Vec<DailyStat>, DatabaseError> {
        self.daily_work(today - Days::new(29), today)
    }

    /// Distinct calendar days with at least one work session, newest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn work_session_dates(&self) -> Result<Vec<NaiveDate>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT date(started_at) AS day
             FROM sessions
             WHERE type = 'work'
             ORDER BY day DESC",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut dates = Vec::new();
        for row in rows {
            dates.push(parse_day(&row?)?);
        }
        Ok(dates)
    }

    // ── Internal ─────────────────────────────────────────────────

    /// One entry per day in `start..=end`; days without work sessions are
    /// zero-filled so charts always get a full series.
    fn daily_work(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyStat>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT date(started_at) AS day,
                    COALESCE(SUM(duration * (type = 'work')), 0)
             FROM sessions
             WHERE date(started_at) BETWEEN ?1 AND ?2
             GROUP BY day
             ORDER BY day",
        )?;
        let rows = stmt.query_map(
            params![
                start.format("%Y-%m-%d").to_string(),
                end.format("%Y-%m-%d").to_string(),
            ],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
        )?;

        let mut by_day = HashMap::new();
        for row in rows {
            let (day, nanos) = row?;
            by_day.insert(parse_day(&day)?, nanos);
        }

        let mut stats = Vec::new();
        let mut day = start;
        while day <= end {
            let nanos = by_day.get(&day).copied().unwrap_or(0);
            stats.push(DailyStat {
                day,
                work_time: nanos_to_duration(nanos),
            });
            day = day + Days::new(1);
        }
        Ok(stats)
    }
}

fn parse_day(text: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|err| DatabaseError::QueryFailed(format!("bad day {text:?}: {err}")))
}

fn nanos_to_duration(nanos: i64) -> Duration {
    Duration::from_nanos(nanos.max(0) as u64)
}
