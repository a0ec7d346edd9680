//! Consecutive-day work streaks.
//!
//! A streak is a run of calendar days that each contain at least one work
//! session. The calculation is a pure function over the distinct session
//! dates sorted newest first, exactly as [`Database::work_session_dates`]
//! returns them.

use chrono::{Days, NaiveDate};

use crate::error::DatabaseError;
use crate::storage::Database;

/// Current and best consecutive-day runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Streak {
    /// Days in the streak that is still alive, 0 when it is broken.
    pub current: u32,
    /// Longest run ever observed.
    pub best: u32,
}

/// Compute streaks from distinct work-session dates sorted newest first.
///
/// The current streak is alive only while the newest date is `today` or
/// yesterday; a single gap breaks it permanently, after which older
/// consecutive runs count toward `best` alone.
pub fn calculate(dates: &[NaiveDate], today: NaiveDate) -> Streak {
    let Some((&first, rest)) = dates.split_first() else {
        return Streak::default();
    };

    let yesterday = today - Days::new(1);
    let mut streak = Streak::default();
    let mut current_broken = false;
    let mut run = 1u32;

    if first == today || first == yesterday {
        streak.current = 1;
        streak.best = 1;
    } else {
        current_broken = true;
    }

    let mut prev = first;
    for &day in rest {
        if prev - Days::new(1) == day {
            run += 1;
            if run > streak.best {
                streak.best = run;
            }
            if !current_broken {
                streak.current += 1;
            }
        } else {
            current_broken = true;
            run = 1;
        }
        prev = day;
    }

    streak
}

/// Compute streaks from the sessions recorded in `db`.
///
/// # Errors
/// Returns an error if the date query fails.
pub fn from_database(db: &Database, today: NaiveDate) -> Result<Streak, DatabaseError> {
    Ok(calculate(&db.work_session_dates()?, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    const TODAY: fn() -> NaiveDate = || date(2024, 5, 10);

    #[test]
    fn no_dates_no_streak() {
        assert_eq!(calculate(&[], TODAY()), Streak::default());
    }

    #[test]
    fn single_session_today() {
        let streak = calculate(&[TODAY()], TODAY());
        assert_eq!(streak, Streak { current: 1, best: 1 });
    }

    #[test]
    fn yesterday_keeps_the_streak_alive() {
        let streak = calculate(&[date(2024, 5, 9), date(2024, 5, 8)], TODAY());
        assert_eq!(streak, Streak { current: 2, best: 2 });
    }

    #[test]
    fn old_run_counts_toward_best_only() {
        let dates = [
            date(2024, 5, 6),
            date(2024, 5, 5),
            date(2024, 5, 4),
            date(2024, 5, 3),
        ];
        let streak = calculate(&dates, TODAY());
        assert_eq!(streak, Streak { current: 0, best: 4 });
    }

    #[test]
    fn single_old_date_scores_nothing() {
        let streak = calculate(&[date(2024, 5, 1)], TODAY());
        assert_eq!(streak, Streak::default());
    }

    #[test]
    fn longer_past_run_beats_current() {
        let dates = [
            date(2024, 5, 10),
            date(2024, 5, 9),
            // gap
            date(2024, 5, 5),
            date(2024, 5, 4),
            date(2024, 5, 3),
            date(2024, 5, 2),
        ];
        let streak = calculate(&dates, TODAY());
        assert_eq!(streak, Streak { current: 2, best: 4 });
    }

    #[test]
    fn computed_from_the_store() {
        use crate::storage::TaskType;
        use chrono::{TimeZone, Utc};

        let db = Database::open_memory().unwrap();
        for day in [9, 10] {
            let started = Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap();
            db.create_session(started, std::time::Duration::from_secs(1500), TaskType::Work)
                .unwrap();
        }

        let streak = from_database(&db, TODAY()).unwrap();
        assert_eq!(streak, Streak { current: 2, best: 2 });
    }

    proptest! {
        #[test]
        fn unbroken_run_counts_every_day(len in 1usize..60, from_yesterday: bool) {
            let today = TODAY();
            let first = if from_yesterday { today - Days::new(1) } else { today };
            let dates: Vec<NaiveDate> =
                (0..len as u64).map(|i| first - Days::new(i)).collect();

            let streak = calculate(&dates, today);
            prop_assert_eq!(streak.current, len as u32);
            prop_assert_eq!(streak.best, len as u32);
        }

        #[test]
        fn gap_freezes_current_but_not_best(
            recent in 1usize..20,
            gap in 2u64..30,
            older in 2usize..40,
        ) {
            let today = TODAY();
            let mut dates: Vec<NaiveDate> =
                (0..recent as u64).map(|i| today - Days::new(i)).collect();
            let resume = dates[recent - 1] - Days::new(gap);
            dates.extend((0..older as u64).map(|i| resume - Days::new(i)));

            let streak = calculate(&dates, today);
            prop_assert_eq!(streak.current, recent as u32);
            prop_assert_eq!(streak.best, recent.max(older) as u32);
        }
    }
}
