//! # Tomatui Core Library
//!
//! This library provides the core logic for the tomatui pomodoro timer.
//! The CLI binary drives it from a terminal UI, but everything here is
//! UI-agnostic: the session engine is fed ticks and key commands by its
//! caller and never draws or blocks.
//!
//! ## Architecture
//!
//! - **Session Engine**: An input-driven state machine covering the timer,
//!   pause/resume, skip, long-break cycling, and the end-of-session policy
//! - **Post Actions**: Background notification dispatch and `then` command
//!   execution under one cancellable deadline
//! - **Storage**: SQLite session records and TOML-based configuration
//! - **Stats**: All-time totals, gap-filled daily series, and day streaks
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: Core session state machine
//! - [`Database`]: Session record persistence and statistics queries
//! - [`Config`]: Application configuration management
//! - [`PostActions`]: Handle to one running set of post actions

pub mod actions;
pub mod duration;
pub mod error;
pub mod notify;
pub mod session;
pub mod stats;
pub mod storage;

pub use actions::PostActions;
pub use error::{ConfigError, CoreError, DatabaseError, ParseError, Result};
pub use session::{SessionEngine, SessionState, SessionSummary};
pub use stats::Streak;
pub use storage::{
    AllTimeStats, Config, DailyStat, Database, LongBreakConfig, Notification, SessionEndPolicy,
    Task, TaskType, TimerArt,
};
