//! Core error types for tomatui-core.
//!
//! This module defines the error hierarchy used across the library.
//! Only argument-level failures (an unparsable duration) are meant to stop
//! the program; storage and side-effect failures degrade gracefully and are
//! handled close to where they occur.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tomatui-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Duration string parsing errors
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Failed to resolve or create the state directory
    #[error("Failed to prepare state directory: {0}")]
    StateDir(#[from] std::io::Error),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Notification dispatch errors.
///
/// These are logged by the post-action coordinator and never surfaced to the
/// user; a missed notification must not disturb a running session.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The helper program could not be launched
    #[error("failed to launch {command}: {source}")]
    Launch {
        command: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The helper program exited with a failure status
    #[error("{command} exited with {status}")]
    Failed {
        command: &'static str,
        status: std::process::ExitStatus,
    },
}

/// Duration string parsing errors.
///
/// Raised for user-supplied duration arguments like `25m` or `1h30m`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Empty input
    #[error("empty duration")]
    EmptyDuration,

    /// A number without a trailing unit, e.g. `"25"`
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    /// An unrecognized unit, e.g. `"3d"`
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { input: String, unit: String },

    /// Anything else that does not scan as `<number><unit>...`
    #[error("invalid duration {0:?}")]
    InvalidDuration(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
