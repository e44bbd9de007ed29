//! Core error types for dryspell-core.
//!
//! The domain engine reports every failure through [`EngineError`]; storage
//! and configuration layers add their own enums, and [`CoreError`] wraps all
//! of them for callers that cross layers (the CLI, persistence adapters).

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Core error type for dryspell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Domain engine errors
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by the attempt engine, the record store and the
/// time-unit policy. All of them are recoverable by the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Goal must be a positive number of units.
    #[error("Invalid goal: target must be positive, got {target}")]
    InvalidGoal { target: f64 },

    /// An interval whose end precedes (or equals) its start.
    #[error("Invalid time range: end ({end}) must be after start ({start})")]
    InvalidTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A new record intersects an existing one.
    #[error("Record [{start}, {end}) overlaps existing record {existing_id}")]
    OverlapConflict {
        existing_id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Operation not permitted in the attempt's current state.
    #[error("Cannot {operation} while attempt is {state}")]
    InvalidStateTransition {
        operation: &'static str,
        state: crate::timer::AttemptState,
    },

    /// A record with the same id is already stored.
    #[error("Duplicate record id: {0}")]
    DuplicateRecord(String),

    /// No record with the given id.
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// A statistics period that does not map to a calendar range.
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
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

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Stored row could not be decoded into a domain value
    #[error("Corrupt row in '{table}': {message}")]
    CorruptRow { table: String, message: String },
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Could not determine or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
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

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::AttemptState;

    #[test]
    fn engine_error_converts_into_core_error() {
        let err: CoreError = EngineError::InvalidGoal { target: 0.0 }.into();
        assert!(matches!(err, CoreError::Engine(EngineError::InvalidGoal { .. })));
        assert_eq!(err.to_string(), "Invalid goal: target must be positive, got 0");
    }

    #[test]
    fn layer_errors_convert_into_core_error() {
        let err: CoreError = ConfigError::UnknownKey("theme".into()).into();
        assert!(matches!(err, CoreError::Config(ConfigError::UnknownKey(_))));

        let err: CoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, CoreError::Database(DatabaseError::QueryFailed(_))));
    }

    #[test]
    fn state_transition_message_names_state() {
        let err = EngineError::InvalidStateTransition {
            operation: "poll",
            state: AttemptState::Idle,
        };
        assert_eq!(err.to_string(), "Cannot poll while attempt is idle");
    }
}
