pub mod attempt;
pub mod config;
pub mod level;
pub mod records;
pub mod stats;

use chrono::{DateTime, Utc};
use dryspell_core::storage::Database;
use dryspell_core::{AttemptEngine, AttemptState, Clock, SystemClock};
use serde::Serialize;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

const ENGINE_KEY: &str = "attempt_engine";

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn now() -> DateTime<Utc> {
    SystemClock.now()
}

/// Parse an RFC 3339 timestamp such as `2025-01-06T08:00:00+09:00`.
pub(crate) fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{s}': {e}"))
}

pub(crate) fn load_engine(db: &Database) -> AttemptEngine {
    match db.kv_get(ENGINE_KEY) {
        Ok(Some(json)) => match serde_json::from_str::<AttemptEngine>(&json) {
            Ok(engine) => return engine,
            Err(e) => tracing::warn!("Discarding unreadable attempt state: {e}"),
        },
        Ok(None) => {}
        Err(e) => tracing::warn!("Could not read attempt state: {e}"),
    }
    AttemptEngine::new()
}

pub(crate) fn save_engine(db: &Database, engine: &AttemptEngine) -> CliResult {
    let json = serde_json::to_string(engine)?;
    db.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

/// The running attempt as `(start, now)`, for live totals.
pub(crate) fn active_interval(
    engine: &AttemptEngine,
    now: DateTime<Utc>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    if engine.state() != AttemptState::Running {
        return None;
    }
    engine.started_at().map(|start| (start, now.max(start)))
}
