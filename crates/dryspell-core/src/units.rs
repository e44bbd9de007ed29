//! Elapsed-unit conversion.
//!
//! Every component measures "days" through [`UnitMode`]. `Day` is a real
//! calendar day; `Minute` and `Second` are accelerated modes in which one
//! real minute (or second) counts as one unit, so a goal can be reached
//! quickly during testing or demos.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Milliseconds in one real day.
pub const DAY_MS: i64 = 86_400_000;
/// Milliseconds in one real minute.
pub const MINUTE_MS: i64 = 60_000;
/// Milliseconds in one real second.
pub const SECOND_MS: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMode {
    #[default]
    Day,
    Minute,
    Second,
}

impl UnitMode {
    pub const ALL: [UnitMode; 3] = [UnitMode::Day, UnitMode::Minute, UnitMode::Second];

    /// Length of one unit in real milliseconds.
    pub fn millis_per_unit(self) -> i64 {
        match self {
            UnitMode::Day => DAY_MS,
            UnitMode::Minute => MINUTE_MS,
            UnitMode::Second => SECOND_MS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnitMode::Day => "day",
            UnitMode::Minute => "minute",
            UnitMode::Second => "second",
        }
    }

    /// Whether this mode runs faster than real time.
    pub fn is_accelerated(self) -> bool {
        self != UnitMode::Day
    }
}

impl fmt::Display for UnitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(UnitMode::Day),
            "minute" | "minutes" => Ok(UnitMode::Minute),
            "second" | "seconds" => Ok(UnitMode::Second),
            other => Err(format!("Unknown unit mode: {other}")),
        }
    }
}

/// Units elapsed between `start` and `now` under `mode`.
///
/// # Errors
/// Returns [`EngineError::InvalidTimeRange`] if `now` precedes `start`.
pub fn elapsed_units(
    start: DateTime<Utc>,
    now: DateTime<Utc>,
    mode: UnitMode,
) -> Result<f64, EngineError> {
    if now < start {
        return Err(EngineError::InvalidTimeRange { start, end: now });
    }
    let delta_ms = (now - start).num_milliseconds();
    Ok(delta_ms as f64 / mode.millis_per_unit() as f64)
}

/// Real milliseconds spanned by `units` under `mode`.
///
/// Saturates instead of overflowing for absurd inputs.
pub fn units_to_millis(units: f64, mode: UnitMode) -> i64 {
    let ms = units * mode.millis_per_unit() as f64;
    if ms >= i64::MAX as f64 {
        i64::MAX
    } else if ms <= i64::MIN as f64 {
        i64::MIN
    } else {
        ms.round() as i64
    }
}

/// Real calendar days between two instants, independent of any
/// accelerated mode. Used for everything that ends up in statistics.
pub fn real_days_between(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<f64, EngineError> {
    elapsed_units(start, end, UnitMode::Day)
}
