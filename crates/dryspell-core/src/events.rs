use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::AttemptState;
use crate::units::UnitMode;

/// Every state change in the engine produces an Event.
/// Hosts print, log or persist them; the engine keeps no event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    AttemptStarted {
        target_units: f64,
        unit_mode: UnitMode,
        at: DateTime<Utc>,
    },
    /// Goal reached. Emitted exactly once per attempt; this is the signal
    /// to finalize the attempt into a record.
    AttemptCompleted {
        elapsed_units: f64,
        target_units: f64,
        at: DateTime<Utc>,
    },
    AttemptAbandoned {
        elapsed_units: f64,
        target_units: f64,
        at: DateTime<Utc>,
    },
    AttemptReset {
        at: DateTime<Utc>,
    },
    RecordAppended {
        record_id: String,
        actual_days: f64,
        is_completed: bool,
        at: DateTime<Utc>,
    },
    RecordRemoved {
        record_id: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: AttemptState,
        unit_mode: UnitMode,
        started_at: Option<DateTime<Utc>>,
        target_units: f64,
        elapsed_units: f64,
        remaining_units: f64,
        progress: f64,
        deadline: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
}
