//! Attempt engine.
//!
//! A wall-clock-based state machine for a single sobriety attempt. It does
//! not use internal threads or read the clock; the caller passes `now` to
//! every command and is responsible for calling `poll()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Completed | Abandoned)
//! (Completed | Abandoned) -> Running   (new attempt via start)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = AttemptEngine::new();
//! engine.start(30, UnitMode::Day, clock.now())?;
//! // In a loop:
//! if let Some(event) = engine.poll(clock.now())?.completion {
//!     store.append(engine.to_record(clock.now())?)?;
//! }
//! ```

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::events::Event;
use crate::records::Record;
use crate::units::{elapsed_units, units_to_millis, UnitMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptState {
    Idle,
    Running,
    Completed,
    Abandoned,
}

impl AttemptState {
    pub fn is_terminal(self) -> bool {
        matches!(self, AttemptState::Completed | AttemptState::Abandoned)
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttemptState::Idle => "idle",
            AttemptState::Running => "running",
            AttemptState::Completed => "completed",
            AttemptState::Abandoned => "abandoned",
        };
        f.write_str(s)
    }
}

/// Result of a `poll()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollOutcome {
    pub state: AttemptState,
    pub elapsed_units: f64,
    pub remaining_units: f64,
    /// 0.0 .. 1.0 progress toward the goal.
    pub progress: f64,
    /// `Some(Event::AttemptCompleted)` on the one poll that crosses the goal.
    pub completion: Option<Event>,
}

/// Core attempt engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptEngine {
    state: AttemptState,
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
    target_units: u32,
    #[serde(default)]
    unit_mode: UnitMode,
    /// Set once the completion event has been handed out.
    #[serde(default)]
    completion_latched: bool,
    /// When the attempt left `Running` (goal crossing observed, or abandon).
    #[serde(default)]
    ended_at: Option<DateTime<Utc>>,
}

impl Default for AttemptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AttemptEngine {
    /// Create an engine with no attempt configured.
    pub fn new() -> Self {
        Self {
            state: AttemptState::Idle,
            started_at: None,
            target_units: 0,
            unit_mode: UnitMode::Day,
            completion_latched: false,
            ended_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn target_units(&self) -> u32 {
        self.target_units
    }

    pub fn unit_mode(&self) -> UnitMode {
        self.unit_mode
    }

    pub fn completion_latched(&self) -> bool {
        self.completion_latched
    }

    /// Instant at which the goal is reached.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        let start = self.started_at?;
        let ms = units_to_millis(self.target_units as f64, self.unit_mode);
        start.checked_add_signed(Duration::milliseconds(ms))
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        let elapsed = self.elapsed_at(now);
        let target = self.target_units as f64;
        Event::StateSnapshot {
            state: self.state,
            unit_mode: self.unit_mode,
            started_at: self.started_at,
            target_units: target,
            elapsed_units: elapsed,
            remaining_units: (target - elapsed).max(0.0),
            progress: progress(elapsed, target),
            deadline: self.deadline(),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Commit a new goal and start running.
    ///
    /// # Errors
    /// [`EngineError::InvalidGoal`] if `target_units <= 0`;
    /// [`EngineError::InvalidStateTransition`] if an attempt is running.
    pub fn start(
        &mut self,
        target_units: i64,
        unit_mode: UnitMode,
        now: DateTime<Utc>,
    ) -> Result<Event, EngineError> {
        if self.state == AttemptState::Running {
            return Err(self.invalid("start"));
        }
        let target = u32::try_from(target_units)
            .ok()
            .filter(|t| *t > 0)
            .ok_or(EngineError::InvalidGoal {
                target: target_units as f64,
            })?;

        self.state = AttemptState::Running;
        self.started_at = Some(now);
        self.target_units = target;
        self.unit_mode = unit_mode;
        self.completion_latched = false;
        self.ended_at = None;
        tracing::info!("Attempt started: target={} {}(s)", target, unit_mode);

        Ok(Event::AttemptStarted {
            target_units: target as f64,
            unit_mode,
            at: now,
        })
    }

    /// Call periodically. Transitions to `Completed` once the goal is
    /// reached and hands out the completion event exactly once.
    ///
    /// Polling a completed attempt is allowed and reports it as completed
    /// without a second event.
    ///
    /// # Errors
    /// [`EngineError::InvalidStateTransition`] when idle or abandoned;
    /// [`EngineError::InvalidTimeRange`] if `now` precedes the start.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Result<PollOutcome, EngineError> {
        let target = self.target_units as f64;
        match self.state {
            AttemptState::Running => {
                let start = self.started_at.ok_or_else(|| self.invalid("poll"))?;
                let elapsed = elapsed_units(start, now, self.unit_mode)?;
                let mut completion = None;
                if elapsed >= target && !self.completion_latched {
                    self.state = AttemptState::Completed;
                    self.completion_latched = true;
                    self.ended_at = Some(now);
                    tracing::info!("Attempt completed: {:.3} of {} unit(s)", elapsed, target);
                    completion = Some(Event::AttemptCompleted {
                        elapsed_units: elapsed,
                        target_units: target,
                        at: now,
                    });
                }
                Ok(PollOutcome {
                    state: self.state,
                    elapsed_units: elapsed,
                    remaining_units: (target - elapsed).max(0.0),
                    progress: progress(elapsed, target),
                    completion,
                })
            }
            AttemptState::Completed => {
                let elapsed = self.elapsed_at(now);
                Ok(PollOutcome {
                    state: self.state,
                    elapsed_units: elapsed,
                    remaining_units: 0.0,
                    progress: 1.0,
                    completion: None,
                })
            }
            AttemptState::Idle | AttemptState::Abandoned => Err(self.invalid("poll")),
        }
    }

    /// Stop a running attempt before its goal.
    ///
    /// # Errors
    /// [`EngineError::InvalidStateTransition`] unless running.
    pub fn abandon(&mut self, now: DateTime<Utc>) -> Result<Event, EngineError> {
        if self.state != AttemptState::Running {
            return Err(self.invalid("abandon"));
        }
        let start = self.started_at.ok_or_else(|| self.invalid("abandon"))?;
        let end = now.max(start);
        let elapsed = elapsed_units(start, end, self.unit_mode)?;
        self.state = AttemptState::Abandoned;
        self.ended_at = Some(end);
        tracing::info!("Attempt abandoned after {:.3} unit(s)", elapsed);
        Ok(Event::AttemptAbandoned {
            elapsed_units: elapsed,
            target_units: self.target_units as f64,
            at: end,
        })
    }

    /// End a running attempt: completed if the goal has passed since the
    /// last poll, abandoned otherwise.
    ///
    /// A clock that reads earlier than the start is treated as an abandon
    /// at the start instant rather than an error.
    ///
    /// # Errors
    /// [`EngineError::InvalidStateTransition`] unless running.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<Event, EngineError> {
        if self.state != AttemptState::Running {
            return Err(self.invalid("stop"));
        }
        let start = self.started_at.ok_or_else(|| self.invalid("stop"))?;
        if now >= start {
            if let Some(completed) = self.poll(now)?.completion {
                return Ok(completed);
            }
        } else {
            tracing::warn!("Clock reads {} before attempt start {}", now, start);
        }
        self.abandon(now)
    }

    /// Finalize a terminated attempt into a record.
    ///
    /// `actual_days` is measured in real calendar days regardless of the
    /// unit mode; accelerated modes only change how fast the goal is hit.
    ///
    /// # Errors
    /// [`EngineError::InvalidStateTransition`] unless completed or
    /// abandoned; [`EngineError::InvalidTimeRange`] if the attempt spans no
    /// time at all.
    pub fn to_record(&self, now: DateTime<Utc>) -> Result<Record, EngineError> {
        if !self.state.is_terminal() {
            return Err(self.invalid("finalize"));
        }
        let start = self.started_at.ok_or_else(|| self.invalid("finalize"))?;
        let end = self.ended_at.unwrap_or(now);
        Record::new(start, end, self.target_units as f64, now)
    }

    /// Drop any attempt and return to `Idle`.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Event {
        *self = Self::new();
        tracing::debug!("Attempt engine reset");
        Event::AttemptReset { at: now }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Elapsed units at `now`, frozen at the end instant once terminal.
    fn elapsed_at(&self, now: DateTime<Utc>) -> f64 {
        let Some(start) = self.started_at else {
            return 0.0;
        };
        let at = self.ended_at.unwrap_or(now);
        elapsed_units(start, at.max(start), self.unit_mode).unwrap_or(0.0)
    }

    fn invalid(&self, operation: &'static str) -> EngineError {
        EngineError::InvalidStateTransition {
            operation,
            state: self.state,
        }
    }
}

fn progress(elapsed: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    (elapsed / target).clamp(0.0, 1.0)
}
