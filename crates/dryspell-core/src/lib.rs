//! # Dryspell Core Library
//!
//! This library provides the domain engine for the Dryspell sobriety tracker.
//! All operations are available via a standalone CLI binary that is a thin
//! layer over the same core library.
//!
//! ## Architecture
//!
//! - **Attempt Engine**: A wall-clock-based state machine that requires the
//!   caller to periodically invoke `poll()` to detect goal completion
//! - **Records**: Finalized attempts with non-overlapping intervals
//! - **Statistics**: Period-scoped sums of sober days converted into savings
//! - **Storage**: SQLite-based record storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`AttemptEngine`]: Core attempt state machine
//! - [`RecordStore`]: In-memory record collection with overlap checks
//! - [`LevelLadder`]: Milestone tiers over elapsed days
//! - [`StatisticsAggregator`]: Period statistics over records
//! - [`Database`]: Record persistence
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod level;
pub mod records;
pub mod stats;
pub mod storage;
pub mod timer;
pub mod units;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, EngineError};
pub use events::Event;
pub use level::{lifetime_days, LevelLadder, LevelTier, TierProgress};
pub use records::{Record, RecordStatus, RecordStore};
pub use stats::{
    AggregateStats, ConsumptionProfile, Intensity, PeriodKind, StatisticsAggregator, StatsPeriod,
};
pub use storage::{Config, Database, RecordRepository};
pub use timer::{AttemptEngine, AttemptState, PollOutcome};
pub use units::UnitMode;
