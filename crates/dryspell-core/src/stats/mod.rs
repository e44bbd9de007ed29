//! Statistics module for Dryspell
//!
//! Filters finalized records by calendar period and reduces them to
//! days sober plus the money, time, calories and drinks that implies for a
//! given consumption profile.

mod aggregate;
mod period;
mod profile;

pub use aggregate::{aggregate, AggregateStats, StatisticsAggregator, CALORIES_PER_DRINK, RECOVERY_HOURS};
pub use period::{PeriodKind, StatsPeriod};
pub use profile::{ConsumptionProfile, Intensity};
