//! Period-scoped aggregate statistics over finalized records.
//!
//! Records are assigned to a period by their start instant. Durations are
//! summed in real days and converted to savings through the caller's
//! [`ConsumptionProfile`]. Nothing is rounded here.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::period::StatsPeriod;
use super::profile::ConsumptionProfile;
use crate::error::EngineError;
use crate::records::Record;
use crate::units::real_days_between;

/// Recovery time per avoided occasion, in hours.
pub const RECOVERY_HOURS: f64 = 5.0;
/// Calories per avoided occasion, in kcal.
pub const CALORIES_PER_DRINK: f64 = 300.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Records that contributed.
    pub record_count: usize,
    pub total_days: f64,
    pub saved_money: f64,
    pub saved_hours: f64,
    pub total_calories: f64,
    pub drinks_avoided: f64,
}

impl AggregateStats {
    /// Derive savings from a day total.
    pub fn from_days(total_days: f64, record_count: usize, profile: &ConsumptionProfile) -> Self {
        let weeks = total_days / 7.0;
        let occasions = weeks * profile.weekly_frequency;
        Self {
            record_count,
            total_days,
            saved_money: occasions * profile.unit_cost,
            saved_hours: occasions * (profile.session_hours + RECOVERY_HOURS),
            total_calories: occasions * CALORIES_PER_DRINK,
            drinks_avoided: occasions,
        }
    }

    pub fn weeks(&self) -> f64 {
        self.total_days / 7.0
    }
}

/// Aggregator bound to one profile and time zone.
#[derive(Debug, Clone)]
pub struct StatisticsAggregator<Tz: TimeZone> {
    profile: ConsumptionProfile,
    tz: Tz,
}

impl StatisticsAggregator<Utc> {
    /// Aggregator using UTC calendar boundaries.
    pub fn utc(profile: ConsumptionProfile) -> Self {
        Self::new(profile, Utc)
    }
}

impl<Tz: TimeZone> StatisticsAggregator<Tz> {
    pub fn new(profile: ConsumptionProfile, tz: Tz) -> Self {
        Self { profile, tz }
    }

    pub fn profile(&self) -> &ConsumptionProfile {
        &self.profile
    }

    /// Records whose start falls inside `period`.
    pub fn filter<'a>(
        &self,
        records: &'a [Record],
        period: &StatsPeriod,
    ) -> Result<Vec<&'a Record>, EngineError> {
        let bounds = period.bounds(&self.tz)?;
        Ok(records
            .iter()
            .filter(|r| match bounds {
                Some((start, end)) => start <= r.start_time && r.start_time < end,
                None => true,
            })
            .collect())
    }

    pub fn aggregate(
        &self,
        records: &[Record],
        period: &StatsPeriod,
    ) -> Result<AggregateStats, EngineError> {
        self.aggregate_with_active(records, period, None)
    }

    /// Like [`aggregate`](Self::aggregate), also counting an in-flight
    /// attempt `(start, now)` when its start falls inside `period`.
    pub fn aggregate_with_active(
        &self,
        records: &[Record],
        period: &StatsPeriod,
        active: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<AggregateStats, EngineError> {
        let kept = self.filter(records, period)?;
        let mut total_days: f64 = kept.iter().map(|r| r.real_days()).sum();

        if let Some((start, now)) = active {
            if period.contains(start, &self.tz)? {
                total_days += real_days_between(start, now)?;
            }
        }

        tracing::debug!(
            "Aggregated {:?}: {} record(s), {:.3} day(s)",
            period,
            kept.len(),
            total_days
        );
        Ok(AggregateStats::from_days(total_days, kept.len(), &self.profile))
    }
}

/// One-shot aggregation.
pub fn aggregate<Tz: TimeZone>(
    records: &[Record],
    period: &StatsPeriod,
    profile: &ConsumptionProfile,
    tz: &Tz,
) -> Result<AggregateStats, EngineError> {
    StatisticsAggregator::new(*profile, tz.clone()).aggregate(records, period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn rec(start: DateTime<Utc>, days: i64) -> Record {
        Record::new(start, start + Duration::days(days), 30.0, start + Duration::days(days)).unwrap()
    }

    #[test]
    fn one_week_scenario() {
        let profile = ConsumptionProfile::new(40_000.0, 2.5, 4.0);
        let records = vec![rec(at(2025, 1, 6), 7)];
        let stats = StatisticsAggregator::utc(profile)
            .aggregate(&records, &StatsPeriod::All)
            .unwrap();
        assert_eq!(stats.total_days, 7.0);
        assert_eq!(stats.weeks(), 1.0);
        assert_eq!(stats.saved_money, 100_000.0);
        assert_eq!(stats.saved_hours, 22.5);
        assert_eq!(stats.drinks_avoided, 2.5);
        assert_eq!(stats.total_calories, 750.0);
        assert_eq!(stats.record_count, 1);
    }

    #[test]
    fn empty_month_is_all_zero() {
        let records = vec![rec(at(2025, 1, 6), 7)];
        let stats = StatisticsAggregator::utc(ConsumptionProfile::default())
            .aggregate(&records, &StatsPeriod::Month { year: 2025, month: 3 })
            .unwrap();
        assert_eq!(stats, AggregateStats::default());
    }

    #[test]
    fn filters_by_start_time() {
        let records = vec![
            rec(at(2025, 1, 28), 10), // starts in January, runs into February
            rec(at(2025, 2, 10), 3),
            rec(at(2025, 3, 1), 2),
        ];
        let agg = StatisticsAggregator::utc(ConsumptionProfile::default());
        let feb = StatsPeriod::Month { year: 2025, month: 2 };
        let kept = agg.filter(&records, &feb).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(agg.aggregate(&records, &feb).unwrap().total_days, 3.0);

        let jan = StatsPeriod::Month { year: 2025, month: 1 };
        assert_eq!(agg.aggregate(&records, &jan).unwrap().total_days, 10.0);

        let year = StatsPeriod::Year { year: 2025 };
        assert_eq!(agg.aggregate(&records, &year).unwrap().total_days, 15.0);
    }

    #[test]
    fn week_filter_uses_monday_start() {
        let records = vec![
            rec(at(2025, 3, 9), 1),  // Sunday, previous week
            rec(at(2025, 3, 10), 1), // Monday
            rec(at(2025, 3, 16), 1), // Sunday, same week
        ];
        let agg = StatisticsAggregator::utc(ConsumptionProfile::default());
        let week = StatsPeriod::Week {
            date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
        };
        assert_eq!(agg.aggregate(&records, &week).unwrap().record_count, 2);
    }

    #[test]
    fn fractional_days_are_not_rounded() {
        let start = at(2025, 4, 1);
        let r = Record::new(start, start + Duration::hours(30), 1.0, start).unwrap();
        let stats = StatisticsAggregator::utc(ConsumptionProfile::new(7.0, 1.0, 0.0))
            .aggregate(std::slice::from_ref(&r), &StatsPeriod::All)
            .unwrap();
        assert_eq!(stats.total_days, 1.25);
        assert!((stats.saved_money - 1.25).abs() < 1e-12);
    }

    #[test]
    fn active_attempt_is_counted_in_its_period() {
        let records = vec![rec(at(2025, 5, 1), 7)];
        let agg = StatisticsAggregator::utc(ConsumptionProfile::default());
        let start = at(2025, 5, 20);
        let now = start + Duration::days(3);
        let may = StatsPeriod::Month { year: 2025, month: 5 };
        let with = agg.aggregate_with_active(&records, &may, Some((start, now))).unwrap();
        assert_eq!(with.total_days, 10.0);
        assert_eq!(with.record_count, 1);

        let june = StatsPeriod::Month { year: 2025, month: 6 };
        let without = agg.aggregate_with_active(&records, &june, Some((start, now))).unwrap();
        assert_eq!(without.total_days, 0.0);
    }

    #[test]
    fn free_function_matches_aggregator() {
        let records = vec![rec(at(2025, 1, 1), 14)];
        let profile = ConsumptionProfile::default();
        let a = aggregate(&records, &StatsPeriod::All, &profile, &Utc).unwrap();
        let b = StatisticsAggregator::utc(profile)
            .aggregate(&records, &StatsPeriod::All)
            .unwrap();
        assert_eq!(a, b);
    }
}
