//! Integration tests for period statistics over a realistic history.

use chrono::{Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use dryspell_core::{
    ConsumptionProfile, Intensity, PeriodKind, Record, RecordStore, StatisticsAggregator,
    StatsPeriod,
};

fn history() -> RecordStore {
    let mut store = RecordStore::new();
    for (start, days) in [((2024, 12, 20), 10), ((2025, 1, 6), 7), ((2025, 1, 20), 14)] {
        let start = Utc
            .with_ymd_and_hms(start.0, start.1, start.2, 12, 0, 0)
            .unwrap();
        let end = start + Duration::days(days);
        store.append(Record::new(start, end, 7.0, end).unwrap()).unwrap();
    }
    store
}

#[test]
fn test_month_and_year_totals() {
    let store = history();
    let agg = StatisticsAggregator::utc(ConsumptionProfile::default());
    let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

    let month = agg
        .aggregate(store.records(), &StatsPeriod::containing(PeriodKind::Month, date))
        .unwrap();
    assert_eq!(month.record_count, 2);
    assert_eq!(month.total_days, 21.0);
    assert_eq!(month.saved_money, 300_000.0);

    let year = agg
        .aggregate(store.records(), &StatsPeriod::containing(PeriodKind::Year, date))
        .unwrap();
    assert_eq!(year.total_days, 21.0);

    let all = agg.aggregate(store.records(), &StatsPeriod::All).unwrap();
    assert_eq!(all.total_days, 31.0);
}

#[test]
fn test_profile_presets_change_savings() {
    let store = history();
    let high = ConsumptionProfile::from_presets(Intensity::High, Intensity::High, Intensity::High);
    let stats = StatisticsAggregator::utc(high)
        .aggregate(store.records(), &StatsPeriod::All)
        .unwrap();
    let weeks = 31.0 / 7.0;
    assert!((stats.drinks_avoided - weeks * 5.0).abs() < 1e-9);
    assert!((stats.saved_money - weeks * 5.0 * 70_000.0).abs() < 1e-6);
    assert!((stats.saved_hours - weeks * 5.0 * 11.0).abs() < 1e-9);
}

#[test]
fn test_time_zone_moves_boundaries() {
    // Starts at 2025-01-31T20:00Z, which is already February in UTC+9.
    let start = Utc.with_ymd_and_hms(2025, 1, 31, 20, 0, 0).unwrap();
    let records = vec![Record::new(start, start + Duration::days(2), 1.0, start).unwrap()];
    let feb = StatsPeriod::Month { year: 2025, month: 2 };

    let utc = StatisticsAggregator::utc(ConsumptionProfile::default());
    assert_eq!(utc.aggregate(&records, &feb).unwrap().record_count, 0);

    let tokyo = StatisticsAggregator::new(
        ConsumptionProfile::default(),
        FixedOffset::east_opt(9 * 3600).unwrap(),
    );
    assert_eq!(tokyo.aggregate(&records, &feb).unwrap().record_count, 1);
}
