use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::Args;
use dryspell_core::storage::{Database, RecordRepository};
use dryspell_core::{AggregateStats, Config, PeriodKind, Record, StatisticsAggregator, StatsPeriod};
use serde::Serialize;

use super::{active_interval, load_engine, now, print_json, CliResult};

#[derive(Args)]
pub struct StatsArgs {
    /// Period to aggregate (week, month, year, all)
    #[arg(default_value = "all")]
    period: PeriodKind,
    /// Any date inside the period (YYYY-MM-DD); defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Leave the running attempt out of the totals
    #[arg(long)]
    finalized_only: bool,
}

#[derive(Serialize)]
struct StatsReport {
    period: StatsPeriod,
    #[serde(flatten)]
    stats: AggregateStats,
    includes_active: bool,
}

fn report<Tz: TimeZone>(
    tz: Tz,
    config: &Config,
    records: &[Record],
    args: &StatsArgs,
    active: Option<(DateTime<Utc>, DateTime<Utc>)>,
    now: DateTime<Utc>,
) -> CliResult<StatsReport> {
    let date = args
        .date
        .unwrap_or_else(|| now.with_timezone(&tz).date_naive());
    let period = StatsPeriod::containing(args.period, date);
    let stats = StatisticsAggregator::new(config.profile, tz.clone())
        .aggregate_with_active(records, &period, active)?;
    let includes_active = match active {
        Some((start, _)) => period.contains(start, &tz)?,
        None => false,
    };
    Ok(StatsReport {
        period,
        stats,
        includes_active,
    })
}

pub fn run(args: StatsArgs) -> CliResult {
    let config = Config::load()?;
    let db = Database::open()?;
    let store = db.load_store()?;
    let now = now();
    let active = if args.finalized_only {
        None
    } else {
        active_interval(&load_engine(&db), now)
    };

    let report = match config.time_zone() {
        Some(offset) => report(offset, &config, store.records(), &args, active, now)?,
        None => report(Local, &config, store.records(), &args, active, now)?,
    };
    print_json(&report)
}
