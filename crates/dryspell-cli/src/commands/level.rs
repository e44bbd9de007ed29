use clap::Args;
use dryspell_core::storage::{Database, RecordRepository};
use dryspell_core::{lifetime_days, LevelLadder, LevelTier, TierProgress};
use serde::Serialize;

use super::{active_interval, load_engine, now, print_json, CliResult};

#[derive(Args)]
pub struct LevelArgs {
    /// Day count to look up; defaults to lifetime sober days
    #[arg(long)]
    days: Option<f64>,
    /// Print the whole ladder instead
    #[arg(long, conflicts_with = "days")]
    all: bool,
}

#[derive(Serialize)]
struct LevelReport {
    days: f64,
    #[serde(flatten)]
    progress: TierProgress,
    next: Option<&'static LevelTier>,
}

pub fn run(args: LevelArgs) -> CliResult {
    if args.all {
        return print_json(LevelLadder::tiers());
    }

    let days = match args.days {
        Some(days) => days,
        None => {
            let db = Database::open()?;
            let store = db.load_store()?;
            let active = active_interval(&load_engine(&db), now());
            lifetime_days(store.records(), active)
        }
    };

    let progress = LevelLadder::progress_for(days);
    print_json(&LevelReport {
        days,
        progress,
        next: LevelLadder::next_tier(progress.tier.rank),
    })
}
