use chrono::{DateTime, Utc};
use clap::Subcommand;
use dryspell_core::storage::{Database, RecordRepository};
use dryspell_core::{AttemptEngine, AttemptState, Config, EngineError, Event, UnitMode};

use super::{load_engine, now, print_json, save_engine, CliResult};

#[derive(Subcommand)]
pub enum AttemptAction {
    /// Start a new attempt toward a goal
    Start {
        /// Goal in units (days unless an accelerated mode is chosen)
        #[arg(long, short)]
        target: i64,
        /// Unit mode (day, minute, second); defaults to the configured mode
        #[arg(long)]
        mode: Option<UnitMode>,
    },
    /// Poll the attempt and print its state as JSON
    Status,
    /// Stop the attempt and store it as a record
    Stop {
        /// Note attached to the stored record
        #[arg(long)]
        memo: Option<String>,
    },
    /// Discard the attempt and return to idle
    Reset,
}

/// Turn a terminated attempt into a stored record.
fn finalize(
    db: &mut Database,
    engine: &AttemptEngine,
    memo: Option<String>,
    now: DateTime<Utc>,
) -> CliResult<Event> {
    let mut record = match engine.to_record(now) {
        Ok(record) => record,
        Err(e @ EngineError::InvalidTimeRange { .. }) => {
            return Err(format!("{e}; run `dryspell attempt reset` to discard this attempt").into());
        }
        Err(e) => return Err(e.into()),
    };
    if let Some(memo) = memo {
        record = record.with_memo(memo);
    }
    let event = Event::RecordAppended {
        record_id: record.id.clone(),
        actual_days: record.actual_days,
        is_completed: record.is_completed,
        at: now,
    };

    let mut store = db.load_store()?;
    store.append(record)?;
    db.save_store(&store)?;
    Ok(event)
}

pub fn run(action: AttemptAction) -> CliResult {
    let mut db = Database::open()?;
    let mut engine = load_engine(&db);
    let now = now();

    let events = match action {
        AttemptAction::Start { target, mode } => {
            let mode = match mode {
                Some(mode) => mode,
                None => Config::load()?.unit_mode,
            };
            vec![engine.start(target, mode, now)?]
        }
        AttemptAction::Status => {
            let mut events = Vec::new();
            if engine.state() == AttemptState::Running {
                let outcome = engine.poll(now)?;
                if let Some(completed) = outcome.completion {
                    events.push(completed);
                    events.push(finalize(&mut db, &engine, None, now)?);
                }
            }
            events.insert(0, engine.snapshot(now));
            events
        }
        AttemptAction::Stop { memo } => {
            let terminal = engine.stop(now)?;
            vec![terminal, finalize(&mut db, &engine, memo, now)?]
        }
        AttemptAction::Reset => vec![engine.reset(now)],
    };

    save_engine(&db, &engine)?;
    print_json(&events)
}
