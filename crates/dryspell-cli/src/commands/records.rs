use chrono::{DateTime, Utc};
use clap::Subcommand;
use dryspell_core::storage::{Database, RecordRepository};
use dryspell_core::{EngineError, Event, Record};

use super::{now, parse_instant, print_json, CliResult};

#[derive(Subcommand)]
pub enum RecordsAction {
    /// List records, newest first
    List {
        /// Show at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Add a past attempt by hand
    Add {
        /// Start instant (RFC 3339)
        #[arg(long, value_parser = parse_instant)]
        start: DateTime<Utc>,
        /// End instant (RFC 3339)
        #[arg(long, value_parser = parse_instant)]
        end: DateTime<Utc>,
        /// Goal in days
        #[arg(long)]
        target: f64,
        /// Free-form note
        #[arg(long)]
        memo: Option<String>,
    },
    /// Remove a record by id
    Remove {
        /// Record ID
        id: String,
    },
    /// Show one record
    Show {
        /// Record ID
        id: String,
    },
}

pub fn run(action: RecordsAction) -> CliResult {
    let mut db = Database::open()?;
    let mut store = db.load_store()?;

    match action {
        RecordsAction::List { limit } => {
            let all = store.all();
            let shown = match limit {
                Some(n) => &all[..n.min(all.len())],
                None => &all[..],
            };
            print_json(shown)?;
        }
        RecordsAction::Add {
            start,
            end,
            target,
            memo,
        } => {
            let mut record = Record::new(start, end, target, now())?;
            if let Some(memo) = memo {
                record = record.with_memo(memo);
            }
            let event = Event::RecordAppended {
                record_id: record.id.clone(),
                actual_days: record.actual_days,
                is_completed: record.is_completed,
                at: record.created_at,
            };
            store.append(record)?;
            db.save_store(&store)?;
            print_json(&event)?;
        }
        RecordsAction::Remove { id } => {
            let removed = store
                .remove(&id)
                .ok_or_else(|| EngineError::RecordNotFound(id.clone()))?;
            db.save_store(&store)?;
            print_json(&Event::RecordRemoved {
                record_id: removed.id,
                at: now(),
            })?;
        }
        RecordsAction::Show { id } => {
            let record = store
                .find_by_id(&id)
                .ok_or(EngineError::RecordNotFound(id))?;
            print_json(record)?;
        }
    }
    Ok(())
}
