mod config;
pub mod database;

pub use config::Config;
pub use database::Database;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::records::{Record, RecordStore};

/// Persistence boundary for finalized records.
///
/// Implementations must round-trip every field exactly; instants are
/// stored as integer milliseconds.
pub trait RecordRepository {
    fn load_all_records(&self) -> Result<Vec<Record>>;

    fn save_all_records(&mut self, records: &[Record]) -> Result<()>;

    /// Load everything into a validated [`RecordStore`].
    fn load_store(&self) -> Result<RecordStore> {
        Ok(RecordStore::from_records(self.load_all_records()?)?)
    }

    fn save_store(&mut self, store: &RecordStore) -> Result<()> {
        self.save_all_records(store.records())
    }
}

/// Returns `~/.config/dryspell[-dev]/` based on DRYSPELL_ENV.
///
/// Set DRYSPELL_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::result::Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DRYSPELL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("dryspell-dev")
    } else {
        base_dir.join("dryspell")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
