//! SQLite-based record storage.
//!
//! Provides persistent storage for:
//! - Finalized sobriety records
//! - Key-value store for application state (the in-flight attempt)

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use super::{data_dir, RecordRepository};
use crate::error::{DatabaseError, Result};
use crate::records::Record;

/// SQLite database for record storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/dryspell/dryspell.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("dryspell.db");
        Self::open_path(&path)
    }

    pub fn open_path(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS records (
                    id           TEXT PRIMARY KEY,
                    start_ms     INTEGER NOT NULL,
                    end_ms       INTEGER NOT NULL,
                    target_days  REAL NOT NULL,
                    actual_days  REAL NOT NULL,
                    is_completed INTEGER NOT NULL,
                    created_ms   INTEGER NOT NULL,
                    memo         TEXT
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_records_start_ms ON records(start_ms);
                CREATE INDEX IF NOT EXISTS idx_records_created_ms ON records(created_ms);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Number of stored records.
    pub fn record_count(&self) -> Result<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get::<_, i64>(0))?;
        Ok(count.max(0) as u64)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

struct RawRecord {
    id: String,
    start_ms: i64,
    end_ms: i64,
    target_days: f64,
    actual_days: f64,
    is_completed: bool,
    created_ms: i64,
    memo: Option<String>,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            start_ms: row.get(1)?,
            end_ms: row.get(2)?,
            target_days: row.get(3)?,
            actual_days: row.get(4)?,
            is_completed: row.get(5)?,
            created_ms: row.get(6)?,
            memo: row.get(7)?,
        })
    }

    fn into_record(self) -> Result<Record, DatabaseError> {
        let instant = |ms: i64, column: &str| {
            DateTime::<Utc>::from_timestamp_millis(ms).ok_or_else(|| DatabaseError::CorruptRow {
                table: "records".into(),
                message: format!("{column}={ms} out of range for record {}", self.id),
            })
        };
        let start_time = instant(self.start_ms, "start_ms")?;
        let end_time = instant(self.end_ms, "end_ms")?;
        let created_at = instant(self.created_ms, "created_ms")?;
        Ok(Record {
            id: self.id,
            start_time,
            end_time,
            target_days: self.target_days,
            actual_days: self.actual_days,
            is_completed: self.is_completed,
            created_at,
            memo: self.memo,
        })
    }
}

impl RecordRepository for Database {
    fn load_all_records(&self) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, start_ms, end_ms, target_days, actual_days, is_completed, created_ms, memo
             FROM records
             ORDER BY created_ms DESC",
        )?;
        let rows = stmt.query_map([], RawRecord::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        tracing::debug!("Loaded {} record(s)", records.len());
        Ok(records)
    }

    fn save_all_records(&mut self, records: &[Record]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM records", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records
                 (id, start_ms, end_ms, target_days, actual_days, is_completed, created_ms, memo)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for r in records {
                stmt.execute(params![
                    r.id,
                    r.start_time.timestamp_millis(),
                    r.end_time.timestamp_millis(),
                    r.target_days,
                    r.actual_days,
                    r.is_completed,
                    r.created_at.timestamp_millis(),
                    r.memo,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!("Saved {} record(s)", records.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample(start_offset_days: i64) -> Record {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
            + Duration::days(start_offset_days)
            + Duration::milliseconds(123);
        Record::new(base, base + Duration::milliseconds(3 * 86_400_000 + 7), 5.0, base).unwrap()
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut db = Database::open_memory().unwrap();
        let records = vec![sample(0), sample(10).with_memo("after the wedding")];
        db.save_all_records(&records).unwrap();
        assert_eq!(db.record_count().unwrap(), 2);

        let mut loaded = db.load_all_records().unwrap();
        loaded.sort_by_key(|r| r.start_time);
        assert_eq!(loaded, records);
    }

    #[test]
    fn save_replaces_previous_contents() {
        let mut db = Database::open_memory().unwrap();
        db.save_all_records(&[sample(0), sample(10)]).unwrap();
        db.save_all_records(&[sample(20)]).unwrap();
        assert_eq!(db.record_count().unwrap(), 1);
    }

    #[test]
    fn load_store_validates() {
        let mut db = Database::open_memory().unwrap();
        db.save_all_records(&[sample(0), sample(5)]).unwrap();
        let store = db.load_store().unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }
}
