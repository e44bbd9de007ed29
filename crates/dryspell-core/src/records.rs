//! Finalized attempts and the collection that holds them.
//!
//! A [`Record`] is immutable once built. [`RecordStore`] keeps two
//! invariants: ids are unique, and no two records' `[start, end)`
//! intervals intersect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::units::real_days_between;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end_time: DateTime<Utc>,
    pub target_days: f64,
    /// Real calendar days between start and end.
    pub actual_days: f64,
    pub is_completed: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Completed,
    Abandoned,
}

impl Record {
    /// Build a record for `[start, end)` with a fresh id.
    ///
    /// # Errors
    /// [`EngineError::InvalidTimeRange`] unless `end > start`;
    /// [`EngineError::InvalidGoal`] unless `target_days > 0`.
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        target_days: f64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        Self::with_id(Uuid::new_v4().to_string(), start, end, target_days, created_at)
    }

    pub fn with_id(
        id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        target_days: f64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        if end <= start {
            return Err(EngineError::InvalidTimeRange { start, end });
        }
        if !(target_days.is_finite() && target_days > 0.0) {
            return Err(EngineError::InvalidGoal {
                target: target_days,
            });
        }
        let actual_days = real_days_between(start, end)?;
        Ok(Self {
            id,
            start_time: start,
            end_time: end,
            target_days,
            actual_days,
            is_completed: actual_days >= target_days,
            created_at,
            memo: None,
        })
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Real days recomputed from the instants; preferred over the stored
    /// `actual_days` for aggregation so no precision is lost.
    pub fn real_days(&self) -> f64 {
        real_days_between(self.start_time, self.end_time).unwrap_or(0.0)
    }

    pub fn status(&self) -> RecordStatus {
        if self.is_completed {
            RecordStatus::Completed
        } else {
            RecordStatus::Abandoned
        }
    }

    /// Share of the target reached, as a rounded percentage.
    pub fn achieved_percentage(&self) -> u32 {
        if self.target_days <= 0.0 {
            return 0;
        }
        (self.actual_days / self.target_days * 100.0).round().max(0.0) as u32
    }

    /// Half-open interval intersection.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end_time && end > self.start_time
    }
}

/// In-memory collection of finalized records.
///
/// Single writer: hosts sharing a store across threads must serialize
/// `append`/`remove` themselves.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted records, enforcing the same invariants
    /// as [`append`](Self::append).
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Result<Self, EngineError> {
        let mut store = Self::new();
        for record in records {
            store.append(record)?;
        }
        Ok(store)
    }

    /// # Errors
    /// [`EngineError::DuplicateRecord`] if the id is taken,
    /// [`EngineError::OverlapConflict`] if the interval intersects an
    /// existing record, [`EngineError::InvalidTimeRange`] if the record
    /// itself is malformed.
    pub fn append(&mut self, record: Record) -> Result<(), EngineError> {
        if record.end_time <= record.start_time {
            return Err(EngineError::InvalidTimeRange {
                start: record.start_time,
                end: record.end_time,
            });
        }
        if self.records.iter().any(|r| r.id == record.id) {
            return Err(EngineError::DuplicateRecord(record.id));
        }
        if let Some(existing) = self
            .records
            .iter()
            .find(|r| r.overlaps(record.start_time, record.end_time))
        {
            tracing::debug!(
                "Rejecting record {}: overlaps {}",
                record.id,
                existing.id
            );
            return Err(EngineError::OverlapConflict {
                existing_id: existing.id.clone(),
                start: record.start_time,
                end: record.end_time,
            });
        }
        tracing::debug!(
            "Appending record {} ({:.3} days, completed={})",
            record.id,
            record.actual_days,
            record.is_completed
        );
        self.records.push(record);
        Ok(())
    }

    /// All records, most recently created first.
    pub fn all(&self) -> Vec<&Record> {
        let mut out: Vec<&Record> = self.records.iter().collect();
        out.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.start_time.cmp(&a.start_time))
        });
        out
    }

    pub fn remove(&mut self, id: &str) -> Option<Record> {
        let idx = self.records.iter().position(|r| r.id == id)?;
        tracing::debug!("Removing record {id}");
        Some(self.records.remove(idx))
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Raw records in insertion order, for aggregation.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
