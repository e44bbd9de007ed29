//! Achievement ladder.
//!
//! A fixed, ordered table of tiers keyed by elapsed-day ranges. The table
//! partitions `[0, ∞)` without gaps or overlaps; lookups compare the
//! fractional day count directly against the bounds, so 2.9 days is still
//! the first tier and 3.0 days is the second.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::records::Record;
use crate::units::real_days_between;

/// One rung of the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelTier {
    pub rank: usize,
    pub name: &'static str,
    /// First day of the tier (inclusive).
    pub start_day: u32,
    /// Last day of the tier (inclusive). `None` for the final tier.
    pub end_day: Option<u32>,
}

impl LevelTier {
    /// 1-indexed level number as shown to users ("Lv.1").
    pub fn display_number(&self) -> usize {
        self.rank + 1
    }

    pub fn is_final(&self) -> bool {
        self.end_day.is_none()
    }

    /// Number of whole days covered by a bounded tier.
    pub fn span_days(&self) -> Option<u32> {
        self.end_day.map(|end| end - self.start_day + 1)
    }

    fn contains(&self, days: f64) -> bool {
        if days < self.start_day as f64 {
            return false;
        }
        match self.end_day {
            // Inclusive integer end: everything below the next day belongs here.
            Some(end) => days < end as f64 + 1.0,
            None => true,
        }
    }
}

/// Where a day count sits on the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierProgress {
    pub tier: LevelTier,
    /// Fraction of the current tier completed, in `[0, 1)`; `1.0` on the
    /// final tier.
    pub fraction_to_next: f64,
    /// Days until the next tier begins; `None` on the final tier.
    pub remaining_to_next: Option<f64>,
}

const TIERS: [LevelTier; 11] = [
    tier(0, "Alcohol Stop", 0, Some(2)),
    tier(1, "Three-Day Cut", 3, Some(6)),
    tier(2, "One Week Clear", 7, Some(13)),
    tier(3, "Skin Changes", 14, Some(20)),
    tier(4, "Habit Forming", 21, Some(29)),
    tier(5, "Monthly Miracle", 30, Some(59)),
    tier(6, "New Fit", 60, Some(99)),
    tier(7, "Hundred-Day Pro", 100, Some(179)),
    tier(8, "Plus Account", 180, Some(299)),
    tier(9, "Sobriety Master", 300, Some(364)),
    tier(10, "Legend", 365, None),
];

const fn tier(rank: usize, name: &'static str, start_day: u32, end_day: Option<u32>) -> LevelTier {
    LevelTier {
        rank,
        name,
        start_day,
        end_day,
    }
}

/// The ladder itself. Stateless; all tiers are static configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelLadder;

impl LevelLadder {
    pub fn tiers() -> &'static [LevelTier] {
        &TIERS
    }

    /// Resolve a day count to its tier.
    ///
    /// Negative or NaN input resolves to the first tier.
    pub fn tier_for(elapsed_days: f64) -> &'static LevelTier {
        if elapsed_days.is_nan() || elapsed_days <= 0.0 {
            return &TIERS[0];
        }
        // Tiers are sorted by start_day; the last one starting at or below
        // the input is the match.
        let idx = TIERS.partition_point(|t| t.start_day as f64 <= elapsed_days);
        &TIERS[idx.saturating_sub(1)]
    }

    pub fn progress_for(elapsed_days: f64) -> TierProgress {
        let tier = *Self::tier_for(elapsed_days);
        let days = if elapsed_days > 0.0 { elapsed_days } else { 0.0 };
        match tier.span_days() {
            Some(span) => {
                let into = days - tier.start_day as f64;
                let fraction = (into / span as f64).clamp(0.0, 1.0 - f64::EPSILON);
                let next_start = tier.start_day as f64 + span as f64;
                TierProgress {
                    tier,
                    fraction_to_next: fraction,
                    remaining_to_next: Some((next_start - days).max(0.0)),
                }
            }
            None => TierProgress {
                tier,
                fraction_to_next: 1.0,
                remaining_to_next: None,
            },
        }
    }

    pub fn next_tier(rank: usize) -> Option<&'static LevelTier> {
        TIERS.get(rank + 1)
    }

    /// Check that the table is an ordered, gapless partition of `[0, ∞)`.
    pub fn validate() -> Result<(), String> {
        let first = TIERS.first().ok_or("ladder is empty")?;
        if first.start_day != 0 {
            return Err(format!("first tier starts at day {}", first.start_day));
        }
        for (i, pair) in TIERS.windows(2).enumerate() {
            let (cur, next) = (&pair[0], &pair[1]);
            if cur.rank != i {
                return Err(format!("tier '{}' has rank {} at index {i}", cur.name, cur.rank));
            }
            let end = cur
                .end_day
                .ok_or_else(|| format!("unbounded tier '{}' is not last", cur.name))?;
            if end < cur.start_day {
                return Err(format!("tier '{}' ends before it starts", cur.name));
            }
            if next.start_day != end + 1 {
                return Err(format!(
                    "gap or overlap between '{}' (ends {end}) and '{}' (starts {})",
                    cur.name, next.name, next.start_day
                ));
            }
        }
        match TIERS.last() {
            Some(last) if last.end_day.is_none() => Ok(()),
            _ => Err("final tier must be unbounded".into()),
        }
    }
}

/// Cumulative real days across finalized records plus an optional
/// in-flight attempt `(start, now)`.
pub fn lifetime_days(records: &[Record], active: Option<(DateTime<Utc>, DateTime<Utc>)>) -> f64 {
    let past: f64 = records.iter().map(Record::real_days).sum();
    let current = active
        .and_then(|(start, now)| real_days_between(start, now).ok())
        .unwrap_or(0.0);
    past + current
}
