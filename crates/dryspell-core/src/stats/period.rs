//! Period selectors for statistics queries.
//!
//! Week, month and year periods resolve to half-open `[start, end)`
//! instants using calendar boundaries in the caller's time zone. Weeks
//! start on Monday.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Week,
    Month,
    Year,
    All,
}

impl std::str::FromStr for PeriodKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(PeriodKind::Week),
            "month" => Ok(PeriodKind::Month),
            "year" => Ok(PeriodKind::Year),
            "all" => Ok(PeriodKind::All),
            other => Err(format!("Unknown period: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StatsPeriod {
    /// The Monday-based week containing this date.
    Week { date: NaiveDate },
    Month { year: i32, month: u32 },
    Year { year: i32 },
    All,
}

impl StatsPeriod {
    /// Period of `kind` that contains `date`.
    pub fn containing(kind: PeriodKind, date: NaiveDate) -> Self {
        match kind {
            PeriodKind::Week => StatsPeriod::Week { date },
            PeriodKind::Month => StatsPeriod::Month {
                year: date.year(),
                month: date.month(),
            },
            PeriodKind::Year => StatsPeriod::Year { year: date.year() },
            PeriodKind::All => StatsPeriod::All,
        }
    }

    pub fn kind(&self) -> PeriodKind {
        match self {
            StatsPeriod::Week { .. } => PeriodKind::Week,
            StatsPeriod::Month { .. } => PeriodKind::Month,
            StatsPeriod::Year { .. } => PeriodKind::Year,
            StatsPeriod::All => PeriodKind::All,
        }
    }

    /// First and one-past-last local dates of the period; `None` for `All`.
    pub fn date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>, EngineError> {
        let range = match *self {
            StatsPeriod::All => return Ok(None),
            StatsPeriod::Week { date } => {
                let back = Days::new(u64::from(date.weekday().num_days_from_monday()));
                let monday = date
                    .checked_sub_days(back)
                    .ok_or_else(|| invalid(date.to_string()))?;
                let next_monday = monday
                    .checked_add_days(Days::new(7))
                    .ok_or_else(|| invalid(date.to_string()))?;
                (monday, next_monday)
            }
            StatsPeriod::Month { year, month } => {
                let start = NaiveDate::from_ymd_opt(year, month, 1)
                    .ok_or_else(|| invalid(format!("{year}-{month:02}")))?;
                let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
                let end = NaiveDate::from_ymd_opt(ny, nm, 1)
                    .ok_or_else(|| invalid(format!("{year}-{month:02}")))?;
                (start, end)
            }
            StatsPeriod::Year { year } => {
                let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| invalid(year.to_string()))?;
                let end =
                    NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or_else(|| invalid(year.to_string()))?;
                (start, end)
            }
        };
        Ok(Some(range))
    }

    /// Half-open `[start, end)` instants in `tz`; `None` for `All`.
    ///
    /// # Errors
    /// [`EngineError::InvalidPeriod`] for an out-of-range month or year, or
    /// a week that runs off the end of the calendar.
    pub fn bounds<Tz: TimeZone>(
        &self,
        tz: &Tz,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, EngineError> {
        let Some((first, past_end)) = self.date_range()? else {
            return Ok(None);
        };
        let start = local_midnight(tz, first).ok_or_else(|| invalid(first.to_string()))?;
        let end = local_midnight(tz, past_end).ok_or_else(|| invalid(past_end.to_string()))?;
        Ok(Some((start, end)))
    }

    /// Whether `instant` falls inside the period.
    pub fn contains<Tz: TimeZone>(&self, instant: DateTime<Utc>, tz: &Tz) -> Result<bool, EngineError> {
        Ok(match self.bounds(tz)? {
            Some((start, end)) => start <= instant && instant < end,
            None => true,
        })
    }
}

/// Earliest valid instant of `date` in `tz`. Midnight can be skipped by a
/// DST transition, in which case the first existing hour is used.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    (0..=3).find_map(|hour| {
        let naive = date.and_hms_opt(hour, 0, 0)?;
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

fn invalid(what: String) -> EngineError {
    EngineError::InvalidPeriod(what)
}
