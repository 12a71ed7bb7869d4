use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Anything that sits on the ledger timeline.
///
/// Records are totally ordered by `(instant, sequence)`. The sequence is the
/// store's monotonic insertion counter and only breaks ties between records
/// sharing the same instant, so two observers that received the same records
/// in different arrival orders still agree on the order.
pub trait Chronological {
    fn instant(&self) -> DateTime<Utc>;
    fn sequence(&self) -> i64;

    fn chronological_key(&self) -> (DateTime<Utc>, i64) {
        (self.instant(), self.sequence())
    }
}

/// Sorts records ascending by `(instant, sequence)`.
pub fn sort_chronologically<T: Chronological>(items: &mut [T]) {
    items.sort_by_key(|item| item.chronological_key());
}

/// Converts a UTC instant to a calendar date in the given timezone.
///
/// This is the single conversion used to decide which scope a trade or
/// movement falls into.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Parses an IANA timezone name such as `America/New_York`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| Error::InvalidConfigValue(format!("Unknown timezone '{}'", name)))
}

/// Calendar length of an audit scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScopeUnit {
    Day,
    /// ISO week, Monday through Sunday
    Week,
    Month,
    Quarter,
    Year,
}

impl ScopeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeUnit::Day => "DAY",
            ScopeUnit::Week => "WEEK",
            ScopeUnit::Month => "MONTH",
            ScopeUnit::Quarter => "QUARTER",
            ScopeUnit::Year => "YEAR",
        }
    }
}

/// Half-open calendar window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ScopeWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

/// Returns the calendar window of length `unit` that contains `as_of`.
pub fn scope_window(unit: ScopeUnit, as_of: NaiveDate) -> Result<ScopeWindow> {
    let start = match unit {
        ScopeUnit::Day => Some(as_of),
        ScopeUnit::Week => {
            as_of.checked_sub_days(Days::new(as_of.weekday().num_days_from_monday() as u64))
        }
        ScopeUnit::Month => NaiveDate::from_ymd_opt(as_of.year(), as_of.month(), 1),
        ScopeUnit::Quarter => {
            let first_month = ((as_of.month() - 1) / 3) * 3 + 1;
            NaiveDate::from_ymd_opt(as_of.year(), first_month, 1)
        }
        ScopeUnit::Year => NaiveDate::from_ymd_opt(as_of.year(), 1, 1),
    };
    let start = start.ok_or_else(|| out_of_range(unit, as_of))?;

    let end = match unit {
        ScopeUnit::Day => start.checked_add_days(Days::new(1)),
        ScopeUnit::Week => start.checked_add_days(Days::new(7)),
        ScopeUnit::Month => start.checked_add_months(Months::new(1)),
        ScopeUnit::Quarter => start.checked_add_months(Months::new(3)),
        ScopeUnit::Year => start.checked_add_months(Months::new(12)),
    };
    let end = end.ok_or_else(|| out_of_range(unit, as_of))?;

    Ok(ScopeWindow { start, end })
}

fn out_of_range(unit: ScopeUnit, as_of: NaiveDate) -> Error {
    Error::invalid_input(format!(
        "{} window around {} is outside the supported date range",
        unit.as_str(),
        as_of
    ))
}
