//! Calendar and timezone handling
//!
//! The marketplace operates on Chilean local time: eligibility windows,
//! invoice numbering, and monthly reports are all keyed to calendar months
//! in America/Santiago. This module provides the timezone wrapper and the
//! `MonthPeriod` value object those computations share.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Timezone wrapper with custom serialization support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Chilean local time, the platform's operating timezone
    pub fn santiago() -> Self {
        Self(chrono_tz::America::Santiago)
    }

    /// Converts a UTC datetime to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// Gets the start of day (00:00:00) in this timezone as UTC
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_opt(0, 0, 0)
            .unwrap()
            .and_local_timezone(self.0)
            .earliest()
            .expect("Invalid timezone conversion")
            .with_timezone(&Utc)
    }

    /// Gets the end of day (23:59:59.999999999) in this timezone as UTC
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap()
            .and_local_timezone(self.0)
            .latest()
            .expect("Invalid timezone conversion")
            .with_timezone(&Utc)
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self::santiago()
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error("Invalid year: {0}")]
    InvalidYear(i32),
}

/// A calendar month in a specific year
///
/// This is the period key for reimbursement windows, invoice numbering,
/// and monthly reports. The month is 1-based (1 = January).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthPeriod {
    pub year: i32,
    pub month: u32,
}

impl MonthPeriod {
    /// Creates a validated month period
    pub fn new(year: i32, month: u32) -> Result<Self, TemporalError> {
        if !(1..=12).contains(&month) {
            return Err(TemporalError::InvalidMonth(month));
        }
        if !(2000..=2100).contains(&year) {
            return Err(TemporalError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    /// The period containing the given instant, in the given timezone
    pub fn containing(instant: DateTime<Utc>, tz: Timezone) -> Self {
        let local = tz.to_local(instant);
        Self {
            year: local.year(),
            month: local.month(),
        }
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("validated on construction")
    }

    /// Last day of the month
    pub fn last_day(&self) -> NaiveDate {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .expect("validated on construction")
            .pred_opt()
            .expect("month start has a predecessor")
    }

    /// Start of the month (00:00:00 on the first day, local time) as UTC
    pub fn start(&self, tz: Timezone) -> DateTime<Utc> {
        tz.start_of_day(self.first_day())
    }

    /// End of the month (23:59:59 on the last day, local time) as UTC
    pub fn end(&self, tz: Timezone) -> DateTime<Utc> {
        tz.end_of_day(self.last_day())
    }

    /// Returns true if the instant falls within this calendar month
    pub fn contains(&self, instant: DateTime<Utc>, tz: Timezone) -> bool {
        instant >= self.start(tz) && instant <= self.end(tz)
    }

    /// Compact `YYYYMM` label used in invoice numbers
    pub fn label(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_month_period_validation() {
        assert!(MonthPeriod::new(2025, 1).is_ok());
        assert_eq!(
            MonthPeriod::new(2025, 13),
            Err(TemporalError::InvalidMonth(13))
        );
        assert_eq!(
            MonthPeriod::new(1999, 6),
            Err(TemporalError::InvalidYear(1999))
        );
    }

    #[test]
    fn test_last_day_handles_month_lengths() {
        assert_eq!(
            MonthPeriod::new(2025, 2).unwrap().last_day(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert_eq!(
            MonthPeriod::new(2024, 2).unwrap().last_day(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            MonthPeriod::new(2025, 12).unwrap().last_day(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_contains_uses_local_time() {
        let tz = Timezone::santiago();
        let period = MonthPeriod::new(2025, 1).unwrap();

        // 01:00 UTC on Feb 1 is still 22:00 Jan 31 in Santiago (UTC-3)
        let late_january = Utc.with_ymd_and_hms(2025, 2, 1, 1, 0, 0).unwrap();
        assert!(period.contains(late_january, tz));

        let february = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap();
        assert!(!period.contains(february, tz));
    }

    #[test]
    fn test_label() {
        assert_eq!(MonthPeriod::new(2025, 3).unwrap().label(), "202503");
    }
}
