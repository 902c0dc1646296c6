//! `YYYYMMDD` date keys.
//!
//! The provider identifies every report by an integer date such as
//! `20200304`. [`DateKey`] keeps that representation (so it orders and
//! hashes cheaply) and converts to [`chrono::NaiveDate`] for arithmetic
//! and display.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// An integer date in `YYYYMMDD` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(u32);

impl DateKey {
    /// Wraps a raw `YYYYMMDD` integer without validating it.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `YYYYMMDD` integer.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Converts a calendar date. Returns `None` for years before 0.
    #[must_use]
    pub fn from_naive(date: NaiveDate) -> Option<Self> {
        let year = u32::try_from(date.year()).ok()?;
        Some(Self(year * 10_000 + date.month() * 100 + date.day()))
    }

    /// Converts to a calendar date, or `None` if the key is not a real date.
    #[must_use]
    pub fn to_naive(self) -> Option<NaiveDate> {
        let year = i32::try_from(self.0 / 10_000).ok()?;
        NaiveDate::from_ymd_opt(year, (self.0 / 100) % 100, self.0 % 100)
    }

    /// The calendar day before this one.
    #[must_use]
    pub fn previous_day(self) -> Option<Self> {
        self.to_naive()
            .and_then(|d| d.checked_sub_days(Days::new(1)))
            .and_then(Self::from_naive)
    }

    /// The calendar day after this one.
    #[must_use]
    pub fn next_day(self) -> Option<Self> {
        self.to_naive()
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .and_then(Self::from_naive)
    }

    /// Long display label, e.g. `"March 4th, 2020"`.
    ///
    /// Falls back to the raw integer when the key is not a valid date.
    #[must_use]
    pub fn long_label(self) -> String {
        self.to_naive().map_or_else(
            || self.0.to_string(),
            |d| {
                format!(
                    "{} {}{}, {}",
                    d.format("%B"),
                    d.day(),
                    ordinal_suffix(d.day()),
                    d.year()
                )
            },
        )
    }
}

const fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_naive() {
            Some(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Error returned when a string is neither `YYYYMMDD` nor `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDateKeyError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for InvalidDateKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid date {:?}: expected YYYYMMDD or YYYY-MM-DD",
            self.input
        )
    }
}

impl std::error::Error for InvalidDateKeyError {}

impl FromStr for DateKey {
    type Err = InvalidDateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || InvalidDateKeyError {
            input: s.to_string(),
        };

        if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
            let key = Self(s.parse().map_err(|_| err())?);
            return key.to_naive().map(|_| key).ok_or_else(err);
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(Self::from_naive)
            .ok_or_else(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naive_roundtrip() {
        let key = DateKey::new(20200304);
        let date = key.to_naive().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 3, 4).unwrap());
        assert_eq!(DateKey::from_naive(date), Some(key));
    }

    #[test]
    fn previous_day_crosses_month() {
        assert_eq!(
            DateKey::new(20200301).previous_day(),
            Some(DateKey::new(20200229))
        );
    }

    #[test]
    fn next_day_crosses_year() {
        assert_eq!(
            DateKey::new(20201231).next_day(),
            Some(DateKey::new(20210101))
        );
    }

    #[test]
    fn invalid_key_has_no_neighbors() {
        assert_eq!(DateKey::new(20201332).previous_day(), None);
        assert_eq!(DateKey::new(20201332).to_string(), "20201332");
    }

    #[test]
    fn long_labels() {
        assert_eq!(DateKey::new(20200304).long_label(), "March 4th, 2020");
        assert_eq!(DateKey::new(20200401).long_label(), "April 1st, 2020");
        assert_eq!(DateKey::new(20200412).long_label(), "April 12th, 2020");
        assert_eq!(DateKey::new(20200422).long_label(), "April 22nd, 2020");
        assert_eq!(DateKey::new(20200523).long_label(), "May 23rd, 2020");
    }

    #[test]
    fn parses_both_forms() {
        assert_eq!("20200304".parse::<DateKey>(), Ok(DateKey::new(20200304)));
        assert_eq!("2020-03-04".parse::<DateKey>(), Ok(DateKey::new(20200304)));
        assert!("2020-13-04".parse::<DateKey>().is_err());
        assert!("20201304".parse::<DateKey>().is_err());
        assert!("yesterday".parse::<DateKey>().is_err());
    }

    #[test]
    fn orders_numerically() {
        assert!(DateKey::new(20200131) < DateKey::new(20200201));
    }
}
