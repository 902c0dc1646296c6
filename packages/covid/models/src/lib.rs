#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Daily case record types and time-series index structures.
//!
//! These are the normalized shapes every other crate works with. Raw
//! provider payloads are converted into [`DailyRecord`] and
//! [`NationalRecord`] by the source crate, then grouped into a
//! [`TimeSeriesIndex`] (region -> date -> record) and a
//! [`NationalAggregateIndex`] (date -> record).

pub mod date;
pub mod index;

pub use date::DateKey;
pub use index::{DateRange, NationalAggregateIndex, TimeSeriesIndex};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Data-quality grade assigned by the provider to a state's reporting.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumString,
)]
pub enum DataQualityGrade {
    /// `A+`
    #[serde(rename = "A+")]
    #[strum(serialize = "A+")]
    APlus,
    /// `A`
    #[serde(rename = "A")]
    #[strum(serialize = "A")]
    A,
    /// `B`
    #[serde(rename = "B")]
    #[strum(serialize = "B")]
    B,
    /// `C`
    #[serde(rename = "C")]
    #[strum(serialize = "C")]
    C,
    /// `D`
    #[serde(rename = "D")]
    #[strum(serialize = "D")]
    D,
    /// `F`
    #[serde(rename = "F")]
    #[strum(serialize = "F")]
    F,
    /// Any other grade string, kept as the provider sent it.
    #[serde(untagged)]
    #[strum(default)]
    Other(String),
}

impl DataQualityGrade {
    /// Parses a provider grade string. Unrecognized values are kept in
    /// [`Self::Other`].
    #[must_use]
    pub fn from_provider(value: &str) -> Self {
        let value = value.trim();
        value
            .parse()
            .unwrap_or_else(|_| Self::Other(value.to_string()))
    }

    /// The grade as the provider writes it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
            Self::Other(grade) => grade,
        }
    }
}

impl std::fmt::Display for DataQualityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single region's case statistics for a single date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    /// Two-letter postal code (e.g. `"NY"`).
    pub state: String,
    /// Report date.
    pub date: DateKey,
    /// Cumulative positive cases.
    pub positive: u64,
    /// Change in positive cases since the previous report. Can be
    /// negative after provider corrections.
    pub positive_increase: i64,
    /// Cumulative deaths.
    pub death: u64,
    /// Provider-assigned data-quality grade.
    pub data_quality_grade: Option<DataQualityGrade>,
    /// When the provider last checked this state's numbers (ISO-like).
    pub date_checked: Option<String>,
}

impl DailyRecord {
    /// Zero-valued record used when a region has no data for a date.
    #[must_use]
    pub fn empty(state: impl Into<String>, date: DateKey) -> Self {
        Self {
            state: state.into(),
            date,
            positive: 0,
            positive_increase: 0,
            death: 0,
            data_quality_grade: None,
            date_checked: None,
        }
    }
}

/// Why the map has no (or stale) data to show.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DataNotice {
    /// The provider returned an error payload, or the request failed.
    DataUnavailable,
    /// The provider answered with a structurally valid but empty dataset.
    NoData,
}

impl DataNotice {
    /// User-facing notice text.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::DataUnavailable => "Data is not yet available. Showing the last loaded data.",
            Self::NoData => "No data has been reported for this period yet.",
        }
    }
}

/// National-level aggregate for a single date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NationalRecord {
    /// Report date.
    pub date: DateKey,
    /// Cumulative positive cases across all states.
    pub positive: u64,
    /// Change in positive cases since the previous report.
    pub positive_increase: i64,
    /// Cumulative deaths across all states.
    pub death: u64,
    /// When the provider last checked the national numbers.
    pub date_checked: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_parses_plus() {
        assert_eq!(DataQualityGrade::from_provider("A+"), DataQualityGrade::APlus);
        assert_eq!(DataQualityGrade::from_provider(" B "), DataQualityGrade::B);
    }

    #[test]
    fn unrecognized_grade_is_kept() {
        let grade = DataQualityGrade::from_provider(" N/A ");
        assert_eq!(grade, DataQualityGrade::Other("N/A".to_string()));
        assert_eq!(grade.to_string(), "N/A");
        assert_eq!(serde_json::to_string(&grade).unwrap(), "\"N/A\"");

        let parsed: DataQualityGrade = serde_json::from_str("\"N/A\"").unwrap();
        assert_eq!(parsed, grade);
        let parsed: DataQualityGrade = serde_json::from_str("\"B\"").unwrap();
        assert_eq!(parsed, DataQualityGrade::B);
    }

    #[test]
    fn grade_serializes_as_provider_string() {
        let json = serde_json::to_string(&DataQualityGrade::APlus).unwrap();
        assert_eq!(json, "\"A+\"");
    }

    #[test]
    fn notice_serializes_screaming_snake() {
        let json = serde_json::to_string(&DataNotice::DataUnavailable).unwrap();
        assert_eq!(json, "\"DATA_UNAVAILABLE\"");
        assert_eq!(DataNotice::NoData.to_string(), "NO_DATA");
    }

    #[test]
    fn empty_record_has_zero_counts() {
        let record = DailyRecord::empty("WY", DateKey::new(20200304));
        assert_eq!(record.positive, 0);
        assert_eq!(record.positive_increase, 0);
        assert_eq!(record.death, 0);
        assert_eq!(record.state, "WY");
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = DailyRecord::empty("NY", DateKey::new(20200304));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["positiveIncrease"], 0);
        assert_eq!(value["date"], 20200304);
        assert!(value.get("dataQualityGrade").is_some());
    }
}
