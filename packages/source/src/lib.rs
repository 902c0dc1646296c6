#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Case data provider trait and time-series normalization.
//!
//! A [`DataProvider`] knows how to request raw per-state and national
//! daily payloads. The [`store::TimeSeriesStore`] turns those payloads
//! into the indexed shapes the playback controller consumes.

pub mod covidtracking;
pub mod fetch;
pub mod normalize;
pub mod store;

use async_trait::async_trait;
use covid_map_covid_models::{DataNotice, DateKey};

/// Errors that can occur while loading case data.
///
/// None of these are fatal: callers keep the data they already have and
/// surface a [`DataNotice`].
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The provider answered with an error payload or a non-2xx status.
    #[error("Data unavailable: {reason}")]
    DataUnavailable {
        /// What the provider reported.
        reason: String,
    },

    /// The provider answered with a valid but empty dataset.
    #[error("No data: {context}")]
    NoData {
        /// Which request came back empty.
        context: String,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SourceError {
    /// Classifies the error for display. Transport and parse failures are
    /// treated the same as a provider error payload.
    #[must_use]
    pub const fn notice(&self) -> DataNotice {
        match self {
            Self::NoData { .. } => DataNotice::NoData,
            Self::DataUnavailable { .. } | Self::Http(_) | Self::Json(_) => {
                DataNotice::DataUnavailable
            }
        }
    }
}

/// A source of raw daily case payloads.
///
/// Implementations return the provider's JSON as-is; classification and
/// normalization happen in [`store::TimeSeriesStore`].
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Short identifier used in log messages.
    fn name(&self) -> &str;

    /// Per-state daily rows. `None` requests the full history; `Some`
    /// narrows the request to a single date.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails.
    async fn states_daily(&self, date: Option<DateKey>) -> Result<serde_json::Value, SourceError>;

    /// National daily rows for the full history.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails.
    async fn us_daily(&self) -> Result<serde_json::Value, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_classification() {
        assert_eq!(
            SourceError::NoData {
                context: "states".to_string()
            }
            .notice(),
            DataNotice::NoData
        );
        assert_eq!(
            SourceError::DataUnavailable {
                reason: "boom".to_string()
            }
            .notice(),
            DataNotice::DataUnavailable
        );
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            SourceError::Json(json_err).notice(),
            DataNotice::DataUnavailable
        );
    }
}
