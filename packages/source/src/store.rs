//! Fetch-and-normalize for per-state and national time series.

use std::sync::Arc;

use covid_map_covid_models::{DateKey, DateRange, NationalAggregateIndex, TimeSeriesIndex};

use crate::fetch::records_from_payload;
use crate::normalize::{normalize_daily, normalize_national};
use crate::{DataProvider, SourceError};

/// Loads case data from a [`DataProvider`] and groups it into indexes.
///
/// The store holds no data itself: every call produces a fresh index that
/// the caller swaps in wholesale. On error the caller keeps its previous
/// index. Nothing is retried.
#[derive(Clone)]
pub struct TimeSeriesStore {
    provider: Arc<dyn DataProvider>,
}

impl TimeSeriesStore {
    #[must_use]
    pub const fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self { provider }
    }

    /// Loads the full per-state history, grouped by region then date.
    ///
    /// # Errors
    ///
    /// * [`SourceError::DataUnavailable`] (or a transport variant) if the
    ///   provider fails or reports an error.
    /// * [`SourceError::NoData`] if the provider returns no records.
    pub async fn load_daily(&self) -> Result<TimeSeriesIndex, SourceError> {
        let payload = self.provider.states_daily(None).await?;
        let index = self.build_daily_index(payload, "states daily history")?;
        log::info!(
            "{}: loaded {} state records across {} regions",
            self.provider.name(),
            index.len(),
            index.region_count()
        );
        Ok(index)
    }

    /// Loads the national history and derives the ascending date range.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::load_daily`].
    pub async fn load_national(&self) -> Result<(NationalAggregateIndex, DateRange), SourceError> {
        let payload = self.provider.us_daily().await?;
        let raw = records_from_payload(payload, "us daily history")?;
        let total = raw.len();

        let mut index = NationalAggregateIndex::default();
        for record in raw.into_iter().filter_map(normalize_national) {
            let date = record.date;
            if index.insert(record).is_some() {
                log::warn!("Duplicate national record for {date}; keeping the later one");
            }
        }

        if index.is_empty() {
            return Err(SourceError::NoData {
                context: format!("us daily history ({total} unusable records)"),
            });
        }

        let range = index.date_range();
        log::info!(
            "{}: loaded {} national records ({} to {})",
            self.provider.name(),
            index.len(),
            range.first().map_or_else(String::new, |d| d.to_string()),
            range.last().map_or_else(String::new, |d| d.to_string()),
        );
        Ok((index, range))
    }

    /// Loads every state's record for a single date.
    ///
    /// When `date` has nothing yet (the provider has not published today's
    /// numbers), falls back once to the previous day. Returns the date that
    /// was actually served.
    ///
    /// # Errors
    ///
    /// Returns the fallback request's error when both dates fail, or the
    /// original error when `date` has no previous day.
    pub async fn load_daily_for(
        &self,
        date: DateKey,
    ) -> Result<(DateKey, TimeSeriesIndex), SourceError> {
        match self.load_single_date(date).await {
            Ok(index) => Ok((date, index)),
            Err(e) => {
                let Some(previous) = date.previous_day() else {
                    return Err(e);
                };
                log::info!(
                    "{}: no data for {date} ({e}); falling back to {previous}",
                    self.provider.name()
                );
                let index = self.load_single_date(previous).await?;
                Ok((previous, index))
            }
        }
    }

    async fn load_single_date(&self, date: DateKey) -> Result<TimeSeriesIndex, SourceError> {
        let payload = self.provider.states_daily(Some(date)).await?;
        self.build_daily_index(payload, &format!("states on {date}"))
    }

    fn build_daily_index(
        &self,
        payload: serde_json::Value,
        context: &str,
    ) -> Result<TimeSeriesIndex, SourceError> {
        let raw = records_from_payload(payload, context)?;
        let total = raw.len();

        let mut index = TimeSeriesIndex::default();
        for record in raw.into_iter().filter_map(normalize_daily) {
            let (state, date) = (record.state.clone(), record.date);
            if index.insert(record).is_some() {
                log::warn!(
                    "{}: duplicate record for {state} on {date}; keeping the later one",
                    self.provider.name()
                );
            }
        }

        if index.is_empty() {
            return Err(SourceError::NoData {
                context: format!("{context} ({total} unusable records)"),
            });
        }
        Ok(index)
    }
}
