//! HTTP provider for the COVID Tracking Project API.
//!
//! Endpoints:
//!
//! * `{base}/api/states/daily`: full per-state history
//! * `{base}/api/states/daily?date=YYYYMMDD`: one day for every state
//! * `{base}/api/us/daily`: national history

use std::time::Duration;

use async_trait::async_trait;
use covid_map_covid_models::DateKey;

use crate::{DataProvider, SourceError, fetch};

/// Public API root.
pub const DEFAULT_BASE_URL: &str = "https://covidtracking.com";

/// Per-request timeout. The full state history is a multi-megabyte body.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("covid-map/", env!("CARGO_PKG_VERSION"));

/// [`DataProvider`] backed by the COVID Tracking Project REST API.
pub struct CovidTrackingProvider {
    client: reqwest::Client,
    base_url: String,
}

impl CovidTrackingProvider {
    /// Creates a provider rooted at `base_url` (no trailing slash needed).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn states_daily_url(&self) -> String {
        format!("{}/api/states/daily", self.base_url)
    }

    fn us_daily_url(&self) -> String {
        format!("{}/api/us/daily", self.base_url)
    }
}

#[async_trait]
impl DataProvider for CovidTrackingProvider {
    fn name(&self) -> &str {
        "covidtracking"
    }

    async fn states_daily(&self, date: Option<DateKey>) -> Result<serde_json::Value, SourceError> {
        let url = self.states_daily_url();
        let mut request = self.client.get(&url);
        if let Some(date) = date {
            request = request.query(&[("date", date.value())]);
            log::debug!("GET {url}?date={}", date.value());
        } else {
            log::debug!("GET {url}");
        }
        fetch::send_json(request).await
    }

    async fn us_daily(&self) -> Result<serde_json::Value, SourceError> {
        let url = self.us_daily_url();
        log::debug!("GET {url}");
        fetch::send_json(self.client.get(&url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_endpoint_urls() {
        let provider = CovidTrackingProvider::new("https://example.com/").unwrap();
        assert_eq!(
            provider.states_daily_url(),
            "https://example.com/api/states/daily"
        );
        assert_eq!(provider.us_daily_url(), "https://example.com/api/us/daily");
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let provider = CovidTrackingProvider::new("http://127.0.0.1:9").unwrap();
        let err = provider.us_daily().await.unwrap_err();
        assert!(matches!(err, SourceError::Http(_)));
        assert_eq!(err.notice(), covid_map_covid_models::DataNotice::DataUnavailable);
    }
}
