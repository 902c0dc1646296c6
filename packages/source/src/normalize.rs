//! Conversion of raw provider records into normalized records.
//!
//! The provider reports counts that may be `null` or missing for early
//! dates, and has sent dates both as integers and as strings. Cumulative
//! counts are clamped at zero; daily increases keep their sign.

use covid_map_covid_models::{DailyRecord, DataQualityGrade, DateKey, NationalRecord};
use serde::Deserialize;

/// A provider date: `20200304` or `"20200304"`/`"2020-03-04"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDate {
    Int(u32),
    Text(String),
}

impl RawDate {
    fn to_key(&self) -> Option<DateKey> {
        match self {
            Self::Int(v) => Some(DateKey::new(*v)).filter(|k| k.to_naive().is_some()),
            Self::Text(s) => s.parse().ok(),
        }
    }
}

/// One state's daily row as sent by the provider.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStateDaily {
    state: String,
    date: RawDate,
    positive: Option<i64>,
    positive_increase: Option<i64>,
    death: Option<i64>,
    data_quality_grade: Option<String>,
    date_checked: Option<String>,
}

/// The national daily row as sent by the provider.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUsDaily {
    date: RawDate,
    positive: Option<i64>,
    positive_increase: Option<i64>,
    death: Option<i64>,
    date_checked: Option<String>,
}

fn non_negative(value: Option<i64>) -> u64 {
    value.and_then(|v| u64::try_from(v).ok()).unwrap_or(0)
}

/// Normalizes one raw state row. Returns `None` for rows without a usable
/// state code or date.
#[must_use]
pub fn normalize_daily(raw: serde_json::Value) -> Option<DailyRecord> {
    let raw: RawStateDaily = match serde_json::from_value(raw) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("Skipping malformed state record: {e}");
            return None;
        }
    };

    let state = raw.state.trim().to_uppercase();
    if state.is_empty() {
        log::warn!("Skipping state record with empty state code");
        return None;
    }
    let Some(date) = raw.date.to_key() else {
        log::warn!("Skipping {state} record with invalid date {:?}", raw.date);
        return None;
    };

    Some(DailyRecord {
        state,
        date,
        positive: non_negative(raw.positive),
        positive_increase: raw.positive_increase.unwrap_or(0),
        death: non_negative(raw.death),
        data_quality_grade: raw
            .data_quality_grade
            .as_deref()
            .map(DataQualityGrade::from_provider),
        date_checked: raw.date_checked,
    })
}

/// Normalizes one raw national row. Returns `None` for rows without a
/// usable date.
#[must_use]
pub fn normalize_national(raw: serde_json::Value) -> Option<NationalRecord> {
    let raw: RawUsDaily = match serde_json::from_value(raw) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("Skipping malformed national record: {e}");
            return None;
        }
    };

    let Some(date) = raw.date.to_key() else {
        log::warn!("Skipping national record with invalid date {:?}", raw.date);
        return None;
    };

    Some(NationalRecord {
        date,
        positive: non_negative(raw.positive),
        positive_increase: raw.positive_increase.unwrap_or(0),
        death: non_negative(raw.death),
        date_checked: raw.date_checked,
    })
}
