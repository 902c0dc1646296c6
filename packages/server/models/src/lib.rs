#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the case map server.
//!
//! Frames, snapshots, and legends are serialized straight from the
//! playback crate's types; this crate adds the request parameters and the
//! envelopes around them.

use covid_map_covid_models::{DailyRecord, DateKey};
use covid_map_geography_models::{InteractionPolicy, OVERLAY_LAYER_ID, Viewport};
use covid_map_playback::PlaybackSnapshot;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Server version string.
    pub version: String,
}

/// Map setup for the frontend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapConfig {
    /// Access token for the map tile provider.
    pub access_token: String,
    pub viewport: Viewport,
    pub interaction: InteractionPolicy,
    /// Layer id the frontend must use for the state fill overlay.
    pub overlay_layer: String,
    /// Milliseconds between playback steps.
    pub tick_millis: u64,
}

impl ApiMapConfig {
    #[must_use]
    pub fn new(
        access_token: String,
        viewport: Viewport,
        interaction: InteractionPolicy,
        tick_millis: u64,
    ) -> Self {
        Self {
            access_token,
            viewport,
            interaction,
            overlay_layer: OVERLAY_LAYER_ID.to_string(),
            tick_millis,
        }
    }
}

/// Result of a playback command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCommandResult {
    /// `false` when the command was rejected (e.g. seeking while playing).
    pub applied: bool,
    /// State after the command.
    pub playback: PlaybackSnapshot,
}

/// Query parameters for `POST /api/playback/seek`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeekParams {
    /// Position in the date range.
    pub index: usize,
}

/// Query parameters for `GET /api/daily`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyParams {
    /// `YYYYMMDD` or `YYYY-MM-DD`.
    pub date: String,
}

/// Every state's record for one date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDaily {
    /// Date actually served. Earlier than requested when the provider had
    /// nothing for the requested date yet.
    pub date: DateKey,
    pub records: Vec<DailyRecord>,
}

/// Body of `POST /api/popup`: a click on the overlay.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    /// Region code (postal or FIPS) of the clicked feature.
    pub region: String,
    pub lng: f64,
    pub lat: f64,
}
