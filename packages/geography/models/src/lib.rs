#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region codes and map presentation types.
//!
//! These types describe how the boundary layer is presented to the map
//! frontend: which regions exist, where the camera starts, and which
//! gestures the overlay is allowed to handle.

pub mod fips;

use serde::{Deserialize, Serialize};

/// Layer id of the state fill overlay on the frontend map.
pub const OVERLAY_LAYER_ID: &str = "states-join";

/// Camera position for the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    /// Camera tilt in degrees.
    pub pitch: f64,
}

impl Default for Viewport {
    /// Continental US, slightly tilted.
    fn default() -> Self {
        Self {
            latitude: 48.602_885_905_943_54,
            longitude: -95.603_366_489_309_55,
            zoom: 3.0,
            pitch: 25.0,
        }
    }
}

/// Which map gestures the frontend should let through.
///
/// Pan gestures are suppressed unless they start on the overlay layer, so
/// dragging over empty map space does not move the camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionPolicy {
    /// Layer a pan must originate from. `None` allows panning anywhere.
    pub pan_origin_layer: Option<String>,
    pub scroll_zoom: bool,
}

impl Default for InteractionPolicy {
    fn default() -> Self {
        Self {
            pan_origin_layer: Some(OVERLAY_LAYER_ID.to_string()),
            scroll_zoom: true,
        }
    }
}

impl InteractionPolicy {
    /// Whether a pan starting on `origin_layer` should move the camera.
    #[must_use]
    pub fn allows_pan(&self, origin_layer: Option<&str>) -> bool {
        match &self.pan_origin_layer {
            None => true,
            Some(required) => origin_layer == Some(required.as_str()),
        }
    }
}
