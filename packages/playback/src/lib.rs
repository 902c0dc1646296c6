#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Date playback for the case map.
//!
//! Holds the cursor into the available date range, advances it on a timer
//! while playing (wrapping back to the first date after the last), and
//! joins the active date's per-state records onto the boundary geometry
//! for rendering.

pub mod controller;
pub mod legend;
pub mod merge;
pub mod state;
pub mod ticker;

pub use controller::{
    DEFAULT_TICK_PERIOD, Frame, MIN_TICK_PERIOD, PlaybackController, PlaybackHandle,
    PlaybackSnapshot, PopupDetail,
};
pub use legend::{ColorScale, ColorScaleError, Legend, LegendRow};
pub use state::{Action, Effect, LoadKind, PlaybackState, Selection};

/// Errors from talking to a running controller.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    /// The controller task has exited.
    #[error("playback controller is no longer running")]
    Closed,
}
