//! Playback state and its transitions.
//!
//! Every change to the map's data or cursor goes through
//! [`PlaybackState::apply`]. The state never starts or stops timers
//! itself; it returns an [`Effect`] and the controller acts on it.

use std::sync::Arc;

use covid_map_covid_models::{
    DataNotice, DateKey, DateRange, NationalAggregateIndex, NationalRecord, TimeSeriesIndex,
};
use serde::Serialize;

/// The last region the user clicked, and where.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Postal code of the clicked region.
    pub region: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Inputs to the state machine.
#[derive(Debug, Clone)]
pub enum Action {
    /// A fresh per-state index replaced the previous one.
    DailyLoaded(TimeSeriesIndex),
    /// A fresh national index and its date range replaced the previous ones.
    NationalLoaded {
        index: NationalAggregateIndex,
        range: DateRange,
    },
    /// A load failed; existing data stays in place.
    LoadFailed { load: LoadKind, notice: DataNotice },
    /// Play/pause button.
    Toggle,
    /// One timer period elapsed.
    Tick,
    /// Jump directly to a position in the date range.
    Seek(usize),
    /// A region was clicked.
    Select(Selection),
    /// The detail popup was closed.
    Dismiss,
    /// Stop playback unconditionally (teardown).
    Stop,
}

/// Which of the two independent loads an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    /// Per-state history.
    Daily,
    /// National history, which also defines the date range.
    National,
}

/// What the controller must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Effect {
    /// State changed; nothing else to do.
    Applied,
    /// The action was rejected or had nothing to act on.
    Ignored,
    /// Entered `Playing`: acquire the ticker.
    StartTicker,
    /// Left `Playing`: release the ticker.
    CancelTicker,
}

/// The whole mutable state of the map, owned by one controller.
#[derive(Debug, Clone, Default)]
pub struct PlaybackState {
    series: Arc<TimeSeriesIndex>,
    national: Arc<NationalAggregateIndex>,
    dates: DateRange,
    active: Option<usize>,
    playing: bool,
    daily_notice: Option<DataNotice>,
    national_notice: Option<DataNotice>,
    selection: Option<Selection>,
}

impl PlaybackState {
    /// Applies one action.
    pub fn apply(&mut self, action: Action) -> Effect {
        match action {
            Action::DailyLoaded(index) => {
                self.series = Arc::new(index);
                self.daily_notice = None;
                Effect::Applied
            }
            Action::NationalLoaded { index, range } => self.replace_range(index, range),
            Action::LoadFailed { load, notice } => {
                match load {
                    LoadKind::Daily => self.daily_notice = Some(notice),
                    LoadKind::National => self.national_notice = Some(notice),
                }
                Effect::Applied
            }
            Action::Toggle => self.toggle(),
            Action::Tick => self.tick(),
            Action::Seek(index) => self.seek(index),
            Action::Select(selection) => {
                self.selection = Some(selection);
                Effect::Applied
            }
            Action::Dismiss => {
                if self.selection.take().is_some() {
                    Effect::Applied
                } else {
                    Effect::Ignored
                }
            }
            Action::Stop => self.stop(),
        }
    }

    fn replace_range(&mut self, index: NationalAggregateIndex, range: DateRange) -> Effect {
        let previous_date = self.active_date();
        self.national = Arc::new(index);
        self.dates = range;
        self.national_notice = None;

        // Keep showing the same day if it survived the refresh, otherwise
        // clamp. A first load opens on the most recent day.
        self.active = match (previous_date, self.active) {
            _ if self.dates.is_empty() => None,
            (Some(date), Some(old)) => self
                .dates
                .position(date)
                .or_else(|| self.dates.last_index().map(|last| old.min(last))),
            _ => self.dates.last_index(),
        };

        if self.dates.is_empty() && self.playing {
            self.playing = false;
            return Effect::CancelTicker;
        }
        Effect::Applied
    }

    fn toggle(&mut self) -> Effect {
        if self.playing {
            self.playing = false;
            return Effect::CancelTicker;
        }
        if self.dates.is_empty() {
            return Effect::Ignored;
        }
        if self.active.is_none() {
            self.active = Some(0);
        }
        self.playing = true;
        Effect::StartTicker
    }

    /// Advances one date, wrapping to the start after the last date.
    fn tick(&mut self) -> Effect {
        if !self.playing || self.dates.is_empty() {
            return Effect::Ignored;
        }
        let next = self.active.map_or(0, |i| (i + 1) % self.dates.len());
        self.active = Some(next);
        Effect::Applied
    }

    fn seek(&mut self, index: usize) -> Effect {
        if self.playing || index >= self.dates.len() {
            return Effect::Ignored;
        }
        self.active = Some(index);
        Effect::Applied
    }

    fn stop(&mut self) -> Effect {
        if self.playing {
            self.playing = false;
            Effect::CancelTicker
        } else {
            Effect::Ignored
        }
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub const fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// `DateRange[ActiveIndex]`.
    #[must_use]
    pub fn active_date(&self) -> Option<DateKey> {
        self.active.and_then(|i| self.dates.get(i))
    }

    #[must_use]
    pub const fn dates(&self) -> &DateRange {
        &self.dates
    }

    #[must_use]
    pub fn series(&self) -> &TimeSeriesIndex {
        &self.series
    }

    /// National aggregate for the active date.
    #[must_use]
    pub fn active_national(&self) -> Option<&NationalRecord> {
        self.active_date().and_then(|d| self.national.get(d))
    }

    /// The notice of whichever load last failed and has not since
    /// succeeded. Daily failures take precedence.
    #[must_use]
    pub const fn notice(&self) -> Option<DataNotice> {
        match self.daily_notice {
            Some(notice) => Some(notice),
            None => self.national_notice,
        }
    }

    #[must_use]
    pub const fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }
}
