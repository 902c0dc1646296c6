//! The playback controller and its actor handle.
//!
//! [`PlaybackController`] owns the [`PlaybackState`], the static boundary
//! geometry, the color scale, and the ticker. [`PlaybackHandle::spawn`]
//! moves a controller into its own task; fetch completions, ticks, and
//! user commands all arrive on that task's single queue and are applied
//! one at a time.

use std::sync::Arc;
use std::time::Duration;

use covid_map_covid_models::{DataNotice, DateKey, NationalRecord};
use covid_map_geography_models::fips::postal_to_name;
use geojson::FeatureCollection;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::legend::{ColorScale, Legend};
use crate::merge::compute_merged_geometry;
use crate::state::{Action, Effect, PlaybackState};
use crate::ticker::Ticker;
use crate::PlaybackError;

/// Default interval between playback steps.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(500);

/// Shortest accepted tick period. A zero period would make the timer
/// panic.
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

const COMMAND_BUFFER: usize = 64;

/// Messages processed by the controller task.
pub enum Command {
    Dispatch {
        action: Action,
        reply: Option<oneshot::Sender<(Effect, PlaybackSnapshot)>>,
    },
    Tick {
        generation: u64,
    },
    Snapshot(oneshot::Sender<PlaybackSnapshot>),
    Frame(oneshot::Sender<Frame>),
    Popup(oneshot::Sender<Option<PopupDetail>>),
}

/// Cursor and status, without geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub playing: bool,
    pub active_index: Option<usize>,
    pub active_date: Option<DateKey>,
    /// e.g. `"March 4th, 2020"`.
    pub active_label: Option<String>,
    pub first_date: Option<DateKey>,
    pub last_date: Option<DateKey>,
    pub date_count: usize,
    pub notice: Option<DataNotice>,
    pub national: Option<NationalRecord>,
}

/// Everything needed to draw one frame of the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub playback: PlaybackSnapshot,
    /// `None` until both data and a date range are available.
    pub geometry: Option<FeatureCollection>,
    pub legend: Legend,
}

/// Details for the popup of the last clicked region.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupDetail {
    pub region: String,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub date: Option<DateKey>,
    pub positive: u64,
    pub positive_increase: i64,
    pub death: u64,
    /// Provider's last-checked date, formatted like `"March 4th, 2020"`.
    pub last_updated: Option<String>,
}

/// Owns all playback state and the resources tied to it.
pub struct PlaybackController {
    state: PlaybackState,
    geometry: Arc<FeatureCollection>,
    scale: ColorScale,
    tick_period: Duration,
    queue: Option<mpsc::WeakSender<Command>>,
    ticker: Option<Ticker>,
    generation: u64,
}

impl PlaybackController {
    /// Periods shorter than [`MIN_TICK_PERIOD`] are raised to it.
    #[must_use]
    pub fn new(geometry: Arc<FeatureCollection>, scale: ColorScale, tick_period: Duration) -> Self {
        if tick_period < MIN_TICK_PERIOD {
            log::warn!("Tick period {tick_period:?} is too short; using {MIN_TICK_PERIOD:?}");
        }
        let tick_period = tick_period.max(MIN_TICK_PERIOD);
        Self {
            state: PlaybackState::default(),
            geometry,
            scale,
            tick_period,
            queue: None,
            ticker: None,
            generation: 0,
        }
    }

    /// Applies an action and carries out its effect.
    pub fn dispatch(&mut self, action: Action) -> Effect {
        let effect = self.state.apply(action);
        match effect {
            Effect::StartTicker => self.start_ticker(),
            Effect::CancelTicker => self.cancel_ticker(),
            Effect::Applied | Effect::Ignored => {}
        }
        effect
    }

    /// Handles a tick from the ticker tagged `generation`. Ticks from a
    /// ticker that has since been cancelled are dropped.
    pub fn on_tick(&mut self, generation: u64) -> Effect {
        if self.ticker.as_ref().map(Ticker::generation) == Some(generation) {
            self.dispatch(Action::Tick)
        } else {
            log::trace!("Dropping stale tick from ticker {generation}");
            Effect::Ignored
        }
    }

    fn start_ticker(&mut self) {
        self.cancel_ticker();
        let Some(queue) = self.queue.clone() else {
            log::debug!("No command queue attached; ticks must be driven manually");
            return;
        };
        self.generation += 1;
        self.ticker = Some(Ticker::start(self.tick_period, self.generation, queue));
    }

    fn cancel_ticker(&mut self) {
        self.ticker = None;
    }

    /// Stops playback and releases the ticker.
    pub fn teardown(&mut self) {
        let _ = self.dispatch(Action::Stop);
        self.cancel_ticker();
    }

    #[must_use]
    pub const fn state(&self) -> &PlaybackState {
        &self.state
    }

    #[must_use]
    pub const fn has_ticker(&self) -> bool {
        self.ticker.is_some()
    }

    #[must_use]
    pub const fn tick_period(&self) -> Duration {
        self.tick_period
    }

    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        let active_date = self.state.active_date();
        PlaybackSnapshot {
            playing: self.state.is_playing(),
            active_index: self.state.active_index(),
            active_date,
            active_label: active_date.map(DateKey::long_label),
            first_date: self.state.dates().first(),
            last_date: self.state.dates().last(),
            date_count: self.state.dates().len(),
            notice: self.state.notice(),
            national: self.state.active_national().cloned(),
        }
    }

    /// Boundary geometry annotated with the active date's records.
    ///
    /// Recomputed on every call. `None` when there is no active date or no
    /// per-state data yet.
    #[must_use]
    pub fn merged_geometry(&self) -> Option<FeatureCollection> {
        let date = self.state.active_date()?;
        if self.state.series().is_empty() {
            return None;
        }
        Some(compute_merged_geometry(
            &self.geometry,
            self.state.series(),
            date,
        ))
    }

    #[must_use]
    pub fn legend(&self) -> Legend {
        self.scale.legend()
    }

    #[must_use]
    pub fn frame(&self) -> Frame {
        Frame {
            playback: self.snapshot(),
            geometry: self.merged_geometry(),
            legend: self.legend(),
        }
    }

    /// Popup details for the selected region at the active date.
    #[must_use]
    pub fn popup(&self) -> Option<PopupDetail> {
        let selection = self.state.selection()?;
        let date = self.state.active_date();
        let record = date.and_then(|d| self.state.series().get(&selection.region, d));

        Some(PopupDetail {
            region: selection.region.clone(),
            name: postal_to_name(&selection.region)
                .unwrap_or(selection.region.as_str())
                .to_string(),
            longitude: selection.longitude,
            latitude: selection.latitude,
            date,
            positive: record.map_or(0, |r| r.positive),
            positive_increase: record.map_or(0, |r| r.positive_increase),
            death: record.map_or(0, |r| r.death),
            last_updated: record
                .and_then(|r| r.date_checked.as_deref())
                .and_then(checked_label),
        })
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Dispatch { action, reply } => {
                let effect = self.dispatch(action);
                if let Some(reply) = reply {
                    let _ = reply.send((effect, self.snapshot()));
                }
            }
            Command::Tick { generation } => {
                let _ = self.on_tick(generation);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Command::Frame(reply) => {
                let _ = reply.send(self.frame());
            }
            Command::Popup(reply) => {
                let _ = reply.send(self.popup());
            }
        }
    }
}

/// `"2020-03-20T20:00:00Z"` -> `"March 20th, 2020"`.
fn checked_label(checked: &str) -> Option<String> {
    checked
        .get(..10)
        .and_then(|day| day.parse::<DateKey>().ok())
        .map(DateKey::long_label)
}

/// Cloneable handle to a controller running in its own task.
///
/// The task exits, tearing the controller down, once every handle is
/// dropped.
#[derive(Clone)]
pub struct PlaybackHandle {
    tx: mpsc::Sender<Command>,
}

impl PlaybackHandle {
    /// Moves `controller` into a new task and returns a handle to it.
    #[must_use]
    pub fn spawn(mut controller: PlaybackController) -> Self {
        let (tx, mut rx) = mpsc::channel(COMMAND_BUFFER);
        controller.queue = Some(tx.downgrade());

        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                controller.handle(command);
            }
            controller.teardown();
            log::debug!("Playback controller stopped");
        });

        Self { tx }
    }

    /// Applies an action and waits for its effect.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Closed`] if the controller task is gone.
    pub async fn dispatch(&self, action: Action) -> Result<Effect, PlaybackError> {
        Ok(self.apply(action).await?.0)
    }

    /// Applies an action and returns its effect together with the state
    /// right after it, before any other queued command runs.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Closed`] if the controller task is gone.
    pub async fn apply(&self, action: Action) -> Result<(Effect, PlaybackSnapshot), PlaybackError> {
        self.request(move |reply| Command::Dispatch {
            action,
            reply: Some(reply),
        })
        .await
    }

    /// Queues an action without waiting for it to be applied.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Closed`] if the controller task is gone.
    pub async fn publish(&self, action: Action) -> Result<(), PlaybackError> {
        self.send(Command::Dispatch {
            action,
            reply: None,
        })
        .await
    }

    /// # Errors
    ///
    /// Returns [`PlaybackError::Closed`] if the controller task is gone.
    pub async fn snapshot(&self) -> Result<PlaybackSnapshot, PlaybackError> {
        self.request(Command::Snapshot).await
    }

    /// # Errors
    ///
    /// Returns [`PlaybackError::Closed`] if the controller task is gone.
    pub async fn frame(&self) -> Result<Frame, PlaybackError> {
        self.request(Command::Frame).await
    }

    /// # Errors
    ///
    /// Returns [`PlaybackError::Closed`] if the controller task is gone.
    pub async fn popup(&self) -> Result<Option<PopupDetail>, PlaybackError> {
        self.request(Command::Popup).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, PlaybackError> {
        let (reply, rx) = oneshot::channel();
        self.send(make(reply)).await?;
        rx.await.map_err(|_| PlaybackError::Closed)
    }

    async fn send(&self, command: Command) -> Result<(), PlaybackError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| PlaybackError::Closed)
    }
}
