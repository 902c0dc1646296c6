#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the COVID case map.
//!
//! Loads state boundaries once at startup, fetches the per-state and
//! national time series in the background, and exposes the playback
//! controller (play/pause, seek, popup selection, rendered frames) to the
//! frontend over a small JSON API. The built frontend is served from
//! `app/dist`.

mod handlers;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use covid_map_geography::boundaries::{BoundarySource, load_boundaries};
use covid_map_geography_models::{InteractionPolicy, Viewport};
use covid_map_playback::{Action, ColorScale, Legend, LoadKind, PlaybackController, PlaybackHandle};
use covid_map_server_models::ApiMapConfig;
use covid_map_source::covidtracking::{CovidTrackingProvider, DEFAULT_BASE_URL};
use covid_map_source::store::TimeSeriesStore;
use geojson::FeatureCollection;

const DEFAULT_GEOMETRY: &str = "data/us-states.geojson";
const DEFAULT_TICK_MILLIS: u64 = 500;

/// Settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Map tile provider token handed to the frontend.
    pub access_token: String,
    /// Base URL of the case data provider.
    pub api_url: String,
    pub geometry: BoundarySource,
    pub tick_millis: u64,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, `MAPBOX_ACCESS_TOKEN`,
    /// `COVID_MAP_API_URL`, `COVID_MAP_GEOMETRY`, and `COVID_MAP_TICK_MS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Missing or
    /// unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let access_token = lookup("MAPBOX_ACCESS_TOKEN").unwrap_or_default();
        if access_token.is_empty() {
            log::warn!("MAPBOX_ACCESS_TOKEN is not set; the frontend map will not load tiles");
        }

        let api_url = lookup("COVID_MAP_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let geometry = BoundarySource::parse(
            &lookup("COVID_MAP_GEOMETRY").unwrap_or_else(|| DEFAULT_GEOMETRY.to_string()),
        );

        let tick_millis = match lookup("COVID_MAP_TICK_MS").map(|v| v.parse::<u64>()) {
            Some(Ok(ms)) if ms > 0 => ms,
            Some(_) => {
                log::warn!(
                    "COVID_MAP_TICK_MS must be a positive integer; using {DEFAULT_TICK_MILLIS}"
                );
                DEFAULT_TICK_MILLIS
            }
            None => DEFAULT_TICK_MILLIS,
        };

        Self {
            bind_addr,
            port,
            access_token,
            api_url,
            geometry,
            tick_millis,
        }
    }

    #[must_use]
    pub const fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    /// What `GET /api/config` returns.
    #[must_use]
    pub fn map_config(&self) -> ApiMapConfig {
        ApiMapConfig::new(
            self.access_token.clone(),
            Viewport::default(),
            InteractionPolicy::default(),
            self.tick_millis,
        )
    }
}

/// Shared application state.
pub struct AppState {
    /// Handle to the running playback controller.
    pub playback: PlaybackHandle,
    /// Loads case data from the configured provider.
    pub store: TimeSeriesStore,
    pub map_config: ApiMapConfig,
    pub legend: Legend,
}

/// Starts the per-state and national loads in the background.
///
/// Each load posts its result (or a notice on failure) to the controller
/// when it finishes. Neither waits on the other, and the controller keeps
/// whatever it already has when a load fails.
pub fn spawn_loads(store: &TimeSeriesStore, playback: &PlaybackHandle) {
    let (daily_store, daily_playback) = (store.clone(), playback.clone());
    tokio::spawn(async move {
        let action = match daily_store.load_daily().await {
            Ok(series) => {
                log::info!(
                    "Loaded {} daily records for {} regions",
                    series.len(),
                    series.region_count()
                );
                Action::DailyLoaded(series)
            }
            Err(e) => {
                log::warn!("Failed to load daily state data: {e}");
                Action::LoadFailed {
                    load: LoadKind::Daily,
                    notice: e.notice(),
                }
            }
        };
        if daily_playback.publish(action).await.is_err() {
            log::debug!("Playback controller stopped before daily data arrived");
        }
    });

    let (national_store, national_playback) = (store.clone(), playback.clone());
    tokio::spawn(async move {
        let action = match national_store.load_national().await {
            Ok((index, range)) => {
                log::info!("Loaded {} national dates", range.len());
                Action::NationalLoaded { index, range }
            }
            Err(e) => {
                log::warn!("Failed to load national data: {e}");
                Action::LoadFailed {
                    load: LoadKind::National,
                    notice: e.notice(),
                }
            }
        };
        if national_playback.publish(action).await.is_err() {
            log::debug!("Playback controller stopped before national data arrived");
        }
    });
}

/// Registers every `/api` route.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/config", web::get().to(handlers::config))
            .route("/playback", web::get().to(handlers::playback))
            .route("/playback/toggle", web::post().to(handlers::toggle))
            .route("/playback/seek", web::post().to(handlers::seek))
            .route("/frame", web::get().to(handlers::frame))
            .route("/legend", web::get().to(handlers::legend))
            .route("/popup", web::get().to(handlers::popup))
            .route("/popup", web::post().to(handlers::select))
            .route("/popup", web::delete().to(handlers::dismiss))
            .route("/daily", web::get().to(handlers::daily))
            .route("/refresh", web::post().to(handlers::refresh)),
    );
}

/// Starts the case map API server.
///
/// Reads [`ServerConfig`] from the environment, loads the state
/// boundaries, spawns the playback controller, kicks off the initial data
/// loads, and starts the Actix-Web HTTP server. The caller provides the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// A boundary file that fails to load is logged and replaced with an
/// empty collection so the API still comes up.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the provider client cannot be
/// built, or if the HTTP server fails to bind or encounters a runtime
/// error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();

    log::info!("Loading state boundaries...");
    let geometry = match load_boundaries(&config.geometry).await {
        Ok(collection) => collection,
        Err(e) => {
            log::error!("Failed to load state boundaries: {e}");
            FeatureCollection {
                bbox: None,
                features: Vec::new(),
                foreign_members: None,
            }
        }
    };

    let provider = CovidTrackingProvider::new(&config.api_url).map_err(std::io::Error::other)?;
    let store = TimeSeriesStore::new(Arc::new(provider));

    let scale = ColorScale::default();
    let legend = scale.legend();
    let playback = PlaybackHandle::spawn(PlaybackController::new(
        Arc::new(geometry),
        scale,
        config.tick_period(),
    ));

    log::info!("Fetching case data from {}...", config.api_url);
    spawn_loads(&store, &playback);

    let state = web::Data::new(AppState {
        playback,
        store,
        map_config: config.map_config(),
        legend,
    });

    let ServerConfig { bind_addr, port, .. } = config;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
            // Serve frontend static files (production)
            .service(Files::new("/", "app/dist").index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.access_token, "");
        assert_eq!(config.api_url, DEFAULT_BASE_URL);
        assert_eq!(
            config.geometry,
            BoundarySource::File(PathBuf::from(DEFAULT_GEOMETRY))
        );
        assert_eq!(config.tick_period(), Duration::from_millis(500));
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "9000"),
            ("MAPBOX_ACCESS_TOKEN", "pk.abc"),
            ("COVID_MAP_API_URL", "http://localhost:3000"),
            ("COVID_MAP_GEOMETRY", "https://example.com/states.json"),
            ("COVID_MAP_TICK_MS", "250"),
        ]));
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.access_token, "pk.abc");
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(
            config.geometry,
            BoundarySource::Url("https://example.com/states.json".to_string())
        );
        assert_eq!(config.tick_millis, 250);
        assert_eq!(config.map_config().access_token, "pk.abc");
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "eighty"),
            ("COVID_MAP_TICK_MS", "0"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.tick_millis, DEFAULT_TICK_MILLIS);
    }
}
