//! HTTP handler functions for the case map API.

use actix_web::{HttpResponse, web};
use covid_map_covid_models::DateKey;
use covid_map_geography_models::fips::normalize_region;
use covid_map_playback::{Action, Effect, PlaybackError, Selection};
use covid_map_server_models::{
    ApiCommandResult, ApiDaily, ApiHealth, DailyParams, SeekParams, SelectRequest,
};

use crate::{AppState, spawn_loads};

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/config`
///
/// Map token, initial viewport, interaction policy, and tick period.
pub async fn config(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.map_config)
}

/// `GET /api/playback`
pub async fn playback(state: web::Data<AppState>) -> HttpResponse {
    match state.playback.snapshot().await {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => controller_gone(&e),
    }
}

/// `POST /api/playback/toggle`
pub async fn toggle(state: web::Data<AppState>) -> HttpResponse {
    command(&state, Action::Toggle).await
}

/// `POST /api/playback/seek?index=N`
///
/// Rejected with `409 Conflict` while playing or when `index` is out of
/// range.
pub async fn seek(state: web::Data<AppState>, params: web::Query<SeekParams>) -> HttpResponse {
    command(&state, Action::Seek(params.index)).await
}

/// `GET /api/frame`
///
/// Playback snapshot, merged geometry for the active date, and legend.
pub async fn frame(state: web::Data<AppState>) -> HttpResponse {
    match state.playback.frame().await {
        Ok(frame) => HttpResponse::Ok().json(frame),
        Err(e) => controller_gone(&e),
    }
}

/// `GET /api/legend`
pub async fn legend(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.legend)
}

/// `GET /api/popup`
///
/// `204 No Content` when nothing is selected.
pub async fn popup(state: web::Data<AppState>) -> HttpResponse {
    match state.playback.popup().await {
        Ok(Some(detail)) => HttpResponse::Ok().json(detail),
        Ok(None) => HttpResponse::NoContent().finish(),
        Err(e) => controller_gone(&e),
    }
}

/// `POST /api/popup`
///
/// Selects the clicked region and returns its popup details.
pub async fn select(state: web::Data<AppState>, body: web::Json<SelectRequest>) -> HttpResponse {
    let SelectRequest { region, lng, lat } = body.into_inner();

    let Some(postal) = normalize_region(&region) else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Unknown region: {region}")
        }));
    };

    let selection = Selection {
        region: postal.to_string(),
        longitude: lng,
        latitude: lat,
    };
    if let Err(e) = state.playback.dispatch(Action::Select(selection)).await {
        return controller_gone(&e);
    }

    popup(state).await
}

/// `DELETE /api/popup`
pub async fn dismiss(state: web::Data<AppState>) -> HttpResponse {
    command(&state, Action::Dismiss).await
}

/// `GET /api/daily?date=YYYYMMDD`
///
/// Every state's record for one date, falling back to the previous day
/// when the provider has nothing for the requested date yet.
pub async fn daily(state: web::Data<AppState>, params: web::Query<DailyParams>) -> HttpResponse {
    let date: DateKey = match params.date.parse() {
        Ok(date) => date,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": e.to_string()
            }));
        }
    };

    match state.store.load_daily_for(date).await {
        Ok((served, series)) => {
            let records = series
                .regions()
                .filter_map(|region| series.get(region, served))
                .cloned()
                .collect();
            HttpResponse::Ok().json(ApiDaily {
                date: served,
                records,
            })
        }
        Err(e) => {
            log::error!("Failed to load daily data for {date}: {e}");
            HttpResponse::BadGateway().json(serde_json::json!({
                "error": e.notice().message(),
                "notice": e.notice(),
            }))
        }
    }
}

/// `POST /api/refresh`
///
/// Re-runs both loads in the background. The controller keeps the active
/// date when it is still in the refreshed range.
pub async fn refresh(state: web::Data<AppState>) -> HttpResponse {
    spawn_loads(&state.store, &state.playback);
    HttpResponse::Accepted().finish()
}

async fn command(state: &AppState, action: Action) -> HttpResponse {
    let (effect, playback) = match state.playback.apply(action).await {
        Ok(outcome) => outcome,
        Err(e) => return controller_gone(&e),
    };

    let applied = effect != Effect::Ignored;
    let result = ApiCommandResult { applied, playback };
    if applied {
        HttpResponse::Ok().json(result)
    } else {
        HttpResponse::Conflict().json(result)
    }
}

fn controller_gone(e: &PlaybackError) -> HttpResponse {
    log::error!("Playback request failed: {e}");
    HttpResponse::ServiceUnavailable().json(serde_json::json!({
        "error": "Playback is not running"
    }))
}
