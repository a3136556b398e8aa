pub mod config;
pub mod emissions;
pub mod error;
pub mod ocm;
pub mod ors;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value;
use shared::{
    Coordinate, GeocodeResponse, RouteEndpoint, RouteResponse, StationsResponse, TravelMode,
    default_mode,
};

use crate::emissions::{estimate_co2, round_to};
use crate::error::{ApiError, UpstreamError};
use crate::ocm::OcmClient;
use crate::ors::OrsClient;

const DEFAULT_STATION_RADIUS_KM: f64 = 10.0;

#[derive(Clone)]
pub struct AppState {
    pub ors: OrsClient,
    pub ocm: OcmClient,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/geocode", get(geocode_handler))
        .route("/api/route", post(route_handler))
        .route("/api/charging-stations", get(stations_handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct GeocodeParams {
    q: Option<String>,
}

async fn geocode_handler(
    State(state): State<AppState>,
    Query(params): Query<GeocodeParams>,
) -> Result<Json<GeocodeResponse>, ApiError> {
    let query = params.q.unwrap_or_default();
    let query = query.trim();
    if query.is_empty() {
        return Err(ApiError::bad_request("Missing 'q' parameter"));
    }
    if !state.ors.has_api_key() {
        return Err(ApiError::MissingApiKey("Server missing ORS_API_KEY".into()));
    }

    let suggestions = state.ors.autocomplete(query).await.map_err(|err| match err {
        UpstreamError::Status(status) => ApiError::Geocoding(status),
        other => ApiError::Upstream(other),
    })?;
    tracing::debug!("{} suggestions for '{query}'", suggestions.len());
    Ok(Json(GeocodeResponse { suggestions }))
}

/// Route body as clients send it. Endpoints and mode are read loosely so that
/// a missing or malformed endpoint gets the same answer as an unresolvable one.
#[derive(Debug, Default, Deserialize)]
struct RoutePayload {
    #[serde(default)]
    start: Value,
    #[serde(default)]
    end: Value,
    #[serde(default)]
    mode: Option<Value>,
}

impl RoutePayload {
    fn mode(&self) -> String {
        match &self.mode {
            None | Some(Value::Null) => default_mode(),
            Some(Value::String(mode)) => mode.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Text, or an object whose `lat`/`lon` are numbers or numeric strings.
fn parse_endpoint(value: &Value) -> Option<RouteEndpoint> {
    fn component(value: Option<&Value>) -> Option<f64> {
        match value? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    match value {
        Value::String(text) => Some(RouteEndpoint::Text(text.clone())),
        Value::Object(fields) => {
            let lat = component(fields.get("lat"))?;
            let lon = component(fields.get("lon"))?;
            Some(RouteEndpoint::Coordinate(Coordinate::new(lat, lon)))
        }
        _ => None,
    }
}

async fn resolve_endpoint(ors: &OrsClient, endpoint: Option<RouteEndpoint>) -> Result<Option<Coordinate>, UpstreamError> {
    match endpoint {
        Some(RouteEndpoint::Coordinate(coordinate)) if coordinate.is_valid() => Ok(Some(coordinate)),
        Some(RouteEndpoint::Text(text)) if !text.trim().is_empty() => ors.geocode(text.trim()).await,
        _ => Ok(None),
    }
}

async fn route_handler(
    State(state): State<AppState>,
    payload: Result<Json<RoutePayload>, JsonRejection>,
) -> Result<Json<RouteResponse>, ApiError> {
    if !state.ors.has_api_key() {
        return Err(ApiError::MissingApiKey(
            "Missing required API keys: ORS_API_KEY. Please set them in your .env file.".into(),
        ));
    }
    let Json(req) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let mode: TravelMode = req
        .mode()
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid mode. Use 'walk', 'cycle', or 'drive'"))?;

    let start = resolve_endpoint(&state.ors, parse_endpoint(&req.start)).await?;
    let end = resolve_endpoint(&state.ors, parse_endpoint(&req.end)).await?;
    let (Some(start), Some(end)) = (start, end) else {
        return Err(ApiError::bad_request(
            "Provide valid start and end as text or {lat, lon}",
        ));
    };

    let directions = state.ors.directions(start, end, mode).await?;
    let co2 = estimate_co2(directions.distance_m, mode);
    tracing::info!(
        "{mode} route with {} points, {:.0} m",
        directions.coordinates.len(),
        directions.distance_m
    );

    Ok(Json(RouteResponse {
        coordinates: directions.coordinates,
        distance_m: round_to(directions.distance_m, 1),
        duration_s: round_to(directions.duration_s, 1),
        co2_kg: co2.co2_kg,
        co2_savings_kg: co2.co2_savings_kg,
        start: Some(start),
        end: Some(end),
        mode: Some(mode.to_string()),
    }))
}

#[derive(Debug, Deserialize)]
struct StationParams {
    lat: Option<String>,
    lon: Option<String>,
    distance_km: Option<String>,
}

fn parse_param(value: Option<&str>) -> Result<Option<f64>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| ApiError::bad_request("Invalid lat/lon/distance_km")),
    }
}

async fn stations_handler(
    State(state): State<AppState>,
    Query(params): Query<StationParams>,
) -> Result<Json<StationsResponse>, ApiError> {
    let lat = parse_param(params.lat.as_deref())?;
    let lon = parse_param(params.lon.as_deref())?;
    let distance_km = parse_param(params.distance_km.as_deref())?.unwrap_or(DEFAULT_STATION_RADIUS_KM);
    let (Some(lat), Some(lon)) = (lat, lon) else {
        return Err(ApiError::bad_request("Missing lat or lon"));
    };

    match state.ocm.nearby(lat, lon, distance_km).await {
        Ok(stations) => Ok(Json(StationsResponse {
            stations,
            warning: None,
        })),
        Err(err) => {
            tracing::warn!("charging station lookup failed: {err}");
            let warning = match err {
                UpstreamError::Status(_) => "OpenChargeMap request failed",
                _ => "OpenChargeMap unavailable",
            };
            Ok(Json(StationsResponse {
                stations: Vec::new(),
                warning: Some(warning.to_string()),
            }))
        }
    }
}
