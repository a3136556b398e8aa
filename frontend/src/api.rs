//! Calls to the planner backend (`/api/*`).

use seed::prelude::*;
use serde::de::DeserializeOwned;
use shared::{
    ApiErrorBody, Coordinate, GeocodeResponse, RouteRequest, RouteResponse, StationsResponse,
    Suggestion,
};
use thiserror::Error;

const ROUTE_FALLBACK_MESSAGE: &str = "Route error";
const TRANSPORT_FALLBACK_MESSAGE: &str = "Failed to find route";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {status}")]
    Status { status: u16, message: Option<String> },
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text shown to the user when the route request fails.
    pub fn route_message(&self) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            ApiError::Status { .. } => ROUTE_FALLBACK_MESSAGE.to_string(),
            ApiError::Transport(_) | ApiError::Decode(_) => TRANSPORT_FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// Base URL of the backend; same origin unless `FRONTEND_API_ROOT` was set at
/// build time.
pub fn api_root() -> String {
    option_env!("FRONTEND_API_ROOT")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_default()
}

pub fn geocode_url(root: &str, query: &str) -> String {
    format!("{root}/api/geocode?q={}", urlencoding::encode(query))
}

pub fn stations_url(root: &str, center: Coordinate, distance_km: f64) -> String {
    format!(
        "{root}/api/charging-stations?lat={}&lon={}&distance_km={distance_km}",
        center.lat, center.lon
    )
}

pub async fn fetch_suggestions(query: String) -> Result<Vec<Suggestion>, ApiError> {
    let request = Request::new(geocode_url(&api_root(), &query));
    let body: GeocodeResponse = send(request).await?;
    Ok(body.suggestions)
}

pub async fn fetch_route(payload: RouteRequest) -> Result<RouteResponse, ApiError> {
    log::debug!(
        "sending route request start={:?} end={:?} mode={}",
        payload.start,
        payload.end,
        payload.mode
    );
    let request = Request::new(format!("{}/api/route", api_root()))
        .method(Method::Post)
        .json(&payload)
        .map_err(|err| ApiError::Transport(format!("{err:?}")))?;
    send(request).await
}

pub async fn fetch_stations(center: Coordinate, distance_km: f64) -> Result<StationsResponse, ApiError> {
    let request = Request::new(stations_url(&api_root(), center, distance_km));
    send(request).await
}

async fn send<T: DeserializeOwned + 'static>(request: Request<'_>) -> Result<T, ApiError> {
    let response = request
        .fetch()
        .await
        .map_err(|err| ApiError::Transport(format!("{err:?}")))?;

    let status = response.status();
    if !status.is_ok() {
        let message = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error);
        return Err(ApiError::Status {
            status: status.code,
            message,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode(format!("{err:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_message_prefers_server_text() {
        let err = ApiError::Status {
            status: 400,
            message: Some("Invalid mode".into()),
        };
        assert_eq!(err.route_message(), "Invalid mode");

        let err = ApiError::Status {
            status: 502,
            message: None,
        };
        assert_eq!(err.route_message(), ROUTE_FALLBACK_MESSAGE);
        assert_eq!(
            ApiError::Transport("offline".into()).route_message(),
            TRANSPORT_FALLBACK_MESSAGE
        );
    }

    #[test]
    fn geocode_query_is_percent_encoded() {
        assert_eq!(
            geocode_url("", "MG Road & Brigade"),
            "/api/geocode?q=MG%20Road%20%26%20Brigade"
        );
        assert_eq!(geocode_url("", "café"), "/api/geocode?q=caf%C3%A9");
    }

    #[test]
    fn stations_url_carries_radius() {
        assert_eq!(
            stations_url("http://localhost:8080", Coordinate::new(12.5, 77.25), 10.0),
            "http://localhost:8080/api/charging-stations?lat=12.5&lon=77.25&distance_km=10"
        );
    }
}
