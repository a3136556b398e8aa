use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shared::ApiErrorBody;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream responded with status {0}")]
    Status(reqwest::StatusCode),
    #[error("upstream returned no route")]
    EmptyRoute,
    #[error("invalid upstream url: {0}")]
    Url(String),
}

/// Client for one upstream service; every request is bounded by `timeout`.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, UpstreamError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Errors returned to API clients as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    MissingApiKey(String),
    #[error("Geocoding request failed")]
    Geocoding(StatusCode),
    #[error("Unexpected server error: {0}")]
    Upstream(#[from] UpstreamError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingApiKey(_) | ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Geocoding(status) => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self}");
        } else {
            tracing::debug!("rejecting request: {self}");
        }
        let body = ApiErrorBody {
            error: Some(self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocoding_failure_keeps_upstream_status() {
        let err = ApiError::Geocoding(StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.to_string(), "Geocoding request failed");
    }

    #[test]
    fn upstream_errors_are_prefixed() {
        let err = ApiError::from(UpstreamError::EmptyRoute);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "Unexpected server error: upstream returned no route"
        );
    }
}
