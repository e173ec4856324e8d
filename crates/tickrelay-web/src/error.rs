use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use tickrelay_core::{SourceError, SourceErrorKind, ValidationError};

/// Unified error type for API responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    MissingParameter(String),
    BadRequest(String),
    NotFound(String),
    RateLimited(String),
    Upstream(String),
    Internal(String),
}

impl ApiError {
    pub fn missing(message: impl Into<String>) -> Self {
        Self::MissingParameter(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn no_valid_data() -> Self {
        Self::NotFound(String::from("No valid data found"))
    }

    /// Map an upstream failure to a response, hiding provider detail behind
    /// the generic per-endpoint payload. The real error was already logged
    /// with ticker/range context at the fetch site.
    pub fn from_source(error: SourceError, what: &str) -> Self {
        match error.kind() {
            SourceErrorKind::InvalidRequest => Self::BadRequest(error.message().to_string()),
            SourceErrorKind::TickerNotFound => Self::no_valid_data(),
            SourceErrorKind::Unavailable => Self::Upstream(format!("Failed to fetch {what}")),
            SourceErrorKind::MalformedResponse => Self::Internal(format!("Failed to fetch {what}")),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingParameter(msg)
            | Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::RateLimited(msg)
            | Self::Upstream(msg)
            | Self::Internal(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        Self::BadRequest(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingParameter(msg) | Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            Self::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
