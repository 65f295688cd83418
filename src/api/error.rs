use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};

use crate::error::AppError;

const INTERNAL_MESSAGE: &str = "An internal server error occurred while processing your request.";
const CALCULATION_MESSAGE: &str = "Failed to complete the calculation. Please check your parameters.";

/// Error returned by API handlers; rendered as the JSON error envelope.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    DataUnavailable(String),
    NotFound(String),
    /// Detail is logged, not returned.
    Calculation(String),
    /// Detail is logged, not returned.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Calculation(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::DataUnavailable(_) => "DataUnavailableError",
            Self::NotFound(_) => "NotFoundError",
            Self::Calculation(_) => "CalculationError",
            Self::Internal(_) => "InternalServerError",
        }
    }

    /// Message shown to the client.
    pub fn public_message(&self) -> &str {
        match self {
            Self::Validation(msg) | Self::DataUnavailable(msg) | Self::NotFound(msg) => msg,
            Self::Calculation(_) => CALCULATION_MESSAGE,
            Self::Internal(_) => INTERNAL_MESSAGE,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "validation_error: {msg}"),
            Self::DataUnavailable(msg) => write!(f, "data_unavailable: {msg}"),
            Self::NotFound(msg) => write!(f, "not_found: {msg}"),
            Self::Calculation(msg) => write!(f, "calculation_error: {msg}"),
            Self::Internal(msg) => write!(f, "internal_error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!(status = status.as_u16(), "{self}");
        } else {
            warn!(status = status.as_u16(), "{self}");
        }

        let body = json!({
            "error": self.public_message(),
            "error_type": self.error_type(),
            "status_code": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

/// Input and no-data errors are the caller's; everything else is ours.
impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        match e.exit_code() {
            2 | 3 => Self::Validation(e.message().to_string()),
            4 => Self::Calculation(e.message().to_string()),
            _ => Self::Internal(e.message().to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Internal(format!("worker task failed: {e}"))
    }
}
