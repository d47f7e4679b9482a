use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use super::models::ErrorResponse;
use crate::resolver::RegistryError;

/// Request-level failures mapped to HTTP responses.
///
/// Resolution failures are not errors here; they come back as a normal
/// outcome body with a 404 or 400 status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("payload invalid: {0}")]
    InvalidPayload(String),
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),
    #[error("resolver not found: {0}")]
    ResolverNotFound(String),
}

impl ApiError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_) | Self::MissingParameter(_) => StatusCode::BAD_REQUEST,
            Self::ResolverNotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::MissingParameter(_) => "MISSING_PARAMETER",
            Self::ResolverNotFound(_) => "RESOLVER_NOT_FOUND",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code(),
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidPayload(value.to_string())
    }
}

impl From<RegistryError> for ApiError {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::NotFound { name } => Self::ResolverNotFound(name),
            duplicate @ RegistryError::DuplicateName { .. } => {
                Self::InvalidPayload(duplicate.to_string())
            }
        }
    }
}
