use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use thiserror::Error;

use crate::auth::AuthError;
use crate::core::SelectError;
use crate::models::ErrorResponse;
use crate::services::StoreError;

/// Message shown when the profile form is missing fields
pub const INCOMPLETE_PROFILE_MESSAGE: &str = "Please complete every field so we can match you.";

/// Errors returned by HTTP handlers, rendered as [`ErrorResponse`] JSON
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("No match found in those filters.")]
    NoMatch,

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    InvalidJson(String),

    #[error("{0}")]
    InvalidQuery(String),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_failed",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::NotFound(_) => "not_found",
            ApiError::NoMatch => "no_match",
            ApiError::Upstream(_) => "upstream_error",
            ApiError::InvalidJson(_) => "invalid_json",
            ApiError::InvalidQuery(_) => "invalid_query",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidJson(_) | ApiError::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) | ApiError::NoMatch => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

impl From<SelectError> for ApiError {
    fn from(err: SelectError) -> Self {
        match err {
            SelectError::NoMatch => ApiError::NoMatch,
            SelectError::Transport(message) => ApiError::Upstream(message),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(message) => ApiError::NotFound(message),
            StoreError::Unauthorized(message) => ApiError::Unauthorized(message),
            StoreError::Transport(message) => ApiError::Upstream(message),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::InvalidJson(format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::InvalidQuery(format!("Invalid query: {}", err)).into()
}
