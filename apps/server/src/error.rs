//! Route-level error types for the Carrot-Mapper web service.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

use crate::client::ApiError;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Resource not found (backend 404)
    #[error("{0} not found")]
    NotFound(String),

    /// The session may not see this resource (backend 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Credentials missing or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The page needs a signed-in user; the browser is sent to the login page.
    #[error("Login required")]
    LoginRequired { login_url: String },

    /// Any other backend or transport failure
    #[error("Backend error: {0}")]
    Upstream(ApiError),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::LoginRequired { .. } => StatusCode::SEE_OTHER,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, response_message) = match self {
            AppError::NotFound(_) => ("NOT_FOUND", "Not Found".to_string()),
            AppError::Forbidden(_) => ("FORBIDDEN", "Forbidden".to_string()),
            AppError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone()),
            AppError::Unauthorized(_) => ("UNAUTHORIZED", self.to_string()),
            AppError::LoginRequired { login_url } => {
                return HttpResponse::SeeOther()
                    .insert_header((header::LOCATION, login_url.as_str()))
                    .finish();
            }
            AppError::Upstream(err) => {
                tracing::error!(upstream_status = ?err.status(), "Backend error: {}", err);
                ("BAD_GATEWAY", "The mapping backend failed to respond".to_string())
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match &err {
            ApiError::Status { status: 400, message } => AppError::InvalidInput(message.clone()),
            ApiError::Status { status: 401, message } => AppError::Unauthorized(message.clone()),
            ApiError::Status { status: 403, message } => AppError::Forbidden(message.clone()),
            ApiError::Status { status: 404, message } => AppError::NotFound(message.clone()),
            _ => AppError::Upstream(err),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}
