//! API error handling for the NewsPulse Web API.
//!
//! Most endpoints answer errors with `{ "error": { code, message } }`.
//! The news endpoints keep the article envelope instead, so clients always
//! find an `articles` array (see [`NewsApiError`]).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::NewsPulseError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad request (400).
    BadRequest,
    /// Field-level validation error (400).
    ValidationError,
    /// The user has not chosen any categories yet (400).
    OnboardingIncomplete,
    /// Unauthorized (401).
    Unauthorized,
    /// Not found (404).
    NotFound,
    /// The push endpoint is permanently gone (410).
    Gone,
    /// Internal server error (500).
    InternalError,
    /// An upstream service failed (502).
    BadGateway,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::OnboardingIncomplete => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Gone => StatusCode::GONE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::BadGateway => StatusCode::BAD_GATEWAY,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Field-level validation error details (only present for validation errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Error code of this error.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message of this error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create a validation error from validator::ValidationErrors.
    ///
    /// Nested struct errors are reported under dotted field paths
    /// (`subscription.keys.auth`).
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let mut details: HashMap<String, Vec<String>> = HashMap::new();
        collect_validation_errors("", &errors, &mut details);

        Self {
            code: ErrorCode::ValidationError,
            message: "Validation failed".to_string(),
            details: Some(details),
        }
    }
}

fn collect_validation_errors(
    prefix: &str,
    errors: &validator::ValidationErrors,
    details: &mut HashMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            validator::ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", path))
                });
                details.entry(path.clone()).or_default().extend(messages);
            }
            validator::ValidationErrorsKind::Struct(nested) => {
                collect_validation_errors(&path, nested, details);
            }
            validator::ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_errors(&format!("{}[{}]", path, index), nested, details);
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<NewsPulseError> for ApiError {
    fn from(err: NewsPulseError) -> Self {
        match err {
            NewsPulseError::Auth(msg) => ApiError::unauthorized(msg),
            NewsPulseError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            NewsPulseError::Validation(msg) => ApiError::new(ErrorCode::ValidationError, msg),
            NewsPulseError::OnboardingIncomplete => ApiError::new(
                ErrorCode::OnboardingIncomplete,
                "No preferences set. Please complete onboarding.",
            ),
            NewsPulseError::PushEndpointGone(_) => ApiError::new(
                ErrorCode::Gone,
                "Push subscription expired and was removed. Please subscribe again.",
            ),
            NewsPulseError::PushDelivery(_) | NewsPulseError::Upstream(_) => {
                tracing::warn!("Upstream failure: {}", err);
                ApiError::new(ErrorCode::BadGateway, "Upstream service unavailable")
            }
            _ => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

/// Error body of the news endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewsErrorBody {
    status: &'static str,
    code: ErrorCode,
    msg: String,
    total_results: usize,
    articles: Vec<serde_json::Value>,
}

/// Error of a news endpoint, rendered as an empty article envelope.
#[derive(Debug)]
pub struct NewsApiError(pub ApiError);

impl From<ApiError> for NewsApiError {
    fn from(err: ApiError) -> Self {
        NewsApiError(err)
    }
}

impl From<NewsPulseError> for NewsApiError {
    fn from(err: NewsPulseError) -> Self {
        NewsApiError(err.into())
    }
}

impl IntoResponse for NewsApiError {
    fn into_response(self) -> Response {
        let ApiError { code, message, .. } = self.0;
        let body = NewsErrorBody {
            status: "error",
            code,
            msg: message,
            total_results: 0,
            articles: Vec::new(),
        };
        (code.status_code(), Json(body)).into_response()
    }
}
