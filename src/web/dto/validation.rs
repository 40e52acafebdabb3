//! Validation utilities for Web API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::news::Category;
use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// Malformed or incomplete JSON is a bad request; a body that parses but
/// fails validation is a validation error with field-level details.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================

/// Validate that every entry names a known category.
pub fn known_categories(values: &[String]) -> Result<(), validator::ValidationError> {
    if let Some(unknown) = values.iter().find(|v| v.parse::<Category>().is_err()) {
        return Err(validator::ValidationError::new("known_categories")
            .with_message(format!("Unknown category: {}", unknown).into()));
    }
    Ok(())
}
