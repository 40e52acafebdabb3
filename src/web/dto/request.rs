//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::known_categories;
use crate::push::PushSubscription;

/// Query parameters of `GET /api/news`.
#[derive(Debug, Default, Deserialize)]
pub struct NewsQueryParams {
    /// Category to browse.
    #[serde(default)]
    pub category: Option<String>,
    /// Free-text search; takes precedence over `category`.
    #[serde(default)]
    pub q: Option<String>,
}

/// Push subscription request.
#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeRequest {
    /// Browser subscription object.
    #[validate(nested)]
    pub subscription: PushSubscription,
}

/// Preference update request.
#[derive(Debug, Deserialize, Validate)]
pub struct PreferencesRequest {
    /// Category names.
    #[validate(custom(function = "known_categories"))]
    pub preferences: Vec<String>,
}
