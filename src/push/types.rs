//! Push notification types for NewsPulse.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Title of the test notification.
pub const TEST_NOTIFICATION_TITLE: &str = "NewsPulse Test Notification";

/// Body of the test notification.
pub const TEST_NOTIFICATION_BODY: &str = "Success! Your push notifications are working.";

/// A browser push subscription, as produced by `PushSubscription.toJSON()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    /// Push service URL the notification is POSTed to.
    #[validate(url, custom(function = "http_endpoint"))]
    pub endpoint: String,
    /// Expiry as a millisecond timestamp, if the browser set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<f64>,
    /// Client encryption keys.
    #[validate(nested)]
    pub keys: PushKeys,
}

/// Client keys of a push subscription (base64url).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PushKeys {
    #[validate(length(min = 1, message = "p256dh key is required"))]
    pub p256dh: String,
    #[validate(length(min = 1, message = "auth secret is required"))]
    pub auth: String,
}

impl PushSubscription {
    /// Create a subscription for `endpoint` with the given keys.
    pub fn new(endpoint: impl Into<String>, p256dh: impl Into<String>, auth: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            expiration_time: None,
            keys: PushKeys {
                p256dh: p256dh.into(),
                auth: auth.into(),
            },
        }
    }
}

/// Notification payload delivered to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
}

impl PushPayload {
    /// Create a payload.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// The fixed payload sent by the test endpoint.
    pub fn test_notification() -> Self {
        Self::new(TEST_NOTIFICATION_TITLE, TEST_NOTIFICATION_BODY)
    }
}

fn http_endpoint(value: &str) -> Result<(), validator::ValidationError> {
    if value.starts_with("https://") || value.starts_with("http://") {
        Ok(())
    } else {
        Err(validator::ValidationError::new("http_endpoint")
            .with_message("Endpoint must be an http(s) URL".into()))
    }
}
