//! Push subscription registry for NewsPulse.
//!
//! Each user has at most one subscription, stored as JSON on the user row.

use tracing::warn;

use super::types::PushSubscription;
use crate::db::DbPool;
use crate::{NewsPulseError, Result};

/// Repository for push subscription operations.
pub struct PushSubscriptionRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PushSubscriptionRepository<'a> {
    /// Create a new PushSubscriptionRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Store a subscription for a user, replacing any previous one.
    ///
    /// Returns false if the user does not exist.
    pub async fn save(&self, user_id: i64, subscription: &PushSubscription) -> Result<bool> {
        let json = serde_json::to_string(subscription).map_err(|e| {
            NewsPulseError::Validation(format!("unserializable subscription: {}", e))
        })?;

        let result = sqlx::query("UPDATE users SET push_subscription = ? WHERE id = ?")
            .bind(json)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get a user's subscription.
    ///
    /// Returns None for unknown users, users without a subscription, and
    /// stored values that no longer parse.
    pub async fn get(&self, user_id: i64) -> Result<Option<PushSubscription>> {
        let raw: Option<Option<String>> =
            sqlx::query_scalar("SELECT push_subscription FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;

        let Some(raw) = raw.flatten() else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(subscription) => Ok(Some(subscription)),
            Err(e) => {
                warn!(user_id, error = %e, "Stored push subscription is unreadable");
                Ok(None)
            }
        }
    }

    /// Clear a user's subscription if it still points at `endpoint`.
    ///
    /// A subscription that was replaced in the meantime is left alone.
    /// Returns true if a subscription was cleared.
    pub async fn clear_if_endpoint(&self, user_id: i64, endpoint: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET push_subscription = NULL
             WHERE id = ? AND json_extract(push_subscription, '$.endpoint') = ?",
        )
        .bind(user_id)
        .bind(endpoint)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
