//! Push dispatcher for NewsPulse.
//!
//! Looks up a user's subscription, hands the payload to the transport and
//! forgets subscriptions the push service reports as permanently gone.

use std::sync::Arc;

use tracing::{info, warn};

use super::registry::PushSubscriptionRepository;
use super::transport::PushTransport;
use super::types::PushPayload;
use crate::db::DbPool;
use crate::{NewsPulseError, Result};

/// Sends notifications to stored subscriptions.
#[derive(Clone)]
pub struct PushDispatcher {
    transport: Arc<dyn PushTransport>,
}

impl PushDispatcher {
    /// Create a dispatcher over `transport`.
    pub fn new(transport: Arc<dyn PushTransport>) -> Self {
        Self { transport }
    }

    /// Send `payload` to a user's subscription.
    ///
    /// Fails with `NotFound` when the user has no subscription; the
    /// transport is not contacted in that case. When the push service
    /// reports the endpoint gone, the subscription is cleared and
    /// `PushEndpointGone` is returned. Other failures leave it in place.
    pub async fn dispatch(&self, pool: &DbPool, user_id: i64, payload: &PushPayload) -> Result<()> {
        let registry = PushSubscriptionRepository::new(pool);
        let subscription = registry
            .get(user_id)
            .await?
            .ok_or_else(|| NewsPulseError::NotFound("push subscription".to_string()))?;

        match self.transport.send(&subscription, payload).await {
            Ok(()) => {
                info!(user_id, "Push notification sent");
                Ok(())
            }
            Err(e) if e.is_permanent() => {
                let cleared = registry
                    .clear_if_endpoint(user_id, &subscription.endpoint)
                    .await?;
                warn!(user_id, error = %e, cleared, "Push endpoint gone, subscription removed");
                Err(NewsPulseError::PushEndpointGone(e.to_string()))
            }
            Err(e) => {
                warn!(user_id, error = %e, "Push delivery failed");
                Err(NewsPulseError::PushDelivery(e.to_string()))
            }
        }
    }
}
