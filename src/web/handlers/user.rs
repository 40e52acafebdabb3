//! User handlers for Web API: preferences and push notifications.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::db::UserRepository;
use crate::news::Category;
use crate::push::{PushPayload, PushSubscriptionRepository};
use crate::web::dto::{
    MessageResponse, PreferencesRequest, PreferencesResponse, SubscribeRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// POST /api/user/subscribe - Store the caller's push subscription.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<SubscribeRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let saved = PushSubscriptionRepository::new(state.db.pool())
        .save(auth.user_id(), &req.subscription)
        .await?;

    if !saved {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id = auth.user_id(), "Push subscription saved");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Push subscription saved.")),
    ))
}

/// POST /api/user/test-push - Send a test notification to the caller.
pub async fn test_push(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .dispatcher
        .dispatch(
            state.db.pool(),
            auth.user_id(),
            &PushPayload::test_notification(),
        )
        .await?;

    Ok(Json(MessageResponse::new("Test notification sent!")))
}

/// POST /api/user/preferences - Replace the caller's feed categories.
pub async fn update_preferences(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<PreferencesRequest>,
) -> Result<Json<PreferencesResponse>, ApiError> {
    let mut preferences: Vec<Category> = Vec::with_capacity(req.preferences.len());
    for name in &req.preferences {
        let category: Category = name.parse()?;
        if !preferences.contains(&category) {
            preferences.push(category);
        }
    }

    let updated = UserRepository::new(state.db.pool())
        .set_preferences(auth.user_id(), &preferences)
        .await?;

    if !updated {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(Json(PreferencesResponse {
        msg: "Preferences saved successfully".to_string(),
        preferences,
    }))
}
