//! News handlers for Web API.

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::news::{FeedService, NewsQuery};
use crate::web::dto::{ForYouResponse, NewsQueryParams, NewsResponse};
use crate::web::error::NewsApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// GET /api/news - Search (`q`) or browse a category (default general).
pub async fn browse_news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NewsQueryParams>,
) -> Result<Json<NewsResponse>, NewsApiError> {
    let query = NewsQuery::resolve(params.category.as_deref(), params.q.as_deref())?;

    let articles = FeedService::new(state.db.pool())
        .browse(&query)
        .await?;

    Ok(Json(NewsResponse::ok(articles)))
}

/// GET /api/news/foryou - Personalized feed of the authenticated user.
pub async fn for_you(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ForYouResponse>, NewsApiError> {
    let articles = FeedService::new(state.db.pool())
        .for_you(auth.user_id())
        .await?;

    Ok(Json(articles.into()))
}
