//! Web API News Tests
//!
//! Integration tests for the browse/search and "for you" endpoints.

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use newspulse::db::SharedDatabase;
use newspulse::news::{ArticleRepository, NewArticle};
use newspulse::push::{PushDispatcher, WebPushTransport};
use newspulse::web::handlers::AppState;
use newspulse::web::middleware::{JwtClaims, JwtState};
use newspulse::web::router::create_router;
use newspulse::{Category, Database, NewUser, UserRepository};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

const JWT_SECRET: &str = "test-secret-key-for-testing-only";

/// Create a test server with an in-memory database.
async fn create_test_server() -> (TestServer, SharedDatabase) {
    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );

    let transport = WebPushTransport::from_config(&Default::default()).unwrap();
    let app_state = Arc::new(AppState::new(
        db.clone(),
        PushDispatcher::new(Arc::new(transport)),
    ));
    let jwt_state = Arc::new(JwtState::new(JWT_SECRET));
    let router = create_router(app_state, jwt_state, &[]);

    let server = TestServer::new(router).expect("Failed to create test server");
    (server, db)
}

fn token_for(user_id: i64) -> String {
    let now = Utc::now().timestamp() as u64;
    let claims = JwtClaims {
        sub: user_id,
        iat: now,
        exp: now + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

async fn create_user(db: &SharedDatabase, email: &str, preferences: &[Category]) -> i64 {
    let repo = UserRepository::new(db.pool());
    let user = repo.create(&NewUser::new(email)).await.unwrap();
    repo.set_preferences(user.id, preferences).await.unwrap();
    user.id
}

async fn seed(db: &SharedDatabase, category: Category, count: usize) {
    let base = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
    let batch: Vec<NewArticle> = (0..count)
        .map(|i| {
            NewArticle::new(format!("https://news.example/{}/{}", category, i), category)
                .with_title(format!("{} headline number {}", category, i))
                .with_description(format!("About {}", category))
                .with_published_at(base + Duration::minutes(i as i64))
        })
        .collect();
    ArticleRepository::new(db.pool())
        .insert_batch(&batch)
        .await
        .unwrap();
}

fn categories_of(body: &Value) -> Vec<String> {
    body["articles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["category"].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// GET /api/news
// ============================================================================

#[tokio::test]
async fn test_browse_defaults_to_general() {
    let (server, db) = create_test_server().await;
    seed(&db, Category::General, 3).await;
    seed(&db, Category::Sports, 3).await;

    let response = server.get("/api/news").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["totalResults"], 3);
    assert!(categories_of(&body).iter().all(|c| c == "general"));
}

#[tokio::test]
async fn test_browse_category_newest_first_and_capped() {
    let (server, db) = create_test_server().await;
    seed(&db, Category::Business, 45).await;

    let response = server
        .get("/api/news")
        .add_query_param("category", "business")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["totalResults"], 40);
    let articles = body["articles"].as_array().unwrap();
    assert_eq!(articles.len(), 40);
    assert_eq!(articles[0]["url"], "https://news.example/business/44");
    assert_eq!(articles[39]["url"], "https://news.example/business/5");
}

#[tokio::test]
async fn test_browse_article_shape() {
    let (server, db) = create_test_server().await;
    seed(&db, Category::Health, 1).await;

    let body: Value = server
        .get("/api/news")
        .add_query_param("category", "health")
        .await
        .json();

    let article = &body["articles"][0];
    assert_eq!(article["url"], "https://news.example/health/0");
    assert_eq!(article["publishedAt"], "2024-04-01T00:00:00Z");
    assert_eq!(article["category"], "health");
    assert!(article.get("source").is_some());
    assert!(article.get("urlToImage").is_some());
}

#[tokio::test]
async fn test_search_takes_precedence_over_category() {
    let (server, db) = create_test_server().await;
    seed(&db, Category::Science, 2).await;
    seed(&db, Category::Sports, 2).await;

    let response = server
        .get("/api/news")
        .add_query_param("category", "sports")
        .add_query_param("q", "science")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["totalResults"], 2);
    assert!(categories_of(&body).iter().all(|c| c == "science"));
}

#[tokio::test]
async fn test_blank_search_falls_back_to_browse() {
    let (server, db) = create_test_server().await;
    seed(&db, Category::General, 2).await;

    let body: Value = server
        .get("/api/news")
        .add_query_param("q", "   ")
        .await
        .json();
    assert_eq!(body["totalResults"], 2);
}

#[tokio::test]
async fn test_search_without_matches() {
    let (server, db) = create_test_server().await;
    seed(&db, Category::General, 2).await;

    let body: Value = server
        .get("/api/news")
        .add_query_param("q", "zeppelin")
        .await
        .json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["totalResults"], 0);
    assert_eq!(body["articles"], json!([]));
}

#[tokio::test]
async fn test_unknown_category_is_bad_request() {
    let (server, _db) = create_test_server().await;

    let response = server
        .get("/api/news")
        .add_query_param("category", "weather")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["articles"], json!([]));
    assert_eq!(body["totalResults"], 0);
}

// ============================================================================
// GET /api/news/foryou
// ============================================================================

#[tokio::test]
async fn test_for_you_requires_auth() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/api/news/foryou").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .get("/api/news/foryou")
        .add_header(AUTHORIZATION, "Bearer not-a-jwt".to_string())
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_for_you_filters_by_preferences() {
    let (server, db) = create_test_server().await;
    seed(&db, Category::Technology, 5).await;
    seed(&db, Category::Science, 5).await;
    seed(&db, Category::Entertainment, 5).await;
    let user_id = create_user(
        &db,
        "reader@example.com",
        &[Category::Technology, Category::Science],
    )
    .await;

    let response = server
        .get("/api/news/foryou")
        .add_header(AUTHORIZATION, format!("Bearer {}", token_for(user_id)))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let categories: HashSet<String> = categories_of(&body).into_iter().collect();
    assert_eq!(body["articles"].as_array().unwrap().len(), 10);
    assert_eq!(
        categories,
        HashSet::from(["technology".to_string(), "science".to_string()])
    );
}

#[tokio::test]
async fn test_for_you_accepts_legacy_token_header() {
    let (server, db) = create_test_server().await;
    seed(&db, Category::Sports, 2).await;
    let user_id = create_user(&db, "legacy@example.com", &[Category::Sports]).await;

    let response = server
        .get("/api/news/foryou")
        .add_header("x-auth-token", token_for(user_id))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["articles"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_for_you_is_capped_at_100() {
    let (server, db) = create_test_server().await;
    seed(&db, Category::General, 80).await;
    seed(&db, Category::Business, 80).await;
    let user_id = create_user(
        &db,
        "heavy@example.com",
        &[Category::General, Category::Business],
    )
    .await;

    let body: Value = server
        .get("/api/news/foryou")
        .add_header(AUTHORIZATION, format!("Bearer {}", token_for(user_id)))
        .await
        .json();
    assert_eq!(body["articles"].as_array().unwrap().len(), 100);
}

#[tokio::test]
async fn test_for_you_without_preferences() {
    let (server, db) = create_test_server().await;
    seed(&db, Category::General, 2).await;
    let user_id = create_user(&db, "new@example.com", &[]).await;

    let response = server
        .get("/api/news/foryou")
        .add_header(AUTHORIZATION, format!("Bearer {}", token_for(user_id)))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["code"], "ONBOARDING_INCOMPLETE");
    assert_eq!(body["msg"], "No preferences set. Please complete onboarding.");
    assert_eq!(body["articles"], json!([]));
}

#[tokio::test]
async fn test_for_you_with_preferences_but_no_articles() {
    let (server, db) = create_test_server().await;
    let user_id = create_user(&db, "early@example.com", &[Category::Health]).await;

    let response = server
        .get("/api/news/foryou")
        .add_header(AUTHORIZATION, format!("Bearer {}", token_for(user_id)))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["articles"], json!([]));
}

#[tokio::test]
async fn test_for_you_unknown_user() {
    let (server, _db) = create_test_server().await;

    let response = server
        .get("/api/news/foryou")
        .add_header(AUTHORIZATION, format!("Bearer {}", token_for(4242)))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// POST /api/user/preferences
// ============================================================================

#[tokio::test]
async fn test_update_preferences_then_for_you() {
    let (server, db) = create_test_server().await;
    seed(&db, Category::Science, 3).await;
    seed(&db, Category::Sports, 3).await;
    let user_id = create_user(&db, "onboard@example.com", &[]).await;
    let token = format!("Bearer {}", token_for(user_id));

    let response = server
        .post("/api/user/preferences")
        .add_header(AUTHORIZATION, token.clone())
        .json(&json!({"preferences": ["science", "science"]}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["preferences"], json!(["science"]));

    let body: Value = server
        .get("/api/news/foryou")
        .add_header(AUTHORIZATION, token)
        .await
        .json();
    assert!(categories_of(&body).iter().all(|c| c == "science"));
    assert_eq!(body["articles"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_update_preferences_rejects_unknown_category() {
    let (server, db) = create_test_server().await;
    let user_id = create_user(&db, "typo@example.com", &[]).await;

    let response = server
        .post("/api/user/preferences")
        .add_header(AUTHORIZATION, format!("Bearer {}", token_for(user_id)))
        .json(&json!({"preferences": ["sports", "weather"]}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_update_preferences_requires_array() {
    let (server, db) = create_test_server().await;
    let user_id = create_user(&db, "shape@example.com", &[]).await;

    let response = server
        .post("/api/user/preferences")
        .add_header(AUTHORIZATION, format!("Bearer {}", token_for(user_id)))
        .json(&json!({"preferences": "sports"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
