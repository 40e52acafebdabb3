//! Headline source for NewsPulse.
//!
//! The [`HeadlineSource`] trait is what the ingestion worker talks to;
//! [`NewsApiClient`] implements it on top of a NewsAPI-compatible
//! top-headlines endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::types::Headline;
use super::Category;
use crate::config::NewsConfig;
use crate::{NewsPulseError, Result};

/// User agent string for upstream requests.
const USER_AGENT: &str = "NewsPulse/0.1 (headline ingestion)";

/// A source of headlines, one category at a time.
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    /// Fetch the current headlines of one category.
    async fn fetch_category(&self, category: Category) -> Result<Vec<Headline>>;
}

/// Top-headlines response body.
#[derive(Debug, Deserialize)]
struct TopHeadlinesResponse {
    status: String,
    #[serde(default)]
    articles: Vec<Headline>,
    code: Option<String>,
    message: Option<String>,
}

/// HTTP client for a NewsAPI-compatible top-headlines endpoint.
pub struct NewsApiClient {
    client: Client,
    api_url: String,
    api_key: String,
    language: String,
    country: String,
    page_size: u32,
    max_response_bytes: u64,
}

impl NewsApiClient {
    /// Create a client from the news configuration.
    pub fn from_config(config: &NewsConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| NewsPulseError::Upstream(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            country: config.country.clone(),
            page_size: config.page_size,
            max_response_bytes: config.max_response_bytes,
        })
    }
}

#[async_trait]
impl HeadlineSource for NewsApiClient {
    async fn fetch_category(&self, category: Category) -> Result<Vec<Headline>> {
        debug!(category = %category, "Fetching headlines");

        let page_size = self.page_size.to_string();

        // without_url() keeps the api key out of error messages.
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("category", category.as_str()),
                ("language", self.language.as_str()),
                ("country", self.country.as_str()),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| NewsPulseError::Upstream(format!("request failed: {}", e.without_url())))?;

        let status = response.status();

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_response_bytes {
                return Err(NewsPulseError::Upstream(format!(
                    "response too large: {} bytes (max {} bytes)",
                    content_length, self.max_response_bytes
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| {
                NewsPulseError::Upstream(format!("failed to read response: {}", e.without_url()))
            })?;

        if bytes.len() as u64 > self.max_response_bytes {
            return Err(NewsPulseError::Upstream(format!(
                "response too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_response_bytes
            )));
        }

        // Error bodies carry a message worth surfacing, so parse before
        // judging the status code.
        let parsed = serde_json::from_slice::<TopHeadlinesResponse>(&bytes);

        if !status.is_success() {
            let detail = parsed
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| status.to_string());
            return Err(NewsPulseError::Upstream(format!("HTTP {}: {}", status.as_u16(), detail)));
        }

        let body = parsed
            .map_err(|e| NewsPulseError::Upstream(format!("malformed response: {}", e)))?;

        if body.status != "ok" {
            return Err(NewsPulseError::Upstream(format!(
                "{}: {}",
                body.code.as_deref().unwrap_or("error"),
                body.message.as_deref().unwrap_or("no message")
            )));
        }

        debug!(category = %category, count = body.articles.len(), "Headlines fetched");
        Ok(body.articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> NewsApiClient {
        let config = NewsConfig {
            api_url: format!("{}/v2/top-headlines", server.uri()),
            api_key: "secret-key".to_string(),
            max_response_bytes: 64 * 1024,
            ..Default::default()
        };
        NewsApiClient::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_category() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .and(query_param("category", "technology"))
            .and(query_param("language", "en"))
            .and(query_param("country", "us"))
            .and(query_param("pageSize", "40"))
            .and(query_param("apiKey", "secret-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "totalResults": 2,
                "articles": [
                    {
                        "source": {"id": null, "name": "Tech Daily"},
                        "author": "Sam",
                        "title": "Chips get faster",
                        "description": "Again",
                        "url": "https://tech.example/chips",
                        "urlToImage": null,
                        "publishedAt": "2024-06-01T08:00:00Z",
                        "content": "Body"
                    },
                    {
                        "source": {"id": "x", "name": "X"},
                        "title": "No url here"
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let headlines = client_for(&server)
            .fetch_category(Category::Technology)
            .await
            .unwrap();
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[0].url.as_deref(), Some("https://tech.example/chips"));
        assert_eq!(headlines[0].source.name.as_deref(), Some("Tech Daily"));
        assert!(headlines[1].url.is_none());
    }

    #[tokio::test]
    async fn test_error_status_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "code": "rateLimited",
                "message": "Too many requests"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_category(Category::General)
            .await
            .unwrap_err();
        assert!(matches!(err, NewsPulseError::Upstream(ref msg) if msg.contains("rateLimited")));
    }

    #[tokio::test]
    async fn test_http_error_does_not_leak_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "status": "error",
                "code": "apiKeyInvalid",
                "message": "Your API key is invalid"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_category(Category::General)
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("Your API key is invalid"));
        assert!(!msg.contains("secret-key"));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_category(Category::General)
            .await
            .unwrap_err();
        assert!(matches!(err, NewsPulseError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_oversize_body() {
        let server = MockServer::start().await;
        let huge = format!(
            r#"{{"status":"ok","articles":[],"padding":"{}"}}"#,
            "x".repeat(128 * 1024)
        );
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(huge))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_category(Category::General)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}
