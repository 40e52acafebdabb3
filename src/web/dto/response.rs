//! Response DTOs for Web API.

use serde::Serialize;

use crate::news::types::format_timestamp;
use crate::news::{Article, ArticleSource, Category};

/// Article in API responses (the upstream headline shape plus category).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponse {
    pub source: ArticleSource,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
    pub category: Category,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            source: article.source,
            author: article.author,
            title: article.title,
            description: article.description,
            url: article.url,
            url_to_image: article.url_to_image,
            published_at: article.published_at.as_ref().map(format_timestamp),
            content: article.content,
            category: article.category,
        }
    }
}

/// Envelope of `GET /api/news`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub status: &'static str,
    pub total_results: usize,
    pub articles: Vec<ArticleResponse>,
}

impl NewsResponse {
    /// Build a successful envelope.
    pub fn ok(articles: Vec<Article>) -> Self {
        let articles: Vec<ArticleResponse> = articles.into_iter().map(Into::into).collect();
        Self {
            status: "ok",
            total_results: articles.len(),
            articles,
        }
    }
}

/// Envelope of `GET /api/news/foryou`.
#[derive(Debug, Serialize)]
pub struct ForYouResponse {
    pub articles: Vec<ArticleResponse>,
}

impl From<Vec<Article>> for ForYouResponse {
    fn from(articles: Vec<Article>) -> Self {
        Self {
            articles: articles.into_iter().map(Into::into).collect(),
        }
    }
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// Response of a preference update.
#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub msg: String,
    pub preferences: Vec<Category>,
}
