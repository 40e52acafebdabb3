//! News types for NewsPulse.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::NewsPulseError;

/// Maximum number of articles in a "for you" feed.
pub const FOR_YOU_LIMIT: usize = 100;

/// Maximum number of articles returned by browse or search.
pub const BROWSE_LIMIT: usize = 40;

/// Longest accepted free-text search query, in characters.
pub const MAX_QUERY_LENGTH: usize = 256;

/// A headline category.
///
/// The declaration order is the ingestion order within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    General,
    Business,
    Technology,
    Entertainment,
    Health,
    Science,
    Sports,
}

impl Category {
    /// Every category, in ingestion order.
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Business,
        Category::Technology,
        Category::Entertainment,
        Category::Health,
        Category::Science,
        Category::Sports,
    ];

    /// Wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Business => "business",
            Category::Technology => "technology",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
        }
    }
}

impl FromStr for Category {
    type Err = NewsPulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| NewsPulseError::Validation(format!("unknown category: {}", s)))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publisher of an article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    /// Upstream source identifier.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
}

/// A stored article.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    /// Article ID.
    pub id: i64,
    /// Canonical URL, unique across the store.
    pub url: String,
    pub source: ArticleSource,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url_to_image: Option<String>,
    /// Publication time (UTC).
    pub published_at: Option<DateTime<Utc>>,
    pub content: Option<String>,
    /// Category the article was ingested under.
    pub category: Category,
}

/// New article for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub url: String,
    pub source: ArticleSource,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub content: Option<String>,
    pub category: Category,
}

impl NewArticle {
    /// Create a new article with only the required fields set.
    pub fn new(url: impl Into<String>, category: Category) -> Self {
        Self {
            url: url.into(),
            source: ArticleSource::default(),
            author: None,
            title: None,
            description: None,
            url_to_image: None,
            published_at: None,
            content: None,
            category,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the publication time.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Build an article from an upstream headline, tagged with `category`.
    ///
    /// Returns None when the headline has no usable URL.
    pub fn from_headline(headline: Headline, category: Category) -> Option<Self> {
        let url = headline.url?.trim().to_string();
        if url.is_empty() {
            return None;
        }

        Some(Self {
            url,
            source: headline.source,
            author: headline.author,
            title: headline.title,
            description: headline.description,
            url_to_image: headline.url_to_image,
            published_at: headline.published_at.as_deref().and_then(parse_timestamp),
            content: headline.content,
            category,
        })
    }
}

/// One item of an upstream top-headlines response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headline {
    #[serde(default)]
    pub source: ArticleSource,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
}

/// Parse an upstream timestamp into UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a timestamp the way it is stored: UTC, second precision.
///
/// Stored values sort lexicographically in chronological order.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}
