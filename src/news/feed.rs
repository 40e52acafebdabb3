//! Read paths over the article store: the personalized feed and
//! search/browse.

use rand::seq::SliceRandom;
use tracing::debug;

use super::repository::ArticleRepository;
use super::types::{Article, BROWSE_LIMIT, FOR_YOU_LIMIT, MAX_QUERY_LENGTH};
use super::Category;
use crate::db::{DbPool, UserRepository};
use crate::{NewsPulseError, Result};

/// A resolved browse request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsQuery {
    /// Relevance search on free text.
    Search(String),
    /// Latest articles of a category.
    Category(Category),
}

impl NewsQuery {
    /// Resolve raw request parameters.
    ///
    /// A non-blank `q` wins over `category`. Without `q` the category
    /// defaults to general.
    pub fn resolve(category: Option<&str>, q: Option<&str>) -> Result<Self> {
        if let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) {
            if q.chars().count() > MAX_QUERY_LENGTH {
                return Err(NewsPulseError::Validation(format!(
                    "search query is too long (max {} characters)",
                    MAX_QUERY_LENGTH
                )));
            }
            return Ok(NewsQuery::Search(q.to_string()));
        }

        match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(name) => Ok(NewsQuery::Category(name.parse()?)),
            None => Ok(NewsQuery::Category(Category::default())),
        }
    }
}

/// Service assembling article lists for readers.
pub struct FeedService<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedService<'a> {
    /// Create a new FeedService.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// The "for you" feed of a user.
    ///
    /// Newest articles in the user's preferred categories, capped and then
    /// shuffled. Fails with `OnboardingIncomplete` when the user has no
    /// preferences.
    pub async fn for_you(&self, user_id: i64) -> Result<Vec<Article>> {
        let preferences = UserRepository::new(self.pool)
            .get_preferences(user_id)
            .await?
            .ok_or_else(|| NewsPulseError::NotFound("user".to_string()))?;

        self.for_preferences(&preferences).await
    }

    /// The "for you" feed for an explicit preference set.
    pub async fn for_preferences(&self, preferences: &[Category]) -> Result<Vec<Article>> {
        if preferences.is_empty() {
            return Err(NewsPulseError::OnboardingIncomplete);
        }

        let mut articles = ArticleRepository::new(self.pool)
            .latest_in_categories(preferences, FOR_YOU_LIMIT)
            .await?;
        articles.shuffle(&mut rand::rng());

        debug!(count = articles.len(), "Assembled personalized feed");
        Ok(articles)
    }

    /// Search or browse.
    pub async fn browse(&self, query: &NewsQuery) -> Result<Vec<Article>> {
        let repo = ArticleRepository::new(self.pool);
        match query {
            NewsQuery::Search(text) => repo.search(text, BROWSE_LIMIT).await,
            NewsQuery::Category(category) => repo.latest_by_category(*category, BROWSE_LIMIT).await,
        }
    }
}
