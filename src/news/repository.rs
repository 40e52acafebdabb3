//! Article store for NewsPulse.
//!
//! Articles are append-only and unique by URL. The first insert of a URL
//! wins; later inserts of the same URL are absorbed as duplicates.

use sqlx::QueryBuilder;
use tracing::{debug, warn};

use super::types::{format_timestamp, parse_timestamp, Article, ArticleSource, NewArticle};
use super::Category;
use crate::db::DbPool;
use crate::{NewsPulseError, Result};

/// Upper bound on the number of terms a search expression may contain.
const MAX_SEARCH_TERMS: usize = 16;

const ARTICLE_COLUMNS: &str = "a.id, a.url, a.source_id, a.source_name, a.author, a.title, \
     a.description, a.url_to_image, a.published_at, a.content, a.category";

/// Row type for an article from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    url: String,
    source_id: Option<String>,
    source_name: Option<String>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
    content: Option<String>,
    category: String,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        let category = row.category.parse().unwrap_or_else(|_| {
            warn!(article_id = row.id, category = %row.category, "Stored article has unknown category");
            Category::default()
        });

        Article {
            id: row.id,
            url: row.url,
            source: ArticleSource {
                id: row.source_id,
                name: row.source_name,
            },
            author: row.author,
            title: row.title,
            description: row.description,
            url_to_image: row.url_to_image,
            published_at: row.published_at.as_deref().and_then(parse_timestamp),
            content: row.content,
            category,
        }
    }
}

/// Result of a batch insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchInsertOutcome {
    /// Rows newly stored.
    pub inserted: usize,
    /// Rows whose URL was already stored.
    pub duplicates: usize,
    /// Rows that failed for another reason.
    pub failed: usize,
}

/// Repository for article operations.
pub struct ArticleRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ArticleRepository<'a> {
    /// Create a new ArticleRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a batch of articles.
    ///
    /// Each row is written independently, so a duplicate or a failing row
    /// never prevents the rest of the batch from being stored. An error is
    /// returned only when rows failed and none were stored or absorbed.
    pub async fn insert_batch(&self, articles: &[NewArticle]) -> Result<BatchInsertOutcome> {
        let mut outcome = BatchInsertOutcome::default();
        let mut first_error: Option<sqlx::Error> = None;

        for article in articles {
            let result = sqlx::query(
                "INSERT INTO articles (url, source_id, source_name, author, title, description,
                                       url_to_image, published_at, content, category)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(url) DO NOTHING",
            )
            .bind(&article.url)
            .bind(&article.source.id)
            .bind(&article.source.name)
            .bind(&article.author)
            .bind(&article.title)
            .bind(&article.description)
            .bind(&article.url_to_image)
            .bind(article.published_at.as_ref().map(format_timestamp))
            .bind(&article.content)
            .bind(article.category.as_str())
            .execute(self.pool)
            .await;

            match result {
                Ok(done) if done.rows_affected() > 0 => outcome.inserted += 1,
                Ok(_) => {
                    debug!(url = %article.url, "Duplicate article ignored");
                    outcome.duplicates += 1;
                }
                Err(e) => {
                    warn!(url = %article.url, error = %e, "Failed to store article");
                    outcome.failed += 1;
                    first_error.get_or_insert(e);
                }
            }
        }

        if outcome.inserted == 0 && outcome.duplicates == 0 {
            if let Some(e) = first_error {
                return Err(e.into());
            }
        }

        Ok(outcome)
    }

    /// Latest articles of one category, newest first.
    pub async fn latest_by_category(&self, category: Category, limit: usize) -> Result<Vec<Article>> {
        let rows: Vec<ArticleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM articles a
             WHERE a.category = ?
             ORDER BY a.published_at DESC, a.id DESC
             LIMIT ?",
            ARTICLE_COLUMNS
        ))
        .bind(category.as_str())
        .bind(limit as i64)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    /// Latest articles whose category is any of `categories`, newest first.
    pub async fn latest_in_categories(
        &self,
        categories: &[Category],
        limit: usize,
    ) -> Result<Vec<Article>> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM articles a WHERE a.category IN (",
            ARTICLE_COLUMNS
        ));
        let mut separated = query.separated(", ");
        for category in categories {
            separated.push_bind(category.as_str());
        }
        query.push(") ORDER BY a.published_at DESC, a.id DESC LIMIT ");
        query.push_bind(limit as i64);

        let rows: Vec<ArticleRow> = query.build_query_as().fetch_all(self.pool).await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    /// Full-text search over title, description and content.
    ///
    /// Results are ordered by relevance, best match first. A query without
    /// any searchable term yields an empty list.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>> {
        let Some(expression) = build_match_expression(query) else {
            return Ok(Vec::new());
        };

        debug!(query = %query, expression = %expression, "Searching articles");

        let rows: Vec<ArticleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM articles_fts
             INNER JOIN articles a ON a.id = articles_fts.rowid
             WHERE articles_fts MATCH ?
             ORDER BY bm25(articles_fts), a.published_at DESC
             LIMIT ?",
            ARTICLE_COLUMNS
        ))
        .bind(&expression)
        .bind(limit as i64)
        .fetch_all(self.pool)
        .await
        .map_err(|e| NewsPulseError::Database(format!("search failed: {}", e)))?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    /// Total number of stored articles.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// Turn free text into an FTS5 expression.
///
/// Terms are the alphanumeric runs of the input, each quoted so FTS5
/// operators in user input are matched literally, joined with OR.
fn build_match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .take(MAX_SEARCH_TERMS)
        .map(|term| format!("\"{}\"", term.to_lowercase()))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}
