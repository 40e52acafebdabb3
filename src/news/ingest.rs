//! Ingestion worker for NewsPulse.
//!
//! Pulls one category's headlines from a [`HeadlineSource`] and stores them.

use std::sync::Arc;

use tracing::{debug, info};

use super::fetcher::HeadlineSource;
use super::repository::ArticleRepository;
use super::types::NewArticle;
use super::Category;
use crate::db::SharedDatabase;
use crate::Result;

/// Outcome of ingesting one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Category ingested.
    pub category: Category,
    /// Headlines returned by the source.
    pub fetched: usize,
    /// Articles newly stored.
    pub inserted: usize,
    /// Articles already present.
    pub duplicates: usize,
    /// Headlines dropped before insert (no URL, or a failed row).
    pub skipped: usize,
}

impl IngestReport {
    fn empty(category: Category) -> Self {
        Self {
            category,
            fetched: 0,
            inserted: 0,
            duplicates: 0,
            skipped: 0,
        }
    }
}

/// Fetches and stores headlines, one category per call.
#[derive(Clone)]
pub struct IngestionWorker {
    db: SharedDatabase,
    source: Arc<dyn HeadlineSource>,
}

impl IngestionWorker {
    /// Create a new worker writing into `db`.
    pub fn new(db: SharedDatabase, source: Arc<dyn HeadlineSource>) -> Self {
        Self { db, source }
    }

    /// Fetch one category and store its articles.
    ///
    /// Duplicate URLs are absorbed. Fetch errors and total store failures
    /// are returned to the caller.
    pub async fn ingest_category(&self, category: Category) -> Result<IngestReport> {
        let headlines = self.source.fetch_category(category).await?;
        if headlines.is_empty() {
            info!(category = %category, "No articles found");
            return Ok(IngestReport::empty(category));
        }

        let fetched = headlines.len();
        let articles: Vec<NewArticle> = headlines
            .into_iter()
            .filter_map(|headline| NewArticle::from_headline(headline, category))
            .collect();
        let without_url = fetched - articles.len();
        if without_url > 0 {
            debug!(category = %category, count = without_url, "Dropped headlines without a URL");
        }

        let outcome = ArticleRepository::new(self.db.pool())
            .insert_batch(&articles)
            .await?;

        let report = IngestReport {
            category,
            fetched,
            inserted: outcome.inserted,
            duplicates: outcome.duplicates,
            skipped: without_url + outcome.failed,
        };

        info!(
            category = %category,
            fetched = report.fetched,
            inserted = report.inserted,
            duplicates = report.duplicates,
            skipped = report.skipped,
            "Category ingested"
        );

        Ok(report)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::news::types::Headline;
    use crate::NewsPulseError;

    /// In-memory headline source keyed by category.
    #[derive(Default)]
    pub struct FakeSource {
        batches: Mutex<HashMap<Category, Vec<Headline>>>,
        failing: Mutex<Vec<Category>>,
        calls: Mutex<Vec<Category>>,
    }

    impl FakeSource {
        pub fn with_urls(self, category: Category, urls: &[&str]) -> Self {
            let headlines = urls
                .iter()
                .map(|url| Headline {
                    url: Some(url.to_string()),
                    title: Some(format!("Headline {}", url)),
                    ..Default::default()
                })
                .collect();
            self.batches.lock().unwrap().insert(category, headlines);
            self
        }

        pub fn failing(self, category: Category) -> Self {
            self.failing.lock().unwrap().push(category);
            self
        }

        pub fn calls(&self) -> Vec<Category> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HeadlineSource for FakeSource {
        async fn fetch_category(&self, category: Category) -> Result<Vec<Headline>> {
            self.calls.lock().unwrap().push(category);
            if self.failing.lock().unwrap().contains(&category) {
                return Err(NewsPulseError::Upstream("HTTP 500: boom".to_string()));
            }
            Ok(self
                .batches
                .lock()
                .unwrap()
                .get(&category)
                .cloned()
                .unwrap_or_default())
        }
    }
}
