//! Headline ingestion and reading for NewsPulse.
//!
//! Headlines are pulled per category by the [`IngestScheduler`], stored
//! once per URL by the [`ArticleRepository`], and read back through the
//! [`FeedService`].

pub mod feed;
pub mod fetcher;
pub mod ingest;
pub mod repository;
pub mod scheduler;
pub mod types;

pub use feed::{FeedService, NewsQuery};
pub use fetcher::{HeadlineSource, NewsApiClient};
pub use ingest::{IngestReport, IngestionWorker};
pub use repository::{ArticleRepository, BatchInsertOutcome};
pub use scheduler::{CycleOutcome, CycleReport, IngestScheduler, SchedulerSettings};
pub use types::{
    Article, ArticleSource, Category, Headline, NewArticle, BROWSE_LIMIT, FOR_YOU_LIMIT,
    MAX_QUERY_LENGTH,
};
