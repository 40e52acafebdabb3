//! NewsPulse - headline ingestion, personalized feeds and web push.
//!
//! Headlines are pulled from an upstream news API on a fixed cadence,
//! stored once per URL, and served as a per-user "for you" feed, a
//! category browse and a full-text search. Users can register a browser
//! push subscription; subscriptions the push service reports as gone are
//! removed automatically.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod news;
pub mod push;
pub mod web;

pub use config::Config;
pub use db::{Database, NewUser, SharedDatabase, User, UserRepository};
pub use error::{NewsPulseError, Result};
pub use news::{Article, Category, FeedService, IngestScheduler, IngestionWorker, NewsApiClient};
pub use push::{PushDispatcher, PushSubscription, WebPushTransport};
pub use web::WebServer;
