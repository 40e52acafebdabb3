//! Web API module for NewsPulse.
//!
//! Exposes the news feed, search/browse, preference and push endpoints
//! over HTTP. Requests are authenticated with JWTs issued elsewhere.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::{ApiError, NewsApiError};
pub use router::create_router;
pub use server::WebServer;
