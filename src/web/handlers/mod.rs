//! API handlers for the NewsPulse Web API.

pub mod news;
pub mod user;

pub use news::*;
pub use user::*;

use crate::db::SharedDatabase;
use crate::push::PushDispatcher;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: SharedDatabase,
    /// Push notification dispatcher.
    pub dispatcher: PushDispatcher,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: SharedDatabase, dispatcher: PushDispatcher) -> Self {
        Self { db, dispatcher }
    }
}
