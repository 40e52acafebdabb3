//! Error types for NewsPulse.

use thiserror::Error;

/// Common error type for NewsPulse.
#[derive(Error, Debug)]
pub enum NewsPulseError {
    /// Database error.
    ///
    /// Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// The user has not chosen any feed categories yet.
    #[error("no preferences set, onboarding incomplete")]
    OnboardingIncomplete,

    /// The headline source was unreachable or returned something unusable.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The push service reported the endpoint as permanently gone.
    #[error("push endpoint gone: {0}")]
    PushEndpointGone(String),

    /// The push service could not deliver (transient).
    #[error("push delivery failed: {0}")]
    PushDelivery(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for NewsPulseError {
    fn from(e: sqlx::Error) -> Self {
        NewsPulseError::Database(e.to_string())
    }
}

/// Result type alias for NewsPulse operations.
pub type Result<T> = std::result::Result<T, NewsPulseError>;
