// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Infrastructure:
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Validation taxonomy. These are all local, synchronous and
    // non-retryable: the caller has to change its input.
    #[error("{0} not found")]
    NotFound(String),

    #[error("Profile must be verified")]
    ProfileNotVerified,

    #[error("Opener must be at least {min} characters, got {got}")]
    OpenerTooShort { min: usize, got: usize },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conversation has ended")]
    ConversationEnded,

    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    /// True for the 4xx-style validation taxonomy, false for
    /// infrastructure failures that should surface as a generic
    /// internal error.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Error::Database(_) | Error::Migration(_) | Error::Json(_) | Error::Io(_)
        )
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Validation(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Validation(s.to_string())
    }
}
