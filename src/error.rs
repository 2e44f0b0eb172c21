//! Error type shared by the scheduling core and its repositories.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    /// A rating value outside 1..=4. Only reachable through `Rating::try_from`.
    #[error("invalid rating value: {0}")]
    InvalidRating(u8),

    #[error("repository unavailable: {0}")]
    RepositoryUnavailable(String),

    #[error("not enough words to start a session: {available} available, {required} required")]
    InsufficientItems { available: usize, required: usize },

    #[error("no question is being presented")]
    NoActiveQuestion,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
