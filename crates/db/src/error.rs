//! Errors raised while connecting to MySQL or creating the database.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("missing required setting {0}")]
    MissingSetting(&'static str),

    #[error("invalid database name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("connection is not live")]
    NotLive,

    #[error("timed out after {0:?} while connecting")]
    Timeout(Duration),

    #[error(transparent)]
    Driver(#[from] sqlx::Error),
}
