pub(crate) mod badge_awards;
pub(crate) mod quiz_attempts;
pub(crate) mod quiz_sessions;
pub(crate) mod reading_time;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
