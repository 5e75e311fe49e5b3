//! Shared error types for the services crate.

use thiserror::Error;

use literacy_core::model::{AccountError, ParseIdError, RecordingError, UsernameError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Username(#[from] UsernameError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `LeaderboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LeaderboardServiceError {
    #[error("username cannot be empty")]
    EmptyUsername,
    #[error("points out of range: {0}")]
    PointsOutOfRange(u64),
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AccountService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccountServiceError {
    #[error("username is already taken")]
    UsernameTaken,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `RecordingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordingServiceError {
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error(transparent)]
    Recording(#[from] RecordingError),
    #[error("recording not found")]
    NotFound,
    #[error("invalid hosting URL: {0}")]
    HostUrl(#[from] url::ParseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ReadingService` before they are folded into fallback feedback.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadingError {
    #[error("reading assessment is not configured")]
    Disabled,
    #[error("reading assessment returned an empty response")]
    EmptyResponse,
    #[error("reading assessment request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("reading assessment returned malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
