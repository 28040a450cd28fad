//! Shared error types for the services crate.

use thiserror::Error;

use storage::assets::BankLoadError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use trivia_core::model::BookId;

/// Errors emitted by quiz session operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no question bank for book {0}")]
    UnknownBook(BookId),
    #[error("no questions available for session")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error("current question has not been answered yet")]
    Unanswered,
}

/// Errors emitted by `ProgressSync`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by verse lookups.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VerseError {
    #[error("scripture reference is empty")]
    EmptyReference,
    #[error("verse API base URL cannot take path segments")]
    InvalidBaseUrl,
    #[error("verse request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("verse response had no text")]
    EmptyText,
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
    Banks(#[from] BankLoadError),
    #[error(transparent)]
    Verse(#[from] VerseError),
}
