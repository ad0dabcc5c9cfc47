//! Shared error types for the services crate.

use std::time::Duration;

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors reported by speech backends.
///
/// The game flow never propagates these; they are logged and the round
/// carries on.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SpeechError {
    #[error("speech is not supported by this backend")]
    Unsupported,
    #[error("no speech was recognised")]
    NoSpeech,
    #[error("speech timed out after {0:?}")]
    Timeout(Duration),
    #[error("speech backend failed: {0}")]
    Backend(String),
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
