use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::repository::{KeyValueStore, StorageError};

/// JSON values on top of a [`KeyValueStore`].
///
/// The `try_*` methods surface errors; `get_or`/`set` never fail and log
/// instead, matching how gameplay treats persistence.
#[derive(Clone)]
pub struct JsonStore {
    inner: Arc<dyn KeyValueStore>,
}

impl JsonStore {
    #[must_use]
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// Read and decode the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails or the value is not valid JSON for `T`.
    pub async fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.inner.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Encode and write `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    pub async fn try_set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.inner.set(key, &raw).await
    }

    /// The decoded value, or `default` when it is missing or unreadable.
    pub async fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_get(key).await {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                warn!(key, error = %err, "failed to read stored value, using default");
                default
            }
        }
    }

    /// Write `value`, returning whether it was stored.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> bool {
        match self.try_set(key, value).await {
            Ok(()) => true,
            Err(err) => {
                warn!(key, error = %err, "failed to store value");
                false
            }
        }
    }

    /// Delete `key`, returning whether the store accepted it.
    pub async fn remove(&self, key: &str) -> bool {
        match self.inner.remove(key).await {
            Ok(()) => true,
            Err(err) => {
                warn!(key, error = %err, "failed to remove stored value");
                false
            }
        }
    }
}
