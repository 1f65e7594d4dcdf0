use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::KeyValueStore;

/// Persistence problem absorbed by the filter store.
#[derive(Debug, Error)]
pub enum PersistenceFailure {
    /// Stored value could not be read or decoded.
    #[error("failed to read '{key}': {reason}")]
    Read {
        /// Storage key.
        key: String,
        /// Underlying cause.
        reason: String,
    },
    /// Value could not be encoded or written.
    #[error("failed to write '{key}': {reason}")]
    Write {
        /// Storage key.
        key: String,
        /// Underlying cause.
        reason: String,
    },
}

/// Reads and decodes a JSON value, logging and returning `None` on failure.
pub(super) async fn load_or_default<T>(storage: &dyn KeyValueStore, key: &str) -> Option<T>
where
    T: DeserializeOwned,
{
    match read_json(storage, key).await {
        Ok(value) => value,
        Err(failure) => {
            warn!(error = %failure, "falling back to defaults");
            None
        }
    }
}

/// Encodes and writes a JSON value, logging failures.
///
/// Returns whether the write succeeded; callers keep their in-memory state either way.
pub(super) async fn write_through<T>(storage: &dyn KeyValueStore, key: &str, value: &T) -> bool
where
    T: Serialize + ?Sized,
{
    match write_json(storage, key, value).await {
        Ok(()) => true,
        Err(failure) => {
            warn!(error = %failure, "keeping in-memory state");
            false
        }
    }
}

async fn read_json<T>(
    storage: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, PersistenceFailure>
where
    T: DeserializeOwned,
{
    let Some(encoded) = storage.get(key).await.map_err(|error| PersistenceFailure::Read {
        key: key.to_owned(),
        reason: error.to_string(),
    })?
    else {
        debug!(key, "no persisted value");
        return Ok(None);
    };

    serde_json::from_str(encoded.as_str())
        .map(Some)
        .map_err(|error| PersistenceFailure::Read {
            key: key.to_owned(),
            reason: format!("invalid JSON: {error}"),
        })
}

async fn write_json<T>(
    storage: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistenceFailure>
where
    T: Serialize + ?Sized,
{
    let encoded = serde_json::to_string(value).map_err(|error| PersistenceFailure::Write {
        key: key.to_owned(),
        reason: format!("failed to encode value: {error}"),
    })?;

    storage
        .set(key, encoded)
        .await
        .map_err(|error| PersistenceFailure::Write {
            key: key.to_owned(),
            reason: error.to_string(),
        })?;

    debug!(key, "persisted value");
    Ok(())
}
