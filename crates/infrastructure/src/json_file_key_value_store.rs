//! JSON-file key-value store.
//!
//! All entries live in a single JSON object, mirroring browser local storage.
//! Writes go to a sibling temporary file that is then renamed over the target.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nexo_application::KeyValueStore;
use nexo_core::{AppError, AppResult};
use tokio::sync::Mutex;
use tracing::warn;

type Entries = BTreeMap<String, String>;

/// File-backed implementation of the key-value port.
pub struct JsonFileKeyValueStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileKeyValueStore {
    /// Creates a store persisting to the given file. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    async fn read_contents(&self) -> AppResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(None),
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(AppError::Storage(format!(
                "failed to read '{}': {error}",
                self.path.display()
            ))),
        }
    }

    async fn read_entries(&self) -> AppResult<Entries> {
        let Some(contents) = self.read_contents().await? else {
            return Ok(Entries::new());
        };

        serde_json::from_str(contents.as_str()).map_err(|error| {
            AppError::Storage(format!(
                "storage file '{}' is not a JSON object of strings: {error}",
                self.path.display()
            ))
        })
    }

    async fn write_entries(&self, entries: &Entries) -> AppResult<()> {
        let encoded = serde_json::to_string_pretty(entries).map_err(|error| {
            AppError::Internal(format!("failed to encode storage file: {error}"))
        })?;

        let mut temporary = self.path.clone().into_os_string();
        temporary.push(".tmp");
        let temporary = PathBuf::from(temporary);

        tokio::fs::write(&temporary, encoded).await.map_err(|error| {
            AppError::Storage(format!("failed to write '{}': {error}", temporary.display()))
        })?;

        tokio::fs::rename(&temporary, &self.path).await.map_err(|error| {
            AppError::Storage(format!(
                "failed to replace '{}': {error}",
                self.path.display()
            ))
        })
    }

    async fn entries_for_update(&self) -> AppResult<Entries> {
        let Some(contents) = self.read_contents().await? else {
            return Ok(Entries::new());
        };

        Ok(serde_json::from_str(contents.as_str()).unwrap_or_else(|error| {
            warn!(
                path = %self.path.display(),
                error = %error,
                "discarding corrupt storage file"
            );
            Entries::new()
        }))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileKeyValueStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.entries_for_update().await?;
        entries.insert(key.to_owned(), value);
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.entries_for_update().await?;
        if entries.remove(key).is_none() {
            return Ok(());
        }

        self.write_entries(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use nexo_application::KeyValueStore;
    use nexo_core::AppError;
    use uuid::Uuid;

    use super::JsonFileKeyValueStore;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("nexo-storage-{}.json", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let store = JsonFileKeyValueStore::new(scratch_path());
        assert_eq!(store.get("nexo:clientes:filters").await.ok().flatten(), None);
    }

    #[tokio::test]
    async fn values_survive_a_new_store_instance() {
        let path = scratch_path();
        let store = JsonFileKeyValueStore::new(path.clone());
        assert!(store.set("nexo:clientes:filters", "{}".to_owned()).await.is_ok());
        assert!(store.set("nexo:clientes:views", "[]".to_owned()).await.is_ok());

        let reopened = JsonFileKeyValueStore::new(path.clone());
        assert_eq!(
            reopened.get("nexo:clientes:views").await.ok().flatten().as_deref(),
            Some("[]")
        );

        assert!(reopened.remove("nexo:clientes:views").await.is_ok());
        assert_eq!(reopened.get("nexo:clientes:views").await.ok().flatten(), None);
        assert!(
            reopened
                .get("nexo:clientes:filters")
                .await
                .ok()
                .flatten()
                .is_some()
        );

        let _ = tokio::fs::remove_file(path).await;
    }

    #[tokio::test]
    async fn corrupt_file_fails_reads_and_is_replaced_on_write() {
        let path = scratch_path();
        assert!(tokio::fs::write(&path, "not json").await.is_ok());
        let store = JsonFileKeyValueStore::new(path.clone());

        let read = store.get("nexo:clientes:filters").await;
        assert!(matches!(read, Err(AppError::Storage(_))));

        assert!(store.set("nexo:clientes:filters", "{}".to_owned()).await.is_ok());
        assert_eq!(
            store.get("nexo:clientes:filters").await.ok().flatten().as_deref(),
            Some("{}")
        );

        let _ = tokio::fs::remove_file(path).await;
    }
}
