//! Redis-backed key-value store.

use async_trait::async_trait;
use nexo_application::KeyValueStore;
use nexo_core::{AppError, AppResult};
use redis::AsyncCommands;

/// Redis implementation of the key-value port.
#[derive(Clone)]
pub struct RedisKeyValueStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisKeyValueStore {
    /// Creates a store with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &str) -> String {
        if self.key_prefix.is_empty() {
            return key.to_owned();
        }

        format!("{}:{key}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Storage(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut connection = self.connection().await?;

        connection.get(self.key_for(key)).await.map_err(|error| {
            AppError::Storage(format!("failed to read key-value entry '{key}': {error}"))
        })
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let mut connection = self.connection().await?;

        connection
            .set(self.key_for(key), value)
            .await
            .map_err(|error| {
                AppError::Storage(format!("failed to write key-value entry '{key}': {error}"))
            })
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let mut connection = self.connection().await?;

        connection
            .del(self.key_for(key))
            .await
            .map_err(|error| {
                AppError::Storage(format!("failed to remove key-value entry '{key}': {error}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::RedisKeyValueStore;

    #[test]
    fn key_prefix_is_prepended() {
        let client = redis::Client::open("redis://127.0.0.1/");
        assert!(client.is_ok());
        let client = client.unwrap_or_else(|_| unreachable!());

        let prefixed = RedisKeyValueStore::new(client.clone(), "ui-state");
        assert_eq!(
            prefixed.key_for("nexo:clientes:filters"),
            "ui-state:nexo:clientes:filters"
        );

        let bare = RedisKeyValueStore::new(client, "");
        assert_eq!(bare.key_for("nexo:clientes:views"), "nexo:clientes:views");
    }
}
