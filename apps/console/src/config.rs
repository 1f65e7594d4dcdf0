use std::path::PathBuf;

use nexo_core::{AppError, AppResult};

const DEFAULT_APP_NAMESPACE: &str = "nexo";
const DEFAULT_STORAGE_PATH: &str = ".nexo-storage.json";

/// Where filter state is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Single JSON file on disk.
    File(PathBuf),
    /// Process memory only.
    Memory,
    /// Redis server.
    Redis {
        /// Connection URL.
        url: String,
        /// Prefix prepended to every key.
        key_prefix: String,
    },
}

/// Console runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub app_namespace: String,
    pub storage: StorageBackend,
}

impl ConsoleConfig {
    /// Loads configuration from process environment.
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let app_namespace =
            optional("NEXO_APP_NAMESPACE").unwrap_or_else(|| DEFAULT_APP_NAMESPACE.to_owned());
        if app_namespace.contains(':') {
            return Err(AppError::Validation(
                "NEXO_APP_NAMESPACE must not contain ':'".to_owned(),
            ));
        }

        let storage = match optional("NEXO_STORAGE").as_deref().unwrap_or("file") {
            "file" => StorageBackend::File(PathBuf::from(
                optional("NEXO_STORAGE_PATH").unwrap_or_else(|| DEFAULT_STORAGE_PATH.to_owned()),
            )),
            "memory" => StorageBackend::Memory,
            "redis" => StorageBackend::Redis {
                url: optional("REDIS_URL").ok_or_else(|| {
                    AppError::Validation(
                        "REDIS_URL is required when NEXO_STORAGE=redis".to_owned(),
                    )
                })?,
                key_prefix: optional("NEXO_REDIS_KEY_PREFIX").unwrap_or_default(),
            },
            other => {
                return Err(AppError::Validation(format!(
                    "invalid NEXO_STORAGE value '{other}', expected file, memory or redis"
                )));
            }
        };

        Ok(Self {
            app_namespace,
            storage,
        })
    }
}
