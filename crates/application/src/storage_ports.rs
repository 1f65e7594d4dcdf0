use async_trait::async_trait;
use nexo_core::{AppError, AppResult};

/// Key-value persistence port used for durable UI state.
///
/// Values are opaque strings; callers own their encoding.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under a key.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Stores a value, replacing any previous one.
    async fn set(&self, key: &str, value: String) -> AppResult<()>;

    /// Removes a key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> AppResult<()>;
}

/// Storage keys of one list view, namespaced as `<app>:<view>:<concern>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterStorageKeys {
    filters: String,
    views: String,
}

impl FilterStorageKeys {
    /// Builds the keys for an application namespace and view key.
    pub fn new(app_namespace: &str, view_key: &str) -> AppResult<Self> {
        for (label, segment) in [("application namespace", app_namespace), ("view key", view_key)] {
            if segment.trim().is_empty() || segment.contains(':') {
                return Err(AppError::Validation(format!(
                    "{label} '{segment}' must be non-empty and must not contain ':'"
                )));
            }
        }

        Ok(Self {
            filters: format!("{app_namespace}:{view_key}:filters"),
            views: format!("{app_namespace}:{view_key}:views"),
        })
    }

    /// Returns the key holding current filters.
    #[must_use]
    pub fn filters(&self) -> &str {
        self.filters.as_str()
    }

    /// Returns the key holding saved views.
    #[must_use]
    pub fn views(&self) -> &str {
        self.views.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::FilterStorageKeys;

    #[test]
    fn keys_are_namespaced_per_view_and_concern() {
        let keys = FilterStorageKeys::new("nexo", "clientes");
        assert!(keys.is_ok());
        let keys = keys.unwrap_or_else(|_| unreachable!());
        assert_eq!(keys.filters(), "nexo:clientes:filters");
        assert_eq!(keys.views(), "nexo:clientes:views");
    }

    #[test]
    fn separator_in_namespace_is_rejected() {
        assert!(FilterStorageKeys::new("nexo:dev", "clientes").is_err());
        assert!(FilterStorageKeys::new(" ", "clientes").is_err());
    }
}
