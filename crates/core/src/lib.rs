//! Shared primitives for all Rust crates in Nexo.

#![forbid(unsafe_code)]

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across Nexo crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
///
/// Surrounding whitespace is trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller's role does not grant the required capability.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Key-value storage could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn non_empty_string_trims_surrounding_whitespace() {
        let value = NonEmptyString::new("  Cartera norte ");
        assert!(value.is_ok());
        let value = value.unwrap_or_else(|_| unreachable!());
        assert_eq!(value.as_str(), "Cartera norte");
    }

    #[test]
    fn non_empty_string_rejects_blank_json() {
        let parsed = serde_json::from_str::<NonEmptyString>("\"  \"");
        assert!(parsed.is_err());
    }
}
