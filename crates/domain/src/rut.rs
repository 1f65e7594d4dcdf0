//! Chilean RUT (Rol Único Tributario) validation and formatting.
//!
//! The check digit uses the modulus-11 scheme: body digits are weighted from
//! the least significant one with the cycle `2..=7`, and `11 - sum % 11` maps
//! to the check character (`11 → 0`, `10 → K`).

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nexo_core::AppError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CHECK_WEIGHTS: [u32; 6] = [2, 3, 4, 5, 6, 7];

/// Reasons a RUT input is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RutError {
    /// Input does not contain a numeric body followed by a check character.
    #[error("RUT must contain a numeric body followed by a check digit")]
    InvalidFormat,
    /// Check character does not match the one computed from the body.
    #[error("RUT check digit does not match its number")]
    CheckDigitMismatch,
}

/// Outcome of validating a user-supplied RUT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RutValidation {
    is_valid: bool,
    formatted: String,
    error: Option<RutError>,
}

impl RutValidation {
    fn valid(formatted: String) -> Self {
        Self {
            is_valid: true,
            formatted,
            error: None,
        }
    }

    fn invalid(formatted: String, error: RutError) -> Self {
        Self {
            is_valid: false,
            formatted,
            error: Some(error),
        }
    }

    /// Returns whether the RUT is structurally valid and its check digit matches.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Returns the canonical display form, or the trimmed input when it could not be parsed.
    #[must_use]
    pub fn formatted(&self) -> &str {
        self.formatted.as_str()
    }

    /// Returns the failure kind, if any.
    #[must_use]
    pub fn error(&self) -> Option<RutError> {
        self.error
    }

    /// Returns a human-readable failure message, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.map(|error| error.to_string())
    }
}

/// Validates a RUT and returns its canonical formatting.
///
/// A check digit mismatch still yields the formatted input (with the typed
/// check character upper-cased) so callers can show it back corrected.
#[must_use]
pub fn validate_rut(input: &str) -> RutValidation {
    let cleaned = clean_rut(input);
    let Some(check_char) = cleaned.chars().last().filter(|_| cleaned.len() >= 2) else {
        return RutValidation::invalid(input.trim().to_owned(), RutError::InvalidFormat);
    };

    let body = &cleaned[..cleaned.len() - 1];
    let Some(expected) = compute_check_digit(body) else {
        return RutValidation::invalid(input.trim().to_owned(), RutError::InvalidFormat);
    };

    let grouped_body = group_thousands(body);
    if check_char != expected {
        return RutValidation::invalid(
            format!("{grouped_body}-{}", check_char.to_ascii_uppercase()),
            RutError::CheckDigitMismatch,
        );
    }

    RutValidation::valid(format!("{grouped_body}-{}", expected.to_ascii_uppercase()))
}

/// Reduces input to its storage form: body digits plus a lower-case check character.
///
/// Every character other than ASCII digits and `k`/`K` is dropped.
#[must_use]
pub fn clean_rut(input: &str) -> String {
    input
        .chars()
        .filter(|character| character.is_ascii_digit() || matches!(character, 'k' | 'K'))
        .map(|character| character.to_ascii_lowercase())
        .collect()
}

/// Computes the lower-case check character for a numeric body.
///
/// Returns `None` when the body is empty or contains anything but ASCII digits.
#[must_use]
pub fn compute_check_digit(body: &str) -> Option<char> {
    if body.is_empty() || !body.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    let remainder = body
        .bytes()
        .rev()
        .zip(CHECK_WEIGHTS.iter().cycle())
        .fold(0_u32, |sum, (digit, weight)| {
            (sum + u32::from(digit - b'0') * weight) % 11
        });

    match 11 - remainder {
        11 => Some('0'),
        10 => Some('k'),
        value => char::from_digit(value, 10),
    }
}

/// Formats a numeric body and check character as `12.345.678-5`.
#[must_use]
pub fn format_rut(body: u64, check_digit: char) -> String {
    format!(
        "{}-{}",
        group_thousands(body.to_string().as_str()),
        check_digit.to_ascii_uppercase()
    )
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    grouped
}

/// A RUT whose check digit has been verified.
///
/// Serialized in storage form (`123456785`), displayed in canonical form
/// (`12.345.678-5`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rut {
    body: String,
    check_digit: char,
}

impl Rut {
    /// Parses and verifies a RUT in any common notation.
    pub fn parse(input: &str) -> Result<Self, RutError> {
        let validation = validate_rut(input);
        if let Some(error) = validation.error() {
            return Err(error);
        }

        let mut body = clean_rut(input);
        let check_digit = body.pop().ok_or(RutError::InvalidFormat)?;

        Ok(Self { body, check_digit })
    }

    /// Returns the numeric body digits.
    #[must_use]
    pub fn body(&self) -> &str {
        self.body.as_str()
    }

    /// Returns the lower-case check character.
    #[must_use]
    pub fn check_digit(&self) -> char {
        self.check_digit
    }

    /// Returns the separator-free storage form.
    #[must_use]
    pub fn storage_value(&self) -> String {
        format!("{}{}", self.body, self.check_digit)
    }
}

impl Display for Rut {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}-{}",
            group_thousands(self.body.as_str()),
            self.check_digit.to_ascii_uppercase()
        )
    }
}

impl FromStr for Rut {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
            .map_err(|error| AppError::Validation(format!("invalid RUT '{value}': {error}")))
    }
}

impl TryFrom<String> for Rut {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rut> for String {
    fn from(value: Rut) -> Self {
        value.storage_value()
    }
}
