//! Human-readable descriptors of active filters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{FilterFieldDefinition, FilterSchema, FilterState, FilterValue};

const SHORT_DATE_FORMAT: &str = "%d/%m/%Y";
const VALUE_SEPARATOR: &str = ", ";

/// One active filter rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterChip {
    key: String,
    label: String,
    values: Vec<String>,
}

impl FilterChip {
    /// Returns the field key this chip describes.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the individually removable values of a multi-select chip.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns the action removing the whole field.
    #[must_use]
    pub fn remove_action(&self) -> FilterChipAction {
        FilterChipAction::Remove {
            key: self.key.clone(),
            value: None,
        }
    }

    /// Returns the action removing one selected value.
    #[must_use]
    pub fn remove_value_action(&self, value: impl Into<String>) -> FilterChipAction {
        FilterChipAction::Remove {
            key: self.key.clone(),
            value: Some(value.into()),
        }
    }
}

/// User interaction raised from the chip bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FilterChipAction {
    /// Remove a field, or a single value of a multi-select field.
    Remove {
        /// Field key.
        key: String,
        /// Specific value to drop; the whole field when absent.
        value: Option<String>,
    },
    /// Reset every filter.
    ClearAll,
}

/// Projects the active filters of a state into chips, in schema order.
///
/// Returns `None` when no filter is active.
#[must_use]
pub fn filter_chips(schema: &FilterSchema, state: &FilterState) -> Option<Vec<FilterChip>> {
    let chips: Vec<FilterChip> = schema
        .fields()
        .iter()
        .filter_map(|field| {
            let value = state.get(field.key())?;
            if !value.is_active() || value.kind() != field.kind() {
                return None;
            }

            Some(chip_for(field, value))
        })
        .collect();

    (!chips.is_empty()).then_some(chips)
}

fn chip_for(field: &FilterFieldDefinition, value: &FilterValue) -> FilterChip {
    let (description, values) = match value {
        FilterValue::Text { value } => (format!("\"{value}\""), Vec::new()),
        FilterValue::MultiSelect { values } => (
            values
                .iter()
                .map(|selected| field.option_label(selected))
                .collect::<Vec<_>>()
                .join(VALUE_SEPARATOR),
            values.clone(),
        ),
        FilterValue::SingleSelect { value } => (field.option_label(value).to_owned(), Vec::new()),
        FilterValue::DateRange { from, to } => (describe_date_range(*from, *to), Vec::new()),
    };

    FilterChip {
        key: field.key().to_owned(),
        label: format!("{}: {description}", field.label()),
        values,
    }
}

fn describe_date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> String {
    match (from, to) {
        (Some(from), Some(to)) => format!(
            "{} - {}",
            from.format(SHORT_DATE_FORMAT),
            to.format(SHORT_DATE_FORMAT)
        ),
        (Some(from), None) => format!("desde {}", from.format(SHORT_DATE_FORMAT)),
        (None, Some(to)) => format!("hasta {}", to.format(SHORT_DATE_FORMAT)),
        (None, None) => String::new(),
    }
}
