use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Value shape accepted by a filter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterFieldKind {
    /// Free-text search.
    Text,
    /// Zero or more categorical values.
    MultiSelect,
    /// One selected identifier, such as an owner.
    SingleSelect,
    /// Optional lower and upper date bounds.
    DateRange,
}

impl FilterFieldKind {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::MultiSelect => "multi_select",
            Self::SingleSelect => "single_select",
            Self::DateRange => "date_range",
        }
    }
}

/// Current value of one filter field.
///
/// Unset is represented by the variant's own empty value, never by absence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterValue {
    /// Free-text search value.
    Text {
        /// Search text; empty when unset.
        value: String,
    },
    /// Selected categorical values in selection order.
    MultiSelect {
        /// Selected values; empty when unset.
        values: Vec<String>,
    },
    /// Single selected identifier.
    SingleSelect {
        /// Selected identifier; empty when unset.
        value: String,
    },
    /// Date range with independently optional bounds.
    DateRange {
        /// Inclusive lower bound.
        from: Option<NaiveDate>,
        /// Inclusive upper bound.
        to: Option<NaiveDate>,
    },
}

impl FilterValue {
    /// Returns the unset value for a field kind.
    #[must_use]
    pub fn unset(kind: FilterFieldKind) -> Self {
        match kind {
            FilterFieldKind::Text => Self::Text {
                value: String::new(),
            },
            FilterFieldKind::MultiSelect => Self::MultiSelect { values: Vec::new() },
            FilterFieldKind::SingleSelect => Self::SingleSelect {
                value: String::new(),
            },
            FilterFieldKind::DateRange => Self::DateRange {
                from: None,
                to: None,
            },
        }
    }

    /// Creates a text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Creates a multi-select value, dropping duplicates while keeping order.
    #[must_use]
    pub fn multi_select<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MultiSelect {
            values: distinct(values.into_iter().map(Into::into)),
        }
    }

    /// Creates a single-select value.
    #[must_use]
    pub fn single_select(value: impl Into<String>) -> Self {
        Self::SingleSelect {
            value: value.into(),
        }
    }

    /// Creates a date range value.
    #[must_use]
    pub fn date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self::DateRange { from, to }
    }

    /// Returns the kind of this value.
    #[must_use]
    pub fn kind(&self) -> FilterFieldKind {
        match self {
            Self::Text { .. } => FilterFieldKind::Text,
            Self::MultiSelect { .. } => FilterFieldKind::MultiSelect,
            Self::SingleSelect { .. } => FilterFieldKind::SingleSelect,
            Self::DateRange { .. } => FilterFieldKind::DateRange,
        }
    }

    /// Returns whether this value constrains the list.
    ///
    /// A date range is one active filter when either bound is set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match self {
            Self::Text { value } | Self::SingleSelect { value } => !value.is_empty(),
            Self::MultiSelect { values } => !values.is_empty(),
            Self::DateRange { from, to } => from.is_some() || to.is_some(),
        }
    }

    /// Returns this value with repeated multi-select entries collapsed to the first one.
    #[must_use]
    pub fn normalized(&self) -> Self {
        match self {
            Self::MultiSelect { values } => Self::MultiSelect {
                values: distinct(values.iter().cloned()),
            },
            other => other.clone(),
        }
    }

    /// Returns this value without `value` when it is a multi-select, or unset otherwise.
    #[must_use]
    pub fn without(&self, value: &str) -> Self {
        match self {
            Self::MultiSelect { values } => Self::MultiSelect {
                values: values
                    .iter()
                    .filter(|selected| selected.as_str() != value)
                    .cloned()
                    .collect(),
            },
            other => Self::unset(other.kind()),
        }
    }
}

fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut selected: Vec<String> = Vec::new();
    for value in values {
        if !selected.contains(&value) {
            selected.push(value);
        }
    }

    selected
}

/// Current filter criteria of one list view, keyed by field key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    fields: BTreeMap<String, FilterValue>,
}

impl FilterState {
    /// Returns the value stored for a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.fields.get(key)
    }

    /// Stores a field value, returning the previous one.
    ///
    /// Schema checks belong to [`crate::FilterSchema`]; this only stores.
    pub fn insert(&mut self, key: impl Into<String>, value: FilterValue) -> Option<FilterValue> {
        self.fields.insert(key.into(), value)
    }

    /// Iterates over stored fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the number of stored fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether no field is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Counts fields that differ from their unset value.
    #[must_use]
    pub fn count_active(&self) -> usize {
        self.fields.values().filter(|value| value.is_active()).count()
    }

    /// Returns whether any field is active.
    #[must_use]
    pub fn has_active(&self) -> bool {
        self.count_active() > 0
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{FilterFieldKind, FilterState, FilterValue};

    fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, month, day)
    }

    #[test]
    fn unset_values_are_inactive() {
        for kind in [
            FilterFieldKind::Text,
            FilterFieldKind::MultiSelect,
            FilterFieldKind::SingleSelect,
            FilterFieldKind::DateRange,
        ] {
            let value = FilterValue::unset(kind);
            assert!(!value.is_active(), "{}", kind.as_str());
            assert_eq!(value.kind(), kind);
        }
    }

    #[test]
    fn date_range_counts_once_with_both_bounds() {
        let mut state = FilterState::default();
        state.insert(
            "fecha",
            FilterValue::date_range(date(2024, 1, 1), date(2024, 1, 31)),
        );
        assert_eq!(state.count_active(), 1);
    }

    #[test]
    fn open_date_range_is_active() {
        assert!(FilterValue::date_range(None, date(2024, 1, 31)).is_active());
        assert!(FilterValue::date_range(date(2024, 1, 1), None).is_active());
    }

    #[test]
    fn multi_select_drops_duplicates_in_order() {
        let value = FilterValue::multi_select(["moroso", "activo", "moroso"]);
        assert_eq!(
            value,
            FilterValue::MultiSelect {
                values: vec!["moroso".to_owned(), "activo".to_owned()]
            }
        );
    }

    #[test]
    fn normalized_collapses_directly_built_duplicates() {
        let value = FilterValue::MultiSelect {
            values: vec!["activo".to_owned(), "activo".to_owned(), "moroso".to_owned()],
        };
        assert_eq!(value.normalized(), FilterValue::multi_select(["activo", "moroso"]));
        assert_eq!(FilterValue::text("acme").normalized(), FilterValue::text("acme"));
    }

    #[test]
    fn without_removes_one_selected_value() {
        let value = FilterValue::multi_select(["activo", "moroso"]).without("activo");
        assert_eq!(value, FilterValue::multi_select(["moroso"]));
        assert_eq!(
            FilterValue::single_select("u-17").without("u-17"),
            FilterValue::unset(FilterFieldKind::SingleSelect)
        );
    }

    #[test]
    fn state_serializes_dates_as_iso_8601() {
        let mut state = FilterState::default();
        state.insert("fecha", FilterValue::date_range(date(2024, 3, 5), None));

        let encoded = serde_json::to_string(&state).unwrap_or_default();
        assert_eq!(
            encoded,
            r#"{"fecha":{"kind":"date_range","from":"2024-03-05","to":null}}"#
        );

        let decoded = serde_json::from_str::<FilterState>(encoded.as_str());
        assert!(decoded.is_ok());
        assert_eq!(decoded.unwrap_or_default(), state);
    }
}
