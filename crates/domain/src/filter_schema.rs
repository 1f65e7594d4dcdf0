use std::collections::HashSet;

use nexo_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{FilterFieldKind, FilterState, FilterValue};

/// Selectable option of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    value: NonEmptyString,
    label: NonEmptyString,
}

impl FilterOption {
    /// Creates a validated option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            value: NonEmptyString::new(value)?,
            label: NonEmptyString::new(label)?,
        })
    }

    /// Returns the stored value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_str()
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }
}

/// Declaration of one filterable field of a list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterFieldDefinition {
    key: NonEmptyString,
    label: NonEmptyString,
    kind: FilterFieldKind,
    options: Vec<FilterOption>,
}

impl FilterFieldDefinition {
    /// Creates a validated field definition without options.
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        kind: FilterFieldKind,
    ) -> AppResult<Self> {
        Ok(Self {
            key: NonEmptyString::new(key)?,
            label: NonEmptyString::new(label)?,
            kind,
            options: Vec::new(),
        })
    }

    /// Attaches the option vocabulary of a select field.
    pub fn with_options(mut self, options: Vec<FilterOption>) -> AppResult<Self> {
        if !options.is_empty()
            && !matches!(
                self.kind,
                FilterFieldKind::MultiSelect | FilterFieldKind::SingleSelect
            )
        {
            return Err(AppError::Validation(format!(
                "filter field '{}' of kind '{}' cannot declare options",
                self.key.as_str(),
                self.kind.as_str()
            )));
        }

        let mut seen_values = HashSet::new();
        for option in &options {
            if !seen_values.insert(option.value()) {
                return Err(AppError::Validation(format!(
                    "duplicate option '{}' in filter field '{}'",
                    option.value(),
                    self.key.as_str()
                )));
            }
        }

        self.options = options;
        Ok(self)
    }

    /// Returns the field key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the value kind.
    #[must_use]
    pub fn kind(&self) -> FilterFieldKind {
        self.kind
    }

    /// Returns the declared options.
    #[must_use]
    pub fn options(&self) -> &[FilterOption] {
        &self.options
    }

    /// Returns the display label of an option value, falling back to the value itself.
    #[must_use]
    pub fn option_label<'a>(&'a self, value: &'a str) -> &'a str {
        self.options
            .iter()
            .find(|option| option.value() == value)
            .map_or(value, FilterOption::label)
    }
}

/// Ordered filter fields of one list view.
///
/// Field order is the canonical order for chips and queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSchema {
    view_key: NonEmptyString,
    fields: Vec<FilterFieldDefinition>,
}

impl FilterSchema {
    /// Creates a validated schema.
    pub fn new(
        view_key: impl Into<String>,
        fields: Vec<FilterFieldDefinition>,
    ) -> AppResult<Self> {
        let view_key = NonEmptyString::new(view_key)?;
        if view_key.as_str().contains(':') {
            return Err(AppError::Validation(format!(
                "view key '{}' must not contain ':'",
                view_key.as_str()
            )));
        }

        if fields.is_empty() {
            return Err(AppError::Validation(
                "filter schemas must include at least one field".to_owned(),
            ));
        }

        let mut seen_fields = HashSet::new();
        for field in &fields {
            if !seen_fields.insert(field.key()) {
                return Err(AppError::Validation(format!(
                    "duplicate filter field '{}'",
                    field.key()
                )));
            }
        }

        Ok(Self { view_key, fields })
    }

    /// Returns the view key used to namespace persisted state.
    #[must_use]
    pub fn view_key(&self) -> &str {
        self.view_key.as_str()
    }

    /// Returns the fields in canonical order.
    #[must_use]
    pub fn fields(&self) -> &[FilterFieldDefinition] {
        &self.fields
    }

    /// Returns one field definition.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FilterFieldDefinition> {
        self.fields.iter().find(|field| field.key() == key)
    }

    /// Returns the state with every field unset.
    #[must_use]
    pub fn default_state(&self) -> FilterState {
        let mut state = FilterState::default();
        for field in &self.fields {
            state.insert(field.key(), FilterValue::unset(field.kind()));
        }

        state
    }

    /// Checks that a value may be stored in a field.
    pub fn check_value(&self, key: &str, value: &FilterValue) -> AppResult<()> {
        let field = self.field(key).ok_or_else(|| {
            AppError::Validation(format!(
                "unknown filter field '{key}' in view '{}'",
                self.view_key()
            ))
        })?;

        if field.kind() != value.kind() {
            return Err(AppError::Validation(format!(
                "filter field '{key}' expects '{}' but got '{}'",
                field.kind().as_str(),
                value.kind().as_str()
            )));
        }

        Ok(())
    }

    /// Aligns a loaded state with this schema.
    ///
    /// Unknown fields are dropped; missing or mistyped fields become unset.
    /// Repeated multi-select entries are collapsed.
    /// Returns the aligned state and the keys that had to be repaired.
    #[must_use]
    pub fn reconcile(&self, state: &FilterState) -> (FilterState, Vec<String>) {
        let mut aligned = FilterState::default();
        let mut repaired = Vec::new();

        for field in &self.fields {
            let value = match state.get(field.key()) {
                Some(value) if value.kind() == field.kind() => {
                    let normalized = value.normalized();
                    if &normalized != value {
                        repaired.push(field.key().to_owned());
                    }
                    normalized
                }
                _ => {
                    repaired.push(field.key().to_owned());
                    FilterValue::unset(field.kind())
                }
            };
            aligned.insert(field.key(), value);
        }

        for (key, _) in state.iter() {
            if self.field(key).is_none() {
                repaired.push(key.to_owned());
            }
        }

        (aligned, repaired)
    }
}

#[cfg(test)]
mod tests {
    use nexo_core::AppError;

    use super::{FilterFieldDefinition, FilterOption, FilterSchema};
    use crate::{FilterFieldKind, FilterState, FilterValue};

    fn schema() -> FilterSchema {
        let fields = vec![
            FilterFieldDefinition::new("texto", "Búsqueda", FilterFieldKind::Text),
            FilterFieldDefinition::new("estados", "Estado", FilterFieldKind::MultiSelect),
        ];
        let fields: Result<Vec<_>, _> = fields.into_iter().collect();
        assert!(fields.is_ok());
        let schema = FilterSchema::new("clientes", fields.unwrap_or_default());
        assert!(schema.is_ok());
        schema.unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let field = FilterFieldDefinition::new("texto", "Búsqueda", FilterFieldKind::Text);
        assert!(field.is_ok());
        let field = field.unwrap_or_else(|_| unreachable!());
        let result = FilterSchema::new("clientes", vec![field.clone(), field]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn empty_schema_is_rejected() {
        assert!(FilterSchema::new("clientes", Vec::new()).is_err());
    }

    #[test]
    fn namespaced_view_key_is_rejected() {
        let field = FilterFieldDefinition::new("texto", "Búsqueda", FilterFieldKind::Text);
        assert!(field.is_ok());
        let field = field.unwrap_or_else(|_| unreachable!());
        assert!(FilterSchema::new("ventas:clientes", vec![field]).is_err());
    }

    #[test]
    fn text_fields_cannot_declare_options() {
        let option = FilterOption::new("a", "A");
        assert!(option.is_ok());
        let field = FilterFieldDefinition::new("texto", "Búsqueda", FilterFieldKind::Text)
            .and_then(|field| field.with_options(vec![option.unwrap_or_else(|_| unreachable!())]));
        assert!(field.is_err());
    }

    #[test]
    fn default_state_has_every_field_unset() {
        let state = schema().default_state();
        assert_eq!(state.len(), 2);
        assert_eq!(state.count_active(), 0);
    }

    #[test]
    fn check_value_rejects_kind_mismatch_and_unknown_field() {
        let schema = schema();
        assert!(schema.check_value("texto", &FilterValue::text("acme")).is_ok());
        assert!(
            schema
                .check_value("texto", &FilterValue::single_select("acme"))
                .is_err()
        );
        assert!(schema.check_value("region", &FilterValue::text("x")).is_err());
    }

    #[test]
    fn reconcile_repairs_foreign_state() {
        let mut stored = FilterState::default();
        stored.insert("texto", FilterValue::text("acme"));
        stored.insert("estados", FilterValue::text("activo"));
        stored.insert("obsoleto", FilterValue::text("x"));

        let (aligned, repaired) = schema().reconcile(&stored);

        assert_eq!(aligned.get("texto"), Some(&FilterValue::text("acme")));
        assert_eq!(
            aligned.get("estados"),
            Some(&FilterValue::unset(FilterFieldKind::MultiSelect))
        );
        assert!(aligned.get("obsoleto").is_none());
        assert_eq!(repaired, vec!["estados".to_owned(), "obsoleto".to_owned()]);
    }

    #[test]
    fn reconcile_collapses_repeated_selections() {
        let mut stored = schema().default_state();
        stored.insert(
            "estados",
            FilterValue::MultiSelect {
                values: vec!["activo".to_owned(), "activo".to_owned()],
            },
        );

        let (aligned, repaired) = schema().reconcile(&stored);

        assert_eq!(aligned.get("estados"), Some(&FilterValue::multi_select(["activo"])));
        assert_eq!(repaired, vec!["estados".to_owned()]);
    }
}
