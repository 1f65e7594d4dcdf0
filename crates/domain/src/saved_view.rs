use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use nexo_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::FilterState;

/// Unique identifier of a saved view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedViewId(Uuid);

impl SavedViewId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }
}

impl Default for SavedViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SavedViewId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for SavedViewId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self::from_uuid).map_err(|error| {
            AppError::Validation(format!("invalid saved view id '{value}': {error}"))
        })
    }
}

/// Sort direction of a list column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// Sort captured with a saved view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSort {
    column: NonEmptyString,
    direction: SortDirection,
}

impl ViewSort {
    /// Creates a validated sort definition.
    pub fn new(column: impl Into<String>, direction: SortDirection) -> AppResult<Self> {
        Ok(Self {
            column: NonEmptyString::new(column)?,
            direction,
        })
    }

    /// Returns the sorted column.
    #[must_use]
    pub fn column(&self) -> &str {
        self.column.as_str()
    }

    /// Returns sort direction.
    #[must_use]
    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// Presentation state stored alongside filters in a saved view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewPresentation {
    columns: Vec<String>,
    sort: Option<ViewSort>,
}

impl ViewPresentation {
    /// Creates presentation state from visible columns and an optional sort.
    #[must_use]
    pub fn new(columns: Vec<String>, sort: Option<ViewSort>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|column| column.trim().to_owned())
                .filter(|column| !column.is_empty())
                .collect(),
            sort,
        }
    }

    /// Returns visible columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the optional sort.
    #[must_use]
    pub fn sort(&self) -> Option<&ViewSort> {
        self.sort.as_ref()
    }
}

/// Named snapshot of filter criteria.
///
/// Saved views own a copy of the filters taken at save time and are never
/// updated by later filter changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedView {
    id: SavedViewId,
    name: NonEmptyString,
    filters: FilterState,
    presentation: Option<ViewPresentation>,
    created_at: DateTime<Utc>,
}

impl SavedView {
    /// Captures the given filters under a new identifier.
    pub fn capture(
        name: impl Into<String>,
        filters: &FilterState,
        presentation: Option<ViewPresentation>,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name)
            .map_err(|_| AppError::Validation("saved view name must not be empty".to_owned()))?;

        Ok(Self {
            id: SavedViewId::new(),
            name,
            filters: filters.clone(),
            presentation,
            created_at,
        })
    }

    /// Returns a copy of this view with a new name.
    pub fn renamed(&self, name: impl Into<String>) -> AppResult<Self> {
        let name = NonEmptyString::new(name)
            .map_err(|_| AppError::Validation("saved view name must not be empty".to_owned()))?;

        Ok(Self {
            name,
            ..self.clone()
        })
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> SavedViewId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the captured filters.
    #[must_use]
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Returns captured presentation state.
    #[must_use]
    pub fn presentation(&self) -> Option<&ViewPresentation> {
        self.presentation.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use nexo_core::AppError;

    use super::{SavedView, SavedViewId, SortDirection, ViewPresentation, ViewSort};
    use crate::{FilterState, FilterValue};

    #[test]
    fn blank_name_is_rejected() {
        let result = SavedView::capture("  ", &FilterState::default(), None, Utc::now());
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn capture_copies_filters() {
        let mut filters = FilterState::default();
        filters.insert("texto", FilterValue::text("acme"));

        let view = SavedView::capture("Acme", &filters, None, Utc::now());
        assert!(view.is_ok());
        let view = view.unwrap_or_else(|_| unreachable!());

        filters.insert("texto", FilterValue::text("otro"));
        assert_eq!(view.filters().get("texto"), Some(&FilterValue::text("acme")));
    }

    #[test]
    fn captured_views_get_distinct_ids() {
        let first = SavedView::capture("A", &FilterState::default(), None, Utc::now());
        let second = SavedView::capture("A", &FilterState::default(), None, Utc::now());
        assert!(first.is_ok() && second.is_ok());
        assert_ne!(
            first.map(|view| view.id()).ok(),
            second.map(|view| view.id()).ok()
        );
    }

    #[test]
    fn presentation_drops_blank_columns() {
        let sort = ViewSort::new("razon_social", SortDirection::Asc).ok();
        let presentation = ViewPresentation::new(vec![" rut ".to_owned(), " ".to_owned()], sort);
        assert_eq!(presentation.columns(), ["rut".to_owned()]);
        assert_eq!(
            presentation.sort().map(ViewSort::direction),
            Some(SortDirection::Asc)
        );
    }

    #[test]
    fn saved_view_json_roundtrip() {
        let mut filters = FilterState::default();
        filters.insert("estados", FilterValue::multi_select(["activo"]));
        let view = SavedView::capture(
            "Activos",
            &filters,
            Some(ViewPresentation::default()),
            Utc::now(),
        );
        assert!(view.is_ok());
        let view = view.unwrap_or_else(|_| unreachable!());

        let encoded = serde_json::to_string(&view).unwrap_or_default();
        let decoded = serde_json::from_str::<SavedView>(encoded.as_str());
        assert!(decoded.is_ok());
        assert_eq!(decoded.unwrap_or_else(|_| unreachable!()), view);
    }

    #[test]
    fn saved_view_id_parses_uuid_text() {
        let id = SavedViewId::new();
        assert_eq!(id.to_string().parse::<SavedViewId>().ok(), Some(id));
        assert!("no-es-uuid".parse::<SavedViewId>().is_err());
    }
}
