//! Filter state and saved views of one list view.
//!
//! The in-memory state is authoritative for the session. Every mutation is
//! written through to the [`KeyValueStore`]; storage failures are logged and
//! absorbed so the user's filters keep working.

mod persistence;


use std::sync::Arc;

use chrono::Utc;
use nexo_core::{AppError, AppResult};
use nexo_domain::{
    FilterChip, FilterChipAction, FilterSchema, FilterState, FilterValue, ListQuery, SavedView,
    SavedViewId, ViewPresentation, filter_chips,
};
use tracing::{info, warn};

use crate::{FilterStorageKeys, KeyValueStore};

use persistence::{load_or_default, write_through};

pub use persistence::PersistenceFailure;

/// Filter state store for one list view.
pub struct FilterStore {
    schema: FilterSchema,
    storage: Arc<dyn KeyValueStore>,
    keys: FilterStorageKeys,
    filters: FilterState,
    saved_views: Vec<SavedView>,
    filters_persisted: bool,
    views_persisted: bool,
}

impl FilterStore {
    /// Loads persisted filters and saved views for the schema's view.
    ///
    /// Missing, unreadable or corrupt storage yields the default state.
    pub async fn load(
        app_namespace: &str,
        schema: FilterSchema,
        storage: Arc<dyn KeyValueStore>,
    ) -> AppResult<Self> {
        let keys = FilterStorageKeys::new(app_namespace, schema.view_key())?;

        let stored = load_or_default::<FilterState>(storage.as_ref(), keys.filters()).await;
        let filters = match stored {
            Some(stored) => {
                let (aligned, repaired) = schema.reconcile(&stored);
                if !repaired.is_empty() {
                    warn!(
                        view = schema.view_key(),
                        fields = ?repaired,
                        "persisted filters did not match the schema"
                    );
                }
                aligned
            }
            None => schema.default_state(),
        };

        let saved_views = load_or_default::<Vec<SavedView>>(storage.as_ref(), keys.views())
            .await
            .unwrap_or_default();

        Ok(Self {
            schema,
            storage,
            keys,
            filters,
            saved_views,
            filters_persisted: true,
            views_persisted: true,
        })
    }

    /// Returns the schema this store was built with.
    #[must_use]
    pub fn schema(&self) -> &FilterSchema {
        &self.schema
    }

    /// Returns the current filters.
    #[must_use]
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Returns saved views in creation order.
    #[must_use]
    pub fn saved_views(&self) -> &[SavedView] {
        &self.saved_views
    }

    /// Returns one saved view.
    #[must_use]
    pub fn saved_view(&self, id: SavedViewId) -> Option<&SavedView> {
        self.saved_views.iter().find(|view| view.id() == id)
    }

    /// Returns whether the latest filters and saved views both reached storage.
    ///
    /// Each collection stays unpersisted until its own next successful write.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.filters_persisted && self.views_persisted
    }

    /// Replaces one field's value.
    pub async fn update_field(&mut self, key: &str, value: FilterValue) -> AppResult<()> {
        self.schema.check_value(key, &value)?;
        self.filters.insert(key, value.normalized());
        self.persist_filters().await;
        Ok(())
    }

    /// Drops one value from a multi-select field, or resets any other field.
    pub async fn remove_value(&mut self, key: &str, value: &str) -> AppResult<()> {
        let current = self.current_value(key)?;
        let next = current.without(value);
        self.update_field(key, next).await
    }

    /// Resets one field to its unset value.
    pub async fn clear_field(&mut self, key: &str) -> AppResult<()> {
        let current = self.current_value(key)?;
        let unset = FilterValue::unset(current.kind());
        self.update_field(key, unset).await
    }

    /// Resets every field. Saved views are kept.
    pub async fn clear_all(&mut self) {
        self.filters = self.schema.default_state();
        self.persist_filters().await;
    }

    /// Saves the current filters under a name.
    pub async fn save_view(
        &mut self,
        name: &str,
        presentation: Option<ViewPresentation>,
    ) -> AppResult<SavedView> {
        let view = SavedView::capture(name, &self.filters, presentation, Utc::now())?;
        self.saved_views.push(view.clone());
        self.persist_views().await;

        info!(
            view = self.schema.view_key(),
            saved_view_id = %view.id(),
            "saved filter view"
        );
        Ok(view)
    }

    /// Replaces current filters with a copy of a saved view's snapshot.
    pub async fn apply_view(&mut self, view: &SavedView) -> SavedView {
        let (aligned, repaired) = self.schema.reconcile(view.filters());
        if !repaired.is_empty() {
            warn!(
                view = self.schema.view_key(),
                saved_view_id = %view.id(),
                fields = ?repaired,
                "saved view did not match the schema"
            );
        }

        self.filters = aligned;
        self.persist_filters().await;
        view.clone()
    }

    /// Applies a saved view by identifier.
    pub async fn apply_view_by_id(&mut self, id: SavedViewId) -> AppResult<SavedView> {
        let view = self
            .saved_view(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("saved view '{id}' does not exist")))?;

        Ok(self.apply_view(&view).await)
    }

    /// Deletes a saved view. Returns whether a view was removed.
    pub async fn delete_view(&mut self, id: SavedViewId) -> bool {
        let before = self.saved_views.len();
        self.saved_views.retain(|view| view.id() != id);
        if self.saved_views.len() == before {
            return false;
        }

        self.persist_views().await;
        info!(
            view = self.schema.view_key(),
            saved_view_id = %id,
            "deleted filter view"
        );
        true
    }

    /// Renames a saved view.
    pub async fn rename_view(&mut self, id: SavedViewId, name: &str) -> AppResult<SavedView> {
        let position = self
            .saved_views
            .iter()
            .position(|view| view.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("saved view '{id}' does not exist")))?;

        let renamed = self.saved_views[position].renamed(name)?;
        self.saved_views[position] = renamed.clone();
        self.persist_views().await;
        Ok(renamed)
    }

    /// Counts fields that differ from their unset value.
    #[must_use]
    pub fn count_active(&self) -> usize {
        self.filters.count_active()
    }

    /// Returns whether any filter is active.
    #[must_use]
    pub fn has_active(&self) -> bool {
        self.count_active() > 0
    }

    /// Returns chips for the active filters, or `None` when there are none.
    #[must_use]
    pub fn chips(&self) -> Option<Vec<FilterChip>> {
        filter_chips(&self.schema, &self.filters)
    }

    /// Returns the query parameters for the list collaborator.
    #[must_use]
    pub fn list_query(&self) -> ListQuery {
        ListQuery::from_filters(&self.schema, &self.filters)
    }

    /// Applies an action raised from the chip bar.
    pub async fn dispatch(&mut self, action: FilterChipAction) -> AppResult<()> {
        match action {
            FilterChipAction::Remove {
                key,
                value: Some(value),
            } => self.remove_value(key.as_str(), value.as_str()).await,
            FilterChipAction::Remove { key, value: None } => self.clear_field(key.as_str()).await,
            FilterChipAction::ClearAll => {
                self.clear_all().await;
                Ok(())
            }
        }
    }

    fn current_value(&self, key: &str) -> AppResult<&FilterValue> {
        self.filters.get(key).ok_or_else(|| {
            AppError::Validation(format!(
                "unknown filter field '{key}' in view '{}'",
                self.schema.view_key()
            ))
        })
    }

    async fn persist_filters(&mut self) {
        self.filters_persisted =
            write_through(self.storage.as_ref(), self.keys.filters(), &self.filters).await;
    }

    async fn persist_views(&mut self) {
        self.views_persisted = write_through(
            self.storage.as_ref(),
            self.keys.views(),
            self.saved_views.as_slice(),
        )
        .await;
    }
}
