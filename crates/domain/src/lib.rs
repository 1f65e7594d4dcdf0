//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod filter_chip;
mod filter_schema;
mod filter_state;
mod list_query;
mod list_view;
mod permission;
mod rut;
mod saved_view;

pub use filter_chip::{FilterChip, FilterChipAction, filter_chips};
pub use filter_schema::{FilterFieldDefinition, FilterOption, FilterSchema};
pub use filter_state::{FilterFieldKind, FilterState, FilterValue};
pub use list_query::{FilterOperator, ListQuery, ListQueryCondition};
pub use list_view::ListView;
pub use permission::{Capability, Role, capabilities_for, has_capability, require_capability};
pub use rut::{
    Rut, RutError, RutValidation, clean_rut, compute_check_digit, format_rut, validate_rut,
};
pub use saved_view::{SavedView, SavedViewId, SortDirection, ViewPresentation, ViewSort};
