use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FilterSchema, FilterState, FilterValue};

/// Comparison applied by the list collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Equality comparison.
    Eq,
    /// Greater-than-or-equal comparison.
    Gte,
    /// Less-than-or-equal comparison.
    Lte,
    /// Case-insensitive substring match for text values.
    Contains,
    /// Membership in provided set.
    In,
}

/// One constraint of a list query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQueryCondition {
    /// Field key the condition applies to.
    pub field: String,
    /// Comparison operator.
    pub operator: FilterOperator,
    /// Operand value.
    pub value: Value,
}

/// Query parameters handed to the list data collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    /// View the query targets.
    pub view: String,
    /// Conditions joined with logical AND, in schema order.
    pub conditions: Vec<ListQueryCondition>,
}

impl ListQuery {
    /// Derives query conditions from the active filters.
    ///
    /// Unset fields contribute nothing; a date range contributes one
    /// condition per bound.
    #[must_use]
    pub fn from_filters(schema: &FilterSchema, state: &FilterState) -> Self {
        let mut conditions = Vec::new();

        for field in schema.fields() {
            let Some(value) = state.get(field.key()).filter(|value| value.is_active()) else {
                continue;
            };
            let key = field.key().to_owned();

            match value {
                FilterValue::Text { value } => {
                    conditions.push(condition(key, FilterOperator::Contains, value.clone().into()));
                }
                FilterValue::MultiSelect { values } => {
                    conditions.push(condition(key, FilterOperator::In, values.clone().into()));
                }
                FilterValue::SingleSelect { value } => {
                    conditions.push(condition(key, FilterOperator::Eq, value.clone().into()));
                }
                FilterValue::DateRange { from, to } => {
                    if let Some(from) = from {
                        conditions.push(condition(
                            key.clone(),
                            FilterOperator::Gte,
                            from.to_string().into(),
                        ));
                    }
                    if let Some(to) = to {
                        conditions.push(condition(key, FilterOperator::Lte, to.to_string().into()));
                    }
                }
            }
        }

        Self {
            view: schema.view_key().to_owned(),
            conditions,
        }
    }

    /// Returns whether the query is unconstrained.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.conditions.is_empty()
    }
}

fn condition(field: String, operator: FilterOperator, value: Value) -> ListQueryCondition {
    ListQueryCondition {
        field,
        operator,
        value,
    }
}
