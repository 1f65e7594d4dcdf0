use chrono::NaiveDate;
use nexo_core::{AppError, AppResult};
use nexo_domain::{FilterFieldKind, FilterValue, ListView, SavedViewId};

pub const USAGE: &str = "\
usage:
  nexo-console rut <value>
  nexo-console capabilities <role>
  nexo-console can <role> <capability>
  nexo-console filters <view> show|chips|query|clear|views
  nexo-console filters <view> set <field> <value>...
  nexo-console filters <view> unset <field>
  nexo-console filters <view> save <name>...
  nexo-console filters <view> apply|delete <view-id>
  nexo-console filters <view> rename <view-id> <name>...

views: clientes, cotizaciones, seguimientos
date ranges: 2024-01-01..2024-01-31, 2024-01-01.., ..31/01/2024";

/// One console invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Rut(String),
    Capabilities(String),
    Can { role: String, token: String },
    Filters { view: ListView, action: FilterAction },
}

/// Filter store operation requested from the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    Show,
    Chips,
    Query,
    Clear,
    Views,
    Set { field: String, values: Vec<String> },
    Unset { field: String },
    Save { name: String },
    Apply(SavedViewId),
    Delete(SavedViewId),
    Rename { id: SavedViewId, name: String },
}

impl Command {
    /// Parses arguments following the program name.
    pub fn parse(args: &[String]) -> AppResult<Self> {
        let Some((command, rest)) = args.split_first() else {
            return Err(usage_error("missing command"));
        };

        match (command.as_str(), rest) {
            ("rut", [_, ..]) => Ok(Self::Rut(rest.join(" "))),
            ("capabilities", [role]) => Ok(Self::Capabilities(role.clone())),
            ("can", [role, token]) => Ok(Self::Can {
                role: role.clone(),
                token: token.clone(),
            }),
            ("filters", [view, action, arguments @ ..]) => Ok(Self::Filters {
                view: view.parse()?,
                action: FilterAction::parse(action.as_str(), arguments)?,
            }),
            (other, _) => Err(usage_error(format!("unrecognized command '{other}'"))),
        }
    }
}

impl FilterAction {
    fn parse(action: &str, arguments: &[String]) -> AppResult<Self> {
        match (action, arguments) {
            ("show", []) => Ok(Self::Show),
            ("chips", []) => Ok(Self::Chips),
            ("query", []) => Ok(Self::Query),
            ("clear", []) => Ok(Self::Clear),
            ("views", []) => Ok(Self::Views),
            ("set", [field, values @ ..]) => Ok(Self::Set {
                field: field.clone(),
                values: values.to_vec(),
            }),
            ("unset", [field]) => Ok(Self::Unset {
                field: field.clone(),
            }),
            ("save", [_, ..]) => Ok(Self::Save {
                name: arguments.join(" "),
            }),
            ("apply", [id]) => Ok(Self::Apply(id.parse()?)),
            ("delete", [id]) => Ok(Self::Delete(id.parse()?)),
            ("rename", [id, name @ ..]) if !name.is_empty() => Ok(Self::Rename {
                id: id.parse()?,
                name: name.join(" "),
            }),
            (other, _) => Err(usage_error(format!(
                "unrecognized or incomplete filters action '{other}'"
            ))),
        }
    }
}

/// Builds a filter value of the given kind from console arguments.
///
/// Multi-select values may be given as separate arguments or comma-separated.
pub fn parse_filter_value(kind: FilterFieldKind, values: &[String]) -> AppResult<FilterValue> {
    match kind {
        FilterFieldKind::Text => Ok(FilterValue::text(values.join(" "))),
        FilterFieldKind::MultiSelect => Ok(FilterValue::multi_select(
            values
                .iter()
                .flat_map(|value| value.split(','))
                .map(str::trim)
                .filter(|value| !value.is_empty()),
        )),
        FilterFieldKind::SingleSelect => Ok(FilterValue::single_select(values.join(" ").trim())),
        FilterFieldKind::DateRange => parse_date_range(values.join("").as_str()),
    }
}

fn parse_date_range(value: &str) -> AppResult<FilterValue> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(FilterValue::unset(FilterFieldKind::DateRange));
    }

    let (from, to) = value.split_once("..").ok_or_else(|| {
        AppError::Validation(format!(
            "date range '{value}' must look like FROM..TO, FROM.. or ..TO"
        ))
    })?;

    Ok(FilterValue::date_range(parse_bound(from)?, parse_bound(to)?))
}

fn parse_bound(value: &str) -> AppResult<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .map(Some)
        .map_err(|error| AppError::Validation(format!("invalid date '{value}': {error}")))
}

fn usage_error(message: impl Into<String>) -> AppError {
    AppError::Validation(message.into())
}
