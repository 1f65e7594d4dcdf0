use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nexo_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{FilterFieldDefinition, FilterFieldKind, FilterOption, FilterSchema};

/// Filterable list views of the sales and collections modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListView {
    /// Client list.
    #[serde(rename = "clientes")]
    Clients,
    /// Quote list.
    #[serde(rename = "cotizaciones")]
    Quotes,
    /// Opportunity follow-up list.
    #[serde(rename = "seguimientos")]
    FollowUps,
}

impl ListView {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clients => "clientes",
            Self::Quotes => "cotizaciones",
            Self::FollowUps => "seguimientos",
        }
    }

    /// Returns all list views.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Clients, Self::Quotes, Self::FollowUps]
    }

    /// Builds the filter schema of this view.
    pub fn schema(&self) -> AppResult<FilterSchema> {
        let fields = match self {
            Self::Clients => vec![
                text_field()?,
                select_field(
                    "estados",
                    "Estado",
                    &[
                        ("activo", "Activo"),
                        ("prospecto", "Prospecto"),
                        ("inactivo", "Inactivo"),
                        ("moroso", "Moroso"),
                    ],
                )?,
                FilterFieldDefinition::new("vendedor", "Vendedor", FilterFieldKind::SingleSelect)?,
                FilterFieldDefinition::new(
                    "fecha_creacion",
                    "Fecha de creación",
                    FilterFieldKind::DateRange,
                )?,
            ],
            Self::Quotes => vec![
                text_field()?,
                select_field(
                    "estados",
                    "Estado",
                    &[
                        ("borrador", "Borrador"),
                        ("enviada", "Enviada"),
                        ("aceptada", "Aceptada"),
                        ("rechazada", "Rechazada"),
                        ("vencida", "Vencida"),
                    ],
                )?,
                FilterFieldDefinition::new("vendedor", "Vendedor", FilterFieldKind::SingleSelect)?,
                FilterFieldDefinition::new(
                    "fecha_emision",
                    "Fecha de emisión",
                    FilterFieldKind::DateRange,
                )?,
            ],
            Self::FollowUps => vec![
                text_field()?,
                select_field(
                    "etapas",
                    "Etapa",
                    &[
                        ("prospeccion", "Prospección"),
                        ("calificacion", "Calificación"),
                        ("propuesta", "Propuesta"),
                        ("negociacion", "Negociación"),
                        ("ganada", "Ganada"),
                        ("perdida", "Perdida"),
                    ],
                )?,
                FilterFieldDefinition::new(
                    "responsable",
                    "Responsable",
                    FilterFieldKind::SingleSelect,
                )?,
                FilterFieldDefinition::new(
                    "fecha_cierre",
                    "Fecha de cierre",
                    FilterFieldKind::DateRange,
                )?,
            ],
        };

        FilterSchema::new(self.as_str(), fields)
    }
}

fn text_field() -> AppResult<FilterFieldDefinition> {
    FilterFieldDefinition::new("texto", "Búsqueda", FilterFieldKind::Text)
}

fn select_field(
    key: &str,
    label: &str,
    options: &[(&str, &str)],
) -> AppResult<FilterFieldDefinition> {
    let options = options
        .iter()
        .map(|(value, label)| FilterOption::new(*value, *label))
        .collect::<AppResult<Vec<_>>>()?;

    FilterFieldDefinition::new(key, label, FilterFieldKind::MultiSelect)?.with_options(options)
}

impl FromStr for ListView {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "clientes" => Ok(Self::Clients),
            "cotizaciones" => Ok(Self::Quotes),
            "seguimientos" => Ok(Self::FollowUps),
            _ => Err(AppError::Validation(format!("unknown list view '{value}'"))),
        }
    }
}

impl Display for ListView {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
