use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nexo_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Capabilities checked before rendering or executing a module action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Capability {
    /// Allows listing and opening clients.
    ClientsView,
    /// Allows registering new clients.
    ClientsCreate,
    /// Allows editing client records.
    ClientsEdit,
    /// Allows deleting client records.
    ClientsDelete,
    /// Allows listing and opening quotes.
    QuotesView,
    /// Allows drafting and sending quotes.
    QuotesCreate,
    /// Allows approving quotes above the seller's discount limit.
    QuotesApprove,
    /// Allows viewing the opportunity pipeline.
    OpportunitiesView,
    /// Allows moving opportunities between stages and logging follow-ups.
    OpportunitiesManage,
    /// Allows viewing receivables.
    CollectionsView,
    /// Allows recording collection actions and payment agreements.
    CollectionsManage,
    /// Allows viewing technical-service tickets.
    ServiceView,
    /// Allows assigning and closing technical-service tickets.
    ServiceManage,
    /// Allows viewing shipments.
    LogisticsView,
    /// Allows dispatching shipments.
    LogisticsDispatch,
    /// Allows opening reports.
    ReportsView,
    /// Allows managing users and their roles.
    UsersManage,
    /// Allows editing company settings.
    SettingsEdit,
    /// Allows reading the audit log.
    AuditView,
}

impl Capability {
    /// Returns the stable dot-namespaced token for this capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientsView => "clientes.ver",
            Self::ClientsCreate => "clientes.crear",
            Self::ClientsEdit => "clientes.editar",
            Self::ClientsDelete => "clientes.eliminar",
            Self::QuotesView => "cotizaciones.ver",
            Self::QuotesCreate => "cotizaciones.crear",
            Self::QuotesApprove => "cotizaciones.aprobar",
            Self::OpportunitiesView => "oportunidades.ver",
            Self::OpportunitiesManage => "oportunidades.gestionar",
            Self::CollectionsView => "cobranzas.ver",
            Self::CollectionsManage => "cobranzas.gestionar",
            Self::ServiceView => "servicio_tecnico.ver",
            Self::ServiceManage => "servicio_tecnico.gestionar",
            Self::LogisticsView => "logistica.ver",
            Self::LogisticsDispatch => "logistica.despachar",
            Self::ReportsView => "reportes.ver",
            Self::UsersManage => "usuarios.gestionar",
            Self::SettingsEdit => "configuracion.editar",
            Self::AuditView => "auditoria.ver",
        }
    }

    /// Returns all known capabilities.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Capability] = &[
            Capability::ClientsView,
            Capability::ClientsCreate,
            Capability::ClientsEdit,
            Capability::ClientsDelete,
            Capability::QuotesView,
            Capability::QuotesCreate,
            Capability::QuotesApprove,
            Capability::OpportunitiesView,
            Capability::OpportunitiesManage,
            Capability::CollectionsView,
            Capability::CollectionsManage,
            Capability::ServiceView,
            Capability::ServiceManage,
            Capability::LogisticsView,
            Capability::LogisticsDispatch,
            Capability::ReportsView,
            Capability::UsersManage,
            Capability::SettingsEdit,
            Capability::AuditView,
        ];

        ALL
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|capability| capability.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown capability token '{value}'")))
    }
}

impl TryFrom<String> for Capability {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Capability> for String {
    fn from(value: Capability) -> Self {
        value.as_str().to_owned()
    }
}

impl Display for Capability {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Fixed set of user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full access, including users and settings.
    #[serde(rename = "admin")]
    Admin,
    /// Commercial manager.
    #[serde(rename = "gerente")]
    Manager,
    /// Sales representative.
    #[serde(rename = "vendedor")]
    Sales,
    /// Collections agent.
    #[serde(rename = "cobranzas")]
    Collections,
    /// Field or bench technician.
    #[serde(rename = "tecnico")]
    Technician,
    /// Warehouse and dispatch staff.
    #[serde(rename = "logistica")]
    Logistics,
    /// Read-only access to every module.
    #[serde(rename = "lectura")]
    ReadOnly,
}

const MANAGER_CAPABILITIES: &[Capability] = &[
    Capability::ClientsView,
    Capability::ClientsCreate,
    Capability::ClientsEdit,
    Capability::QuotesView,
    Capability::QuotesCreate,
    Capability::QuotesApprove,
    Capability::OpportunitiesView,
    Capability::OpportunitiesManage,
    Capability::CollectionsView,
    Capability::CollectionsManage,
    Capability::ServiceView,
    Capability::LogisticsView,
    Capability::ReportsView,
    Capability::AuditView,
];

const SALES_CAPABILITIES: &[Capability] = &[
    Capability::ClientsView,
    Capability::ClientsCreate,
    Capability::ClientsEdit,
    Capability::QuotesView,
    Capability::QuotesCreate,
    Capability::OpportunitiesView,
    Capability::OpportunitiesManage,
];

const COLLECTIONS_CAPABILITIES: &[Capability] = &[
    Capability::ClientsView,
    Capability::QuotesView,
    Capability::CollectionsView,
    Capability::CollectionsManage,
    Capability::ReportsView,
];

const TECHNICIAN_CAPABILITIES: &[Capability] = &[
    Capability::ClientsView,
    Capability::ServiceView,
    Capability::ServiceManage,
];

const LOGISTICS_CAPABILITIES: &[Capability] = &[
    Capability::ClientsView,
    Capability::LogisticsView,
    Capability::LogisticsDispatch,
];

const READ_ONLY_CAPABILITIES: &[Capability] = &[
    Capability::ClientsView,
    Capability::QuotesView,
    Capability::OpportunitiesView,
    Capability::CollectionsView,
    Capability::ServiceView,
    Capability::LogisticsView,
    Capability::ReportsView,
];

impl Role {
    /// Returns the stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "gerente",
            Self::Sales => "vendedor",
            Self::Collections => "cobranzas",
            Self::Technician => "tecnico",
            Self::Logistics => "logistica",
            Self::ReadOnly => "lectura",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[
            Self::Admin,
            Self::Manager,
            Self::Sales,
            Self::Collections,
            Self::Technician,
            Self::Logistics,
            Self::ReadOnly,
        ]
    }

    /// Returns the capabilities granted to this role.
    #[must_use]
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Self::Admin => Capability::all(),
            Self::Manager => MANAGER_CAPABILITIES,
            Self::Sales => SALES_CAPABILITIES,
            Self::Collections => COLLECTIONS_CAPABILITIES,
            Self::Technician => TECHNICIAN_CAPABILITIES,
            Self::Logistics => LOGISTICS_CAPABILITIES,
            Self::ReadOnly => READ_ONLY_CAPABILITIES,
        }
    }

    /// Returns whether this role grants the capability.
    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown role '{value}'")))
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Returns whether a role grants a capability token.
///
/// Unknown roles and unknown tokens are never granted.
#[must_use]
pub fn has_capability(role: &str, token: &str) -> bool {
    match (role.parse::<Role>(), token.parse::<Capability>()) {
        (Ok(role), Ok(capability)) => role.has(capability),
        _ => false,
    }
}

/// Returns the capabilities granted to a role, or an empty set for unknown roles.
#[must_use]
pub fn capabilities_for(role: &str) -> BTreeSet<Capability> {
    role.parse::<Role>()
        .map(|role| role.capabilities().iter().copied().collect())
        .unwrap_or_default()
}

/// Ensures a role grants a capability.
pub fn require_capability(role: Role, capability: Capability) -> AppResult<()> {
    if role.has(capability) {
        return Ok(());
    }

    Err(AppError::Forbidden(format!(
        "role '{role}' is missing capability '{capability}'"
    )))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::str::FromStr;

    use nexo_core::AppError;

    use super::{Capability, Role, capabilities_for, has_capability, require_capability};

    #[test]
    fn capability_roundtrip_storage_value() {
        for capability in Capability::all() {
            let restored = Capability::from_str(capability.as_str());
            assert!(restored.is_ok());
            assert_eq!(restored.unwrap_or(Capability::AuditView), *capability);
        }
    }

    #[test]
    fn capability_tokens_are_unique_and_namespaced() {
        let tokens: HashSet<&str> = Capability::all().iter().map(Capability::as_str).collect();
        assert_eq!(tokens.len(), Capability::all().len());
        assert!(tokens.iter().all(|token| token.split('.').count() == 2));
    }

    #[test]
    fn unknown_capability_is_rejected() {
        assert!(Capability::from_str("cobranzas.borrar").is_err());
    }

    #[test]
    fn admin_manages_collections() {
        assert!(has_capability("admin", "cobranzas.gestionar"));
    }

    #[test]
    fn technician_cannot_manage_collections() {
        assert!(!has_capability("tecnico", "cobranzas.gestionar"));
        assert!(has_capability("tecnico", "servicio_tecnico.gestionar"));
    }

    #[test]
    fn unknown_role_has_no_capabilities() {
        assert!(!has_capability("unknown_role", "clientes.ver"));
        assert!(capabilities_for("unknown_role").is_empty());
    }

    #[test]
    fn unknown_token_is_not_granted_even_to_admin() {
        assert!(!has_capability("admin", "clientes.exportar"));
    }

    #[test]
    fn admin_holds_every_capability() {
        assert_eq!(capabilities_for("admin").len(), Capability::all().len());
    }

    #[test]
    fn every_role_grants_client_lookup() {
        for role in Role::all() {
            assert!(role.has(Capability::ClientsView), "{role}");
        }
    }

    #[test]
    fn read_only_role_never_mutates() {
        assert!(
            Role::ReadOnly
                .capabilities()
                .iter()
                .all(|capability| capability.as_str().ends_with(".ver"))
        );
    }

    #[test]
    fn require_capability_forbids_missing_grant() {
        let result = require_capability(Role::Sales, Capability::QuotesApprove);
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(require_capability(Role::Manager, Capability::QuotesApprove).is_ok());
    }

    #[test]
    fn role_serializes_as_storage_value() {
        assert_eq!(
            serde_json::to_string(&Role::Technician).unwrap_or_default(),
            "\"tecnico\""
        );
    }
}
