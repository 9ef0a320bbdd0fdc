use navguard_core::{PrincipalId, RoleId, TenantId};

/// Tenant context for a request.
///
/// This is immutable and must be present for all protected routes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Principal context for a request (authenticated identity + role).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    role_id: Option<RoleId>,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, role_id: Option<RoleId>) -> Self {
        Self {
            principal_id,
            role_id,
        }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    /// `None` for the tenant owner.
    pub fn role_id(&self) -> Option<RoleId> {
        self.role_id
    }

    pub fn is_tenant_owner(&self) -> bool {
        self.role_id.is_none()
    }
}
