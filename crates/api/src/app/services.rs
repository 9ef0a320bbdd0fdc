//! Tenant-scoped application services behind the HTTP handlers.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use navguard_auth::{
    AuthzError, CascadeError, CrudAction, PermissionCascade, PermissionMap, RoleEditor,
    RolePayload, RoleRecord, SessionGrants,
};
use navguard_core::{DomainError, RoleId, TenantId};
use navguard_navigation::{NavError, NavIndex, NavigationTree};

use crate::context::PrincipalContext;
use crate::store::{InMemoryTenantStore, TenantStore};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error(transparent)]
    Cascade(#[from] CascadeError),

    #[error(transparent)]
    Navigation(#[from] NavError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// One editor interaction, as sent by the role form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorAction {
    Enabled,
    Read,
    Add,
    Update,
    Delete,
    SelectAll,
}

/// A tenant's subscribed menus together with their index.
#[derive(Debug, Clone)]
pub struct TenantMenus {
    pub tree: Arc<NavigationTree>,
    pub index: Arc<NavIndex>,
}

impl TenantMenus {
    pub fn new(tree: NavigationTree) -> Result<Self, NavError> {
        let index = NavIndex::build(&tree)?;
        Ok(Self {
            tree: Arc::new(tree),
            index: Arc::new(index),
        })
    }
}

pub struct AppServices {
    catalog: TenantMenus,
    menus: InMemoryTenantStore<(), TenantMenus>,
    roles: InMemoryTenantStore<RoleId, RoleRecord>,
}

impl AppServices {
    /// `catalog` is served to every tenant without a subscription of its own.
    pub fn new(catalog: NavigationTree) -> Result<Self, NavError> {
        Ok(Self {
            catalog: TenantMenus::new(catalog)?,
            menus: InMemoryTenantStore::new(),
            roles: InMemoryTenantStore::new(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Menus
    // ─────────────────────────────────────────────────────────────────────────

    pub fn menus(&self, tenant_id: TenantId) -> TenantMenus {
        self.menus
            .get(tenant_id, &())
            .unwrap_or_else(|| self.catalog.clone())
    }

    /// Replace the tenant's subscribed menus. Stored role maps are left as they
    /// are and laid over the new forest whenever they are read.
    pub fn subscribe_menus(&self, tenant_id: TenantId, tree: NavigationTree) -> ServiceResult<TenantMenus> {
        let menus = TenantMenus::new(tree)?;
        tracing::info!(
            tenant_id = %tenant_id,
            nodes = menus.index.len(),
            "tenant menus replaced"
        );
        self.menus.upsert(tenant_id, (), menus.clone());
        Ok(menus)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session grants
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve what the calling session may do in its tenant.
    pub fn grants(&self, tenant_id: TenantId, principal: &PrincipalContext) -> ServiceResult<SessionGrants> {
        let Some(role_id) = principal.role_id() else {
            return Ok(SessionGrants::Owner);
        };

        let role = self.roles.get(tenant_id, &role_id).ok_or_else(|| {
            DomainError::unauthorized(format!("role {role_id} does not exist in this tenant"))
        })?;

        let menus = self.menus(tenant_id);
        let permissions = PermissionCascade::new(&menus.index).normalize(&role.payload.permissions);
        Ok(SessionGrants::Role(permissions.read_view()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Roles
    // ─────────────────────────────────────────────────────────────────────────

    /// Roles of the tenant, oldest first.
    pub fn list_roles(&self, tenant_id: TenantId) -> Vec<RoleRecord> {
        let mut roles = self.roles.list(tenant_id);
        roles.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        roles
    }

    pub fn get_role(&self, tenant_id: TenantId, role_id: RoleId) -> ServiceResult<RoleRecord> {
        self.roles
            .get(tenant_id, &role_id)
            .ok_or_else(|| DomainError::not_found("role", role_id.to_string()).into())
    }

    pub fn create_role(&self, tenant_id: TenantId, payload: RolePayload) -> ServiceResult<RoleRecord> {
        let payload = self.prepare(tenant_id, payload)?;
        let role_id = RoleId::new();
        let now = Utc::now();

        let record = self.roles.upsert_with(tenant_id, role_id, &|_current, others| {
            ensure_unique_name(others, &payload.role_name)?;
            Ok(RoleRecord {
                id: role_id,
                tenant_id,
                payload: payload.clone(),
                created_at: now,
                updated_at: now,
            })
        })?;

        tracing::info!(
            tenant_id = %tenant_id,
            role_id = %record.id,
            granted = record.payload.permissions.granted_urls().count(),
            "role created"
        );
        Ok(record)
    }

    /// Replace a role's payload. A role deleted concurrently stays deleted.
    pub fn update_role(
        &self,
        tenant_id: TenantId,
        role_id: RoleId,
        payload: RolePayload,
    ) -> ServiceResult<RoleRecord> {
        let payload = self.prepare(tenant_id, payload)?;
        let now = Utc::now();

        let record = self.roles.upsert_with(tenant_id, role_id, &|current, others| {
            let existing =
                current.ok_or_else(|| DomainError::not_found("role", role_id.to_string()))?;
            ensure_unique_name(others, &payload.role_name)?;
            Ok(RoleRecord {
                payload: payload.clone(),
                updated_at: now,
                ..existing.clone()
            })
        })?;

        tracing::info!(
            tenant_id = %tenant_id,
            role_id = %role_id,
            granted = record.payload.permissions.granted_urls().count(),
            "role updated"
        );
        Ok(record)
    }

    pub fn delete_role(&self, tenant_id: TenantId, role_id: RoleId) -> ServiceResult<RoleRecord> {
        let removed = self
            .roles
            .remove(tenant_id, &role_id)
            .ok_or_else(|| DomainError::not_found("role", role_id.to_string()))?;
        tracing::info!(tenant_id = %tenant_id, role_id = %role_id, "role deleted");
        Ok(removed)
    }

    /// Validate a payload and normalise its map against the tenant's forest.
    fn prepare(&self, tenant_id: TenantId, mut payload: RolePayload) -> ServiceResult<RolePayload> {
        payload.role_name = payload.role_name.trim().to_string();
        payload.validate()?;

        let menus = self.menus(tenant_id);
        payload.permissions = PermissionCascade::new(&menus.index).normalize(&payload.permissions);
        Ok(payload)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Editor
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply one editor interaction to a working map.
    ///
    /// The client's map is normalised first, so a stale or hand-edited map
    /// cannot carry a broken state through. Returns the next map and the
    /// parents the form should show expanded.
    pub fn apply_editor_action(
        &self,
        tenant_id: TenantId,
        permissions: &PermissionMap,
        url: &str,
        action: EditorAction,
    ) -> ServiceResult<(PermissionMap, BTreeSet<String>)> {
        let menus = self.menus(tenant_id);
        let working = PermissionCascade::new(&menus.index).normalize(permissions);
        let mut editor = RoleEditor::edit(menus.index, &working);

        match action {
            EditorAction::Enabled => editor.toggle_enabled(url)?,
            EditorAction::SelectAll => editor.select_all(url)?,
            EditorAction::Read => editor.toggle_bit(url, CrudAction::Read)?,
            EditorAction::Add => editor.toggle_bit(url, CrudAction::Add)?,
            EditorAction::Update => editor.toggle_bit(url, CrudAction::Update)?,
            EditorAction::Delete => editor.toggle_bit(url, CrudAction::Delete)?,
        };

        Ok((editor.permissions().clone(), editor.expanded().clone()))
    }
}

/// Role names are unique per tenant, compared case-insensitively.
fn ensure_unique_name(others: &[&RoleRecord], role_name: &str) -> Result<(), DomainError> {
    if others
        .iter()
        .any(|other| other.payload.role_name.eq_ignore_ascii_case(role_name))
    {
        return Err(DomainError::conflict(format!(
            "role name '{role_name}' is already used in this tenant"
        )));
    }
    Ok(())
}
