use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use navguard_core::{BranchId, DomainError, DomainResult, RoleId, TenantId};

use crate::map::PermissionMap;

/// Which branches of the tenant a role applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
    #[default]
    AllBranches,
    SelectedBranches,
}

/// Role create/update payload, as exchanged with the role API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePayload {
    #[serde(rename = "roleName")]
    pub role_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub scope: RoleScope,

    #[serde(default)]
    pub branch_uuid: Vec<BranchId>,

    #[serde(default)]
    pub permissions: PermissionMap,
}

impl RolePayload {
    pub fn validate(&self) -> DomainResult<()> {
        if self.role_name.trim().is_empty() {
            return Err(DomainError::validation("roleName must not be blank"));
        }

        if self.scope == RoleScope::SelectedBranches && self.branch_uuid.is_empty() {
            return Err(DomainError::validation(
                "scope selected_branches requires at least one branch",
            ));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.branch_uuid.iter().find(|b| !seen.insert(**b)) {
            return Err(DomainError::validation(format!("branch {dup} listed twice")));
        }

        Ok(())
    }
}

/// A stored role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub tenant_id: TenantId,

    #[serde(flatten)]
    pub payload: RolePayload,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
