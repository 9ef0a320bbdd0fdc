//! Role editing session.
//!
//! Owns the working permission map for one role form. Created blank for a new
//! role or from a persisted payload; dropped when the form is left.

use std::collections::BTreeSet;
use std::sync::Arc;

use navguard_core::BranchId;
use navguard_navigation::NavIndex;

use crate::cascade::{CascadeError, PermissionCascade};
use crate::map::PermissionMap;
use crate::permissions::CrudAction;
use crate::roles::{RolePayload, RoleScope};

#[derive(Debug, Clone)]
pub struct RoleEditor {
    index: Arc<NavIndex>,
    permissions: PermissionMap,
    expanded: BTreeSet<String>,
}

impl RoleEditor {
    /// A blank role: every node disabled, nothing expanded.
    pub fn new_role(index: Arc<NavIndex>) -> Self {
        let permissions = PermissionMap::for_index(&index);
        Self {
            index,
            permissions,
            expanded: BTreeSet::new(),
        }
    }

    /// Edit a persisted role. Its map is laid over the current forest and the
    /// parents that show a grant start expanded.
    pub fn edit(index: Arc<NavIndex>, persisted: &PermissionMap) -> Self {
        let permissions = PermissionMap::overlay(&index, persisted);
        let expanded = PermissionCascade::new(&index).expanded_nodes(&permissions);
        Self {
            index,
            permissions,
            expanded,
        }
    }

    pub fn permissions(&self) -> &PermissionMap {
        &self.permissions
    }

    pub fn expanded(&self) -> &BTreeSet<String> {
        &self.expanded
    }

    pub fn is_expanded(&self, url: &str) -> bool {
        self.expanded.contains(url)
    }

    pub fn has_granted_descendants(&self, url: &str) -> bool {
        PermissionCascade::new(&self.index).has_granted_descendants(&self.permissions, url)
    }

    pub fn toggle_enabled(&mut self, url: &str) -> Result<&PermissionMap, CascadeError> {
        self.apply(|cascade, map| cascade.toggle_node_enabled(map, url))
    }

    pub fn toggle_bit(
        &mut self,
        url: &str,
        action: CrudAction,
    ) -> Result<&PermissionMap, CascadeError> {
        self.apply(|cascade, map| cascade.toggle_permission_bit(map, url, action))
    }

    pub fn select_all(&mut self, url: &str) -> Result<&PermissionMap, CascadeError> {
        self.apply(|cascade, map| cascade.select_all_permissions(map, url))
    }

    fn apply(
        &mut self,
        op: impl FnOnce(&PermissionCascade<'_>, &PermissionMap) -> Result<PermissionMap, CascadeError>,
    ) -> Result<&PermissionMap, CascadeError> {
        let cascade = PermissionCascade::new(&self.index);
        let next = op(&cascade, &self.permissions)?;

        // Parents that just started showing a grant open automatically.
        let before = cascade.expanded_nodes(&self.permissions);
        for url in cascade.expanded_nodes(&next) {
            if !before.contains(&url) {
                self.expanded.insert(url);
            }
        }

        self.permissions = next;
        Ok(&self.permissions)
    }

    /// Finish the session into the payload the role API accepts.
    pub fn into_payload(
        self,
        role_name: impl Into<String>,
        description: impl Into<String>,
        scope: RoleScope,
        branch_uuid: Vec<BranchId>,
    ) -> RolePayload {
        RolePayload {
            role_name: role_name.into(),
            description: description.into(),
            scope,
            branch_uuid,
            permissions: self.permissions,
        }
    }
}
