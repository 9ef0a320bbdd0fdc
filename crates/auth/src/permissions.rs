use core::str::FromStr;

use serde::{Deserialize, Serialize};

use navguard_core::DomainError;

/// One of the four granular grants a role holds on a navigation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrudAction {
    Read,
    Add,
    Update,
    Delete,
}

impl CrudAction {
    pub const ALL: [CrudAction; 4] = [
        CrudAction::Read,
        CrudAction::Add,
        CrudAction::Update,
        CrudAction::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CrudAction::Read => "read",
            CrudAction::Add => "add",
            CrudAction::Update => "update",
            CrudAction::Delete => "delete",
        }
    }

    /// `add`, `update` and `delete` all require `read`.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, CrudAction::Read)
    }
}

impl core::fmt::Display for CrudAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrudAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(CrudAction::Read),
            "add" => Ok(CrudAction::Add),
            "update" => Ok(CrudAction::Update),
            "delete" => Ok(CrudAction::Delete),
            other => Err(DomainError::validation(format!(
                "unknown permission '{other}' (expected read, add, update or delete)"
            ))),
        }
    }
}

/// Permission state of one navigation node within a role.
///
/// A record is *effectively granted* only when `enabled` is set and at least
/// one CRUD bit is set. `enabled` with no bits is a legal, stored state, but
/// it grants nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionRecord {
    pub enabled: bool,
    pub read: bool,
    pub add: bool,
    pub update: bool,
    pub delete: bool,
}

impl PermissionRecord {
    /// Disabled, no grants. Every node starts here.
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            read: false,
            add: false,
            update: false,
            delete: false,
        }
    }

    /// Enabled with all four grants.
    pub const fn full() -> Self {
        Self {
            enabled: true,
            read: true,
            add: true,
            update: true,
            delete: true,
        }
    }

    /// Enabled, with the CRUD bits copied from `source`.
    pub fn enabled_like(source: &PermissionRecord) -> Self {
        Self {
            enabled: true,
            ..source.crud_only()
        }
    }

    /// The CRUD bits of `self` with `enabled` cleared.
    pub fn crud_only(&self) -> Self {
        Self {
            enabled: false,
            ..*self
        }
    }

    pub fn get(&self, action: CrudAction) -> bool {
        match action {
            CrudAction::Read => self.read,
            CrudAction::Add => self.add,
            CrudAction::Update => self.update,
            CrudAction::Delete => self.delete,
        }
    }

    pub fn set(&mut self, action: CrudAction, value: bool) {
        match action {
            CrudAction::Read => self.read = value,
            CrudAction::Add => self.add = value,
            CrudAction::Update => self.update = value,
            CrudAction::Delete => self.delete = value,
        }
    }

    pub fn has_any_crud(&self) -> bool {
        self.read || self.add || self.update || self.delete
    }

    pub fn is_granted(&self) -> bool {
        self.enabled && self.has_any_crud()
    }

    pub fn clear_crud(&mut self) {
        self.read = false;
        self.add = false;
        self.update = false;
        self.delete = false;
    }

    /// Overwrite the CRUD bits with those of `source`, keeping `enabled`.
    pub fn copy_crud_from(&mut self, source: &PermissionRecord) {
        for action in CrudAction::ALL {
            self.set(action, source.get(action));
        }
    }

    /// Same CRUD bits, `enabled` ignored.
    pub fn same_crud(&self, other: &PermissionRecord) -> bool {
        CrudAction::ALL
            .iter()
            .all(|&action| self.get(action) == other.get(action))
    }

    /// Drop every bit `cap` does not hold.
    pub fn restrict_to(&mut self, cap: &PermissionRecord) {
        for action in CrudAction::ALL {
            if !cap.get(action) {
                self.set(action, false);
            }
        }
    }

    /// Drop mutation bits when `read` is unset.
    pub fn enforce_read_requirement(&mut self) {
        if !self.read {
            self.clear_crud();
        }
    }
}
