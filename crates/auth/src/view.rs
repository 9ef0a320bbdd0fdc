//! Read-permission view delivered to signed-in sessions.
//!
//! Sessions never see the full editor map: only nodes the role can read,
//! with their CRUD grants and without `enabled`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use navguard_navigation::ReadAccess;

use crate::permissions::CrudAction;

/// CRUD grants for one node as seen by a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrudGrant {
    pub read: bool,
    pub add: bool,
    pub update: bool,
    pub delete: bool,
}

impl CrudGrant {
    pub fn allows(&self, action: CrudAction) -> bool {
        match action {
            CrudAction::Read => self.read,
            CrudAction::Add => self.add,
            CrudAction::Update => self.update,
            CrudAction::Delete => self.delete,
        }
    }
}

pub fn has_read_permission(grant: Option<&CrudGrant>) -> bool {
    grant.is_some_and(|g| g.read)
}

/// `{ url: { read, add, update, delete } }` for every readable node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadPermissionView(BTreeMap<String, CrudGrant>);

impl ReadPermissionView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, grant: CrudGrant) {
        self.0.insert(url.into(), grant);
    }

    pub fn get(&self, url: &str) -> Option<&CrudGrant> {
        self.0.get(url)
    }

    pub fn allows(&self, url: &str, action: CrudAction) -> bool {
        self.get(url).is_some_and(|g| g.allows(action))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CrudGrant)> {
        self.0.iter().map(|(url, grant)| (url.as_str(), grant))
    }
}

impl FromIterator<(String, CrudGrant)> for ReadPermissionView {
    fn from_iter<I: IntoIterator<Item = (String, CrudGrant)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl ReadAccess for ReadPermissionView {
    fn can_read(&self, url: &str) -> bool {
        has_read_permission(self.get(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_payload_shape() {
        let view: ReadPermissionView = serde_json::from_str(
            r#"{
                "/inventory": { "read": true, "add": true, "update": false, "delete": false },
                "/billing": { "read": false }
            }"#,
        )
        .unwrap();

        assert!(view.can_read("/inventory"));
        assert!(!view.can_read("/billing"));
        assert!(!view.can_read("/unknown"));
        assert!(view.allows("/inventory", CrudAction::Add));
        assert!(!view.allows("/inventory", CrudAction::Delete));
    }

    #[test]
    fn has_read_permission_handles_missing_records() {
        assert!(!has_read_permission(None));
        assert!(has_read_permission(Some(&CrudGrant {
            read: true,
            ..CrudGrant::default()
        })));
    }
}
