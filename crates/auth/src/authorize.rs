use serde::Serialize;
use thiserror::Error;

use navguard_navigation::{NavigationTree, ReadAccess, matching_node, normalize_url};

use crate::permissions::CrudAction;
use crate::view::ReadPermissionView;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: no read grant for '{0}'")]
    Forbidden(String),

    #[error("forbidden: '{0}' is not a registered navigation route")]
    UnknownUrl(String),

    #[error("forbidden: missing '{action}' on '{url}'")]
    MissingAction { url: String, action: CrudAction },
}

/// What a signed-in session may do, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionGrants {
    /// Tenant owner: every node, every action.
    Owner,
    /// Grants of the session's role.
    Role(ReadPermissionView),
}

impl SessionGrants {
    pub fn allows(&self, url: &str, action: CrudAction) -> bool {
        match self {
            SessionGrants::Owner => true,
            SessionGrants::Role(view) => view.allows(url, action),
        }
    }
}

impl ReadAccess for SessionGrants {
    fn can_read(&self, url: &str) -> bool {
        self.allows(url, CrudAction::Read)
    }
}

/// Route guard for `target_url`.
///
/// - No IO
/// - No panics
pub fn authorize_url(
    tree: &NavigationTree,
    access: &impl ReadAccess,
    target_url: &str,
) -> Result<(), AuthzError> {
    let node = matching_node(tree.sections(), target_url)
        .ok_or_else(|| AuthzError::UnknownUrl(normalize_url(target_url).to_string()))?;
    if access.can_read(&node.url) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(node.url.clone()))
    }
}

/// Check a specific action on a node (used for management endpoints).
pub fn authorize_action(
    grants: &SessionGrants,
    url: &str,
    action: CrudAction,
) -> Result<(), AuthzError> {
    if grants.allows(url, action) {
        Ok(())
    } else {
        Err(AuthzError::MissingAction {
            url: url.to_string(),
            action,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Access Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Why a route was allowed or denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessExplanation {
    /// The url as requested.
    pub target_url: String,

    /// The url after stripping query and trailing slash.
    pub normalized_url: String,

    pub granted: bool,

    /// The registered node that decided, if any matched.
    pub matched_node: Option<String>,

    /// Whether the match was exact or by prefix.
    pub prefix_match: bool,

    pub reason: String,
}

pub fn explain_url_access(
    tree: &NavigationTree,
    access: &impl ReadAccess,
    target_url: &str,
) -> AccessExplanation {
    let normalized = normalize_url(target_url).to_string();

    let Some(node) = matching_node(tree.sections(), target_url) else {
        return AccessExplanation {
            target_url: target_url.to_string(),
            normalized_url: normalized.clone(),
            granted: false,
            matched_node: None,
            prefix_match: false,
            reason: format!("No navigation node matches '{normalized}'"),
        };
    };

    let granted = access.can_read(&node.url);
    let prefix_match = normalize_url(&node.url) != normalized;
    let how = if prefix_match { "falls under" } else { "is" };
    let reason = if granted {
        format!("'{normalized}' {how} node '{}', which the role can read", node.url)
    } else {
        format!("'{normalized}' {how} node '{}', which the role cannot read", node.url)
    };

    AccessExplanation {
        target_url: target_url.to_string(),
        normalized_url: normalized,
        granted,
        matched_node: Some(node.url.clone()),
        prefix_match,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::CrudGrant;
    use navguard_navigation::{NavigationNode, NavigationSection};

    fn tree() -> NavigationTree {
        NavigationTree::new(vec![NavigationSection::new(
            "Controls",
            vec![NavigationNode::new("/controls", "Controls").with_sub_items(vec![
                NavigationNode::new("/controls/branches", "Branches"),
                NavigationNode::new("/controls/roles", "Roles"),
            ])],
        )])
    }

    fn grants() -> SessionGrants {
        let mut view = ReadPermissionView::new();
        view.insert(
            "/controls/branches",
            CrudGrant {
                read: true,
                update: true,
                ..CrudGrant::default()
            },
        );
        SessionGrants::Role(view)
    }

    #[test]
    fn authorize_url_by_prefix() {
        let grants = grants();
        assert_eq!(authorize_url(&tree(), &grants, "/controls/branches/edit/42"), Ok(()));
        assert_eq!(
            authorize_url(&tree(), &grants, "/controls/roles?tab=1"),
            Err(AuthzError::Forbidden("/controls/roles".to_string()))
        );
        assert_eq!(
            authorize_url(&tree(), &grants, "/reports/"),
            Err(AuthzError::UnknownUrl("/reports".to_string()))
        );
    }

    #[test]
    fn owner_is_allowed_everything() {
        assert_eq!(authorize_url(&tree(), &SessionGrants::Owner, "/controls/roles"), Ok(()));
        assert_eq!(
            authorize_action(&SessionGrants::Owner, "/controls/roles", CrudAction::Delete),
            Ok(())
        );
    }

    #[test]
    fn authorize_action_checks_the_exact_bit() {
        let grants = grants();
        assert_eq!(authorize_action(&grants, "/controls/branches", CrudAction::Update), Ok(()));
        assert_eq!(
            authorize_action(&grants, "/controls/branches", CrudAction::Delete),
            Err(AuthzError::MissingAction {
                url: "/controls/branches".to_string(),
                action: CrudAction::Delete,
            })
        );
    }

    #[test]
    fn explanation_reports_node_and_match_kind() {
        let e = explain_url_access(&tree(), &grants(), "/controls/branches/edit/42/");
        assert!(e.granted);
        assert!(e.prefix_match);
        assert_eq!(e.normalized_url, "/controls/branches/edit/42");
        assert_eq!(e.matched_node.as_deref(), Some("/controls/branches"));

        let e = explain_url_access(&tree(), &grants(), "/controls/roles");
        assert!(!e.granted);
        assert!(!e.prefix_match);
        assert!(e.reason.contains("cannot read"));

        let e = explain_url_access(&tree(), &grants(), "/nowhere");
        assert!(!e.granted);
        assert_eq!(e.matched_node, None);
    }
}
