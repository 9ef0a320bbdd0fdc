//! Forest-wide linear lookups.
//!
//! These walk the whole forest on every call. Editing sessions use
//! [`crate::NavIndex`] instead; these stay for one-off queries.

use crate::tree::{NavigationNode, NavigationSection, NavigationTree};

/// Find the node registered under `url`, searching main then footer sections.
pub fn find_node_by_url<'a>(tree: &'a NavigationTree, url: &str) -> Option<&'a NavigationNode> {
    tree.sections()
        .flat_map(|section| section.items.iter())
        .find_map(|item| find_in_subtree(item, url))
}

/// Find the immediate parent of the node registered under `url`.
///
/// Top-level items have no parent node (their section is not a node).
pub fn find_parent_by_url<'a>(tree: &'a NavigationTree, url: &str) -> Option<&'a NavigationNode> {
    tree.sections()
        .flat_map(|section| section.items.iter())
        .find_map(|item| find_parent_in_subtree(item, url))
}

/// Same as [`find_node_by_url`], restricted to a list of sections.
pub fn find_node_in_sections<'a>(
    sections: &'a [NavigationSection],
    url: &str,
) -> Option<&'a NavigationNode> {
    sections
        .iter()
        .flat_map(|section| section.items.iter())
        .find_map(|item| find_in_subtree(item, url))
}

fn find_in_subtree<'a>(node: &'a NavigationNode, url: &str) -> Option<&'a NavigationNode> {
    if node.url == url {
        return Some(node);
    }
    node.sub_items.iter().find_map(|child| find_in_subtree(child, url))
}

fn find_parent_in_subtree<'a>(node: &'a NavigationNode, url: &str) -> Option<&'a NavigationNode> {
    if node.sub_items.iter().any(|child| child.url == url) {
        return Some(node);
    }
    node.sub_items
        .iter()
        .find_map(|child| find_parent_in_subtree(child, url))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> NavigationTree {
        NavigationTree {
            main_navigation: vec![NavigationSection::new(
                "Billing",
                vec![NavigationNode::new("/billing", "Billing").with_sub_items(vec![
                    NavigationNode::new("/billing/invoices", "Invoices").with_sub_items(vec![
                        NavigationNode::new("/billing/invoices/drafts", "Drafts"),
                    ]),
                ])],
            )],
            footer_navigation: vec![NavigationSection::new(
                "Account",
                vec![NavigationNode::new("/profile", "Profile")],
            )],
        }
    }

    #[test]
    fn finds_nodes_at_any_depth_and_in_footer() {
        let tree = tree();
        assert_eq!(find_node_by_url(&tree, "/billing/invoices/drafts").unwrap().title, "Drafts");
        assert_eq!(find_node_by_url(&tree, "/profile").unwrap().title, "Profile");
        assert!(find_node_by_url(&tree, "/missing").is_none());
    }

    #[test]
    fn finds_immediate_parent_only() {
        let tree = tree();
        assert_eq!(
            find_parent_by_url(&tree, "/billing/invoices/drafts").unwrap().url,
            "/billing/invoices"
        );
        assert_eq!(find_parent_by_url(&tree, "/billing/invoices").unwrap().url, "/billing");
        assert!(find_parent_by_url(&tree, "/billing").is_none());
        assert!(find_parent_by_url(&tree, "/profile").is_none());
    }

    #[test]
    fn section_lookup_ignores_other_lists() {
        let tree = tree();
        assert!(find_node_in_sections(&tree.main_navigation, "/profile").is_none());
        assert!(find_node_in_sections(&tree.footer_navigation, "/profile").is_some());
    }
}
