//! Session-time navigation filtering.
//!
//! Given the forest and a read-permission view, derive what a signed-in user
//! may see (sidebar) and reach (route guard). Everything here is a pure
//! function of `(tree, view)`; callers recompute whenever either changes.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::tree::{NavigationNode, NavigationSection, NavigationTree};
use crate::url::url_matches;

/// Read-permission lookup keyed by node url.
pub trait ReadAccess {
    fn can_read(&self, url: &str) -> bool;
}

impl<T: ReadAccess + ?Sized> ReadAccess for &T {
    fn can_read(&self, url: &str) -> bool {
        (**self).can_read(url)
    }
}

impl ReadAccess for HashMap<String, bool> {
    fn can_read(&self, url: &str) -> bool {
        self.get(url).copied().unwrap_or(false)
    }
}

impl ReadAccess for BTreeMap<String, bool> {
    fn can_read(&self, url: &str) -> bool {
        self.get(url).copied().unwrap_or(false)
    }
}

impl ReadAccess for HashSet<String> {
    fn can_read(&self, url: &str) -> bool {
        self.contains(url)
    }
}

impl ReadAccess for BTreeSet<String> {
    fn can_read(&self, url: &str) -> bool {
        self.contains(url)
    }
}

/// Grants read on every node (tenant owner sessions).
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl ReadAccess for AllowAll {
    fn can_read(&self, _url: &str) -> bool {
        true
    }
}

/// Per-section breakdown inside a [`PermissionSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub title: String,
    pub total_nodes: usize,
    pub accessible_nodes: usize,
    pub visible: bool,
}

/// Diagnostic counts over a forest for one permission view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionSummary {
    pub total_sections: usize,
    pub visible_sections: usize,
    pub total_nodes: usize,
    pub accessible_nodes: usize,
    pub denied_nodes: usize,
    pub sections: Vec<SectionSummary>,
}

/// Filters a navigation forest through a [`ReadAccess`] view.
#[derive(Debug, Clone)]
pub struct NavigationFilter<A> {
    access: A,
}

impl<A: ReadAccess> NavigationFilter<A> {
    pub fn new(access: A) -> Self {
        Self { access }
    }

    pub fn access(&self) -> &A {
        &self.access
    }

    fn readable(&self, node: &NavigationNode) -> bool {
        node.has_url() && self.access.can_read(&node.url)
    }

    /// Keep only reachable nodes, preserving order.
    ///
    /// A node with sub-items survives iff at least one sub-item survives (its
    /// own grant is not consulted); a leaf survives iff it is readable; a
    /// section survives iff any item does.
    pub fn filter_sections<'a>(
        &self,
        sections: impl IntoIterator<Item = &'a NavigationSection>,
    ) -> Vec<NavigationSection> {
        sections
            .into_iter()
            .filter_map(|section| {
                let items: Vec<_> = section
                    .items
                    .iter()
                    .filter_map(|item| self.filter_node(item))
                    .collect();
                (!items.is_empty()).then(|| NavigationSection {
                    title: section.title.clone(),
                    items,
                })
            })
            .collect()
    }

    /// [`Self::filter_sections`] applied to main and footer navigation.
    pub fn filter_tree(&self, tree: &NavigationTree) -> NavigationTree {
        NavigationTree {
            main_navigation: self.filter_sections(&tree.main_navigation),
            footer_navigation: self.filter_sections(&tree.footer_navigation),
        }
    }

    fn filter_node(&self, node: &NavigationNode) -> Option<NavigationNode> {
        if node.is_leaf() {
            return self.readable(node).then(|| node.clone());
        }

        let sub_items: Vec<_> = node
            .sub_items
            .iter()
            .filter_map(|child| self.filter_node(child))
            .collect();
        if sub_items.is_empty() {
            return None;
        }
        Some(NavigationNode {
            url: node.url.clone(),
            title: node.title.clone(),
            icon: node.icon.clone(),
            sub_items,
        })
    }

    /// Landing page after login: the first readable node in render order,
    /// preferring an item's sub-items over the item itself.
    pub fn first_accessible_url<'a>(
        &self,
        sections: impl IntoIterator<Item = &'a NavigationSection>,
    ) -> Option<&'a str> {
        sections
            .into_iter()
            .flat_map(|section| section.items.iter())
            .find_map(|item| self.first_in_node(item))
    }

    fn first_in_node<'a>(&self, node: &'a NavigationNode) -> Option<&'a str> {
        node.sub_items
            .iter()
            .find_map(|child| self.first_in_node(child))
            .or_else(|| self.readable(node).then_some(node.url.as_str()))
    }

    /// Route guard: the read grant of the first node matching `target_url`.
    ///
    /// Unmatched urls are denied.
    pub fn can_access_url<'a>(
        &self,
        sections: impl IntoIterator<Item = &'a NavigationSection>,
        target_url: &str,
    ) -> bool {
        matching_node(sections, target_url).is_some_and(|node| self.access.can_read(&node.url))
    }

    /// Readable nodes in pre-order.
    pub fn all_accessible_urls<'a>(
        &self,
        sections: impl IntoIterator<Item = &'a NavigationSection>,
    ) -> Vec<&'a str> {
        let mut out = Vec::new();
        for item in sections.into_iter().flat_map(|section| section.items.iter()) {
            self.collect_accessible(item, &mut out);
        }
        out
    }

    fn collect_accessible<'a>(&self, node: &'a NavigationNode, out: &mut Vec<&'a str>) {
        if self.readable(node) {
            out.push(node.url.as_str());
        }
        for child in &node.sub_items {
            self.collect_accessible(child, out);
        }
    }

    pub fn accessible_url_count<'a>(
        &self,
        sections: impl IntoIterator<Item = &'a NavigationSection>,
    ) -> usize {
        self.all_accessible_urls(sections).len()
    }

    pub fn permission_summary<'a>(
        &self,
        sections: impl IntoIterator<Item = &'a NavigationSection>,
    ) -> PermissionSummary {
        let sections: Vec<SectionSummary> = sections
            .into_iter()
            .map(|section| {
                let mut total_nodes = 0;
                let mut accessible_nodes = 0;
                for item in &section.items {
                    walk(item, &mut |node| {
                        if node.has_url() {
                            total_nodes += 1;
                            if self.access.can_read(&node.url) {
                                accessible_nodes += 1;
                            }
                        }
                    });
                }
                SectionSummary {
                    title: section.title.clone(),
                    total_nodes,
                    accessible_nodes,
                    visible: section.items.iter().any(|item| self.filter_node(item).is_some()),
                }
            })
            .collect();

        let total_nodes = sections.iter().map(|s| s.total_nodes).sum();
        let accessible_nodes = sections.iter().map(|s| s.accessible_nodes).sum();
        PermissionSummary {
            total_sections: sections.len(),
            visible_sections: sections.iter().filter(|s| s.visible).count(),
            total_nodes,
            accessible_nodes,
            denied_nodes: total_nodes - accessible_nodes,
            sections,
        }
    }
}

/// The node guarding `target_url`: depth-first, sub-items before their
/// parent, first match wins.
pub fn matching_node<'a>(
    sections: impl IntoIterator<Item = &'a NavigationSection>,
    target_url: &str,
) -> Option<&'a NavigationNode> {
    sections
        .into_iter()
        .flat_map(|section| section.items.iter())
        .find_map(|item| match_in_node(item, target_url))
}

fn match_in_node<'a>(node: &'a NavigationNode, target_url: &str) -> Option<&'a NavigationNode> {
    node.sub_items
        .iter()
        .find_map(|child| match_in_node(child, target_url))
        .or_else(|| url_matches(target_url, &node.url).then_some(node))
}

fn walk<'a>(node: &'a NavigationNode, visit: &mut impl FnMut(&'a NavigationNode)) {
    visit(node);
    for child in &node.sub_items {
        walk(child, visit);
    }
}
