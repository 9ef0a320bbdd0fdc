//! Arena index over the navigation forest.
//!
//! The forest is static for the length of an editing session, so the
//! url -> node/parent relation is computed once and every cascade step
//! becomes a slot lookup instead of a forest walk.

use std::collections::HashMap;

use crate::error::NavError;
use crate::tree::{NavigationNode, NavigationSection, NavigationTree};

#[derive(Debug, Clone)]
struct Slot {
    url: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Url-keyed view of a [`NavigationTree`].
///
/// Slots are stored in pre-order (main sections, then footer), so
/// [`NavIndex::urls`] yields nodes in the order they are rendered.
#[derive(Debug, Clone, Default)]
pub struct NavIndex {
    slots: Vec<Slot>,
    by_url: HashMap<String, usize>,
}

impl NavIndex {
    /// Index every node of the forest.
    ///
    /// Fails if a url is empty or appears twice: either would make the
    /// permission map ambiguous.
    pub fn build(tree: &NavigationTree) -> Result<Self, NavError> {
        Self::from_sections(tree.sections())
    }

    pub fn from_sections<'a>(
        sections: impl IntoIterator<Item = &'a NavigationSection>,
    ) -> Result<Self, NavError> {
        let mut index = Self::default();
        for section in sections {
            for item in &section.items {
                index.insert(item, None)?;
            }
        }
        Ok(index)
    }

    fn insert(
        &mut self,
        node: &NavigationNode,
        parent: Option<usize>,
    ) -> Result<(), NavError> {
        if node.url.is_empty() {
            return Err(NavError::EmptyUrl {
                parent: parent.map(|p| self.slots[p].url.clone()),
            });
        }
        if self.by_url.contains_key(&node.url) {
            return Err(NavError::DuplicateUrl(node.url.clone()));
        }

        let slot = self.slots.len();
        self.slots.push(Slot {
            url: node.url.clone(),
            parent,
            children: Vec::with_capacity(node.sub_items.len()),
        });
        self.by_url.insert(node.url.clone(), slot);
        if let Some(p) = parent {
            self.slots[p].children.push(slot);
        }

        for child in &node.sub_items {
            self.insert(child, Some(slot))?;
        }
        Ok(())
    }

    fn slot(&self, url: &str) -> Option<&Slot> {
        self.by_url.get(url).map(|&i| &self.slots[i])
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.by_url.contains_key(url)
    }

    /// All urls in pre-order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.url.as_str())
    }

    pub fn parent_of(&self, url: &str) -> Option<&str> {
        let parent = self.slot(url)?.parent?;
        Some(self.slots[parent].url.as_str())
    }

    pub fn children_of(&self, url: &str) -> Vec<&str> {
        self.slot(url)
            .map(|s| {
                s.children
                    .iter()
                    .map(|&c| self.slots[c].url.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_children(&self, url: &str) -> bool {
        self.slot(url).is_some_and(|s| !s.children.is_empty())
    }

    /// Ancestors of `url`, nearest first.
    pub fn ancestors(&self, url: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let mut cursor = self.slot(url).and_then(|s| s.parent);
        while let Some(i) = cursor {
            out.push(self.slots[i].url.as_str());
            cursor = self.slots[i].parent;
        }
        out
    }

    /// Every descendant of `url` in pre-order, excluding `url` itself.
    pub fn descendants(&self, url: &str) -> Vec<&str> {
        let mut out = Vec::new();
        if let Some(&start) = self.by_url.get(url) {
            self.collect_descendants(start, &mut out);
        }
        out
    }

    fn collect_descendants<'a>(&'a self, slot: usize, out: &mut Vec<&'a str>) {
        for &child in &self.slots[slot].children {
            out.push(self.slots[child].url.as_str());
            self.collect_descendants(child, out);
        }
    }
}
