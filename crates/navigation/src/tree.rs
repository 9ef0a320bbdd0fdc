//! Navigation forest data model.
//!
//! Field names follow the subscribed-menus document the tenant backend
//! returns (`mainNavigation`, `footerNavigation`, `subItems`).

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::NavError;

/// A single navigation entry (item or sub-item).
///
/// `url` is the node's identity and the key used in permission maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationNode {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub title: String,

    /// Opaque icon reference, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Value>,

    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "lenient_list"
    )]
    pub sub_items: Vec<NavigationNode>,
}

impl NavigationNode {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            icon: None,
            sub_items: Vec::new(),
        }
    }

    pub fn with_sub_items(mut self, sub_items: Vec<NavigationNode>) -> Self {
        self.sub_items = sub_items;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.sub_items.is_empty()
    }

    pub fn has_url(&self) -> bool {
        !self.url.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.sub_items.iter().map(Self::subtree_len).sum::<usize>()
    }
}

/// A titled group of top-level items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationSection {
    #[serde(default)]
    pub title: String,

    #[serde(default, deserialize_with = "lenient_list")]
    pub items: Vec<NavigationNode>,
}

impl NavigationSection {
    pub fn new(title: impl Into<String>, items: Vec<NavigationNode>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }
}

/// The full forest for a tenant: main plus footer navigation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationTree {
    #[serde(default, deserialize_with = "lenient_list")]
    pub main_navigation: Vec<NavigationSection>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub footer_navigation: Vec<NavigationSection>,
}

impl NavigationTree {
    pub fn new(main_navigation: Vec<NavigationSection>) -> Self {
        Self {
            main_navigation,
            footer_navigation: Vec::new(),
        }
    }

    /// Parse a subscribed-menus document.
    ///
    /// Only JSON syntax errors fail; structurally wrong parts degrade to empty.
    pub fn from_json_str(s: &str) -> Result<Self, NavError> {
        let value: Value = serde_json::from_str(s)?;
        Ok(Self::from_json_value(value))
    }

    /// Build a tree from an arbitrary JSON value, never failing.
    pub fn from_json_value(value: Value) -> Self {
        match serde_json::from_value(value) {
            Ok(tree) => tree,
            Err(err) => {
                tracing::warn!(error = %err, "navigation document is not an object; using empty tree");
                Self::default()
            }
        }
    }

    /// Main sections first, then footer sections.
    pub fn sections(&self) -> impl Iterator<Item = &NavigationSection> {
        self.main_navigation
            .iter()
            .chain(self.footer_navigation.iter())
    }

    /// Total number of nodes across the forest.
    pub fn node_count(&self) -> usize {
        self.sections()
            .flat_map(|s| s.items.iter())
            .map(NavigationNode::subtree_len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }
}

/// Deserialize a list, treating any non-array as empty and skipping elements
/// that do not have the expected shape.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let elements = match Value::deserialize(deserializer)? {
        Value::Array(elements) => elements,
        Value::Null => return Ok(Vec::new()),
        other => {
            tracing::debug!("expected a navigation list, got {}; treating as empty", kind(&other));
            return Ok(Vec::new());
        }
    };

    Ok(elements
        .into_iter()
        .filter_map(|element| match serde_json::from_value(element) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::debug!(error = %err, "skipping malformed navigation entry");
                None
            }
        })
        .collect())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_reference_field_names() {
        let tree = NavigationTree::from_json_value(json!({
            "mainNavigation": [{
                "title": "Inventory",
                "items": [{
                    "url": "/inventory",
                    "title": "Inventory",
                    "icon": "box",
                    "subItems": [{ "url": "/inventory/items", "title": "Items" }]
                }]
            }],
            "footerNavigation": [{
                "title": "Settings",
                "items": [{ "url": "/settings", "title": "Settings" }]
            }]
        }));

        assert_eq!(tree.main_navigation.len(), 1);
        assert_eq!(tree.footer_navigation.len(), 1);
        let item = &tree.main_navigation[0].items[0];
        assert_eq!(item.sub_items[0].url, "/inventory/items");
        assert_eq!(item.icon, Some(json!("box")));
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn non_array_sections_degrade_to_empty() {
        let tree = NavigationTree::from_json_value(json!({
            "mainNavigation": { "oops": true },
            "footerNavigation": "nope"
        }));
        assert!(tree.main_navigation.is_empty());
        assert!(tree.footer_navigation.is_empty());
        assert!(tree.is_empty());
    }

    #[test]
    fn non_object_document_is_empty_tree() {
        assert_eq!(NavigationTree::from_json_value(json!([1, 2, 3])), NavigationTree::default());
        assert_eq!(NavigationTree::from_json_value(Value::Null), NavigationTree::default());
    }

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let tree = NavigationTree::from_json_value(json!({
            "mainNavigation": [{
                "title": "Sales",
                "items": [42, { "url": "/sales", "title": "Sales", "subItems": null }]
            }]
        }));
        let items = &tree.main_navigation[0].items;
        assert_eq!(items.len(), 1);
        assert!(items[0].is_leaf());
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert!(matches!(NavigationTree::from_json_str("{ nope"), Err(NavError::Json(_))));
    }

    #[test]
    fn serializes_without_empty_sub_items() {
        let node = NavigationNode::new("/a", "A");
        let json = serde_json::to_value(&node).unwrap();
        assert!(json.get("subItems").is_none());
        assert!(json.get("icon").is_none());
    }
}
