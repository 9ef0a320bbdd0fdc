//! `navguard-navigation`: the navigation forest and everything derived from it.
//!
//! The tree is read-only input (a tenant's subscribed menus). This crate
//! loads it, indexes it, and filters it against a read-permission view. It
//! knows nothing about CRUD bits or how a role is edited.

pub mod error;
pub mod filter;
pub mod index;
pub mod lookup;
pub mod tree;
pub mod url;

pub use error::NavError;
pub use filter::{
    AllowAll, NavigationFilter, PermissionSummary, ReadAccess, SectionSummary, matching_node,
};
pub use index::NavIndex;
pub use lookup::{find_node_by_url, find_node_in_sections, find_parent_by_url};
pub use tree::{NavigationNode, NavigationSection, NavigationTree};
pub use url::{normalize_url, url_matches};
