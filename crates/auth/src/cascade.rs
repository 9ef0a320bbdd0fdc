//! Permission cascade engine.
//!
//! Every operation takes the current map by reference and returns a new one;
//! the input is never mutated, so hosts that detect changes by identity see
//! every edit.
//!
//! # Invariants maintained
//! - A: `add`, `update` or `delete` imply `read`.
//! - B: a node is granted only when enabled with at least one CRUD bit.
//! - C: a node never holds a bit its nearest granted ancestor lacks. An
//!   ancestor that is not granted itself (a grouping node shown only because
//!   of its descendants) does not cap anything.
//! - D: a node with children but no granted descendant is disabled.

use std::collections::BTreeSet;

use thiserror::Error;

use navguard_navigation::NavIndex;

use crate::map::PermissionMap;
use crate::permissions::{CrudAction, PermissionRecord};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CascadeError {
    /// The url is not part of the indexed forest; the map and the tree are out
    /// of sync.
    #[error("unknown navigation node '{0}'")]
    NodeNotFound(String),
}

/// Cascade operations over one tenant's navigation forest.
#[derive(Debug, Clone, Copy)]
pub struct PermissionCascade<'a> {
    index: &'a NavIndex,
}

impl<'a> PermissionCascade<'a> {
    pub fn new(index: &'a NavIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a NavIndex {
        self.index
    }

    fn ensure_known(&self, url: &str) -> Result<(), CascadeError> {
        if self.index.contains(url) {
            Ok(())
        } else {
            Err(CascadeError::NodeNotFound(url.to_string()))
        }
    }

    /// Nearest ancestor of `url` that is effectively granted.
    pub fn capping_ancestor(&self, map: &PermissionMap, url: &str) -> Option<&'a str> {
        self.index
            .ancestors(url)
            .into_iter()
            .find(|ancestor| map.record(ancestor).is_granted())
    }

    /// Bits `url` may hold: those of its capping ancestor, or all four.
    pub fn cap_for(&self, map: &PermissionMap, url: &str) -> PermissionRecord {
        match self.capping_ancestor(map, url) {
            Some(ancestor) => map.record(ancestor).crud_only(),
            None => PermissionRecord::full().crud_only(),
        }
    }

    /// Flip the `enabled` flag of `url` and carry the decision down its subtree.
    ///
    /// Turning on grants the capped bits to the node and every descendant;
    /// turning off resets the whole subtree to disabled.
    pub fn toggle_node_enabled(
        &self,
        map: &PermissionMap,
        url: &str,
    ) -> Result<PermissionMap, CascadeError> {
        self.ensure_known(url)?;

        let mut next = map.clone();
        let record = if map.record(url).enabled {
            PermissionRecord::disabled()
        } else {
            PermissionRecord::enabled_like(&self.cap_for(map, url))
        };

        next.insert(url, record);
        for descendant in self.index.descendants(url) {
            next.insert(descendant, record);
        }

        self.settle(&mut next, url);
        Ok(next)
    }

    /// Flip a single CRUD bit of `url`.
    ///
    /// Granting a bit the capping ancestor lacks is rejected by returning the
    /// map unchanged.
    pub fn toggle_permission_bit(
        &self,
        map: &PermissionMap,
        url: &str,
        action: CrudAction,
    ) -> Result<PermissionMap, CascadeError> {
        self.ensure_known(url)?;

        let value = !map.record(url).get(action);
        if value && !self.cap_for(map, url).get(action) {
            tracing::debug!(url, %action, "rejected grant not held by parent");
            return Ok(map.clone());
        }

        let mut next = map.clone();
        let descendants = self.index.descendants(url);

        match (action, value) {
            (CrudAction::Read, false) => {
                next.update(url, PermissionRecord::clear_crud);
                for descendant in &descendants {
                    next.update(descendant, PermissionRecord::clear_crud);
                }
            }
            (CrudAction::Read, true) => {
                next.update(url, |r| r.read = true);
                for descendant in &descendants {
                    next.update(descendant, |r| {
                        if r.enabled {
                            r.read = true;
                        }
                    });
                }
            }
            (_, true) => {
                next.update(url, |r| {
                    r.set(action, true);
                    r.read = true;
                });
                for descendant in &descendants {
                    next.update(descendant, |r| {
                        if r.enabled && r.read {
                            r.set(action, true);
                        }
                    });
                }
            }
            (_, false) => {
                next.update(url, |r| r.set(action, false));
                for descendant in &descendants {
                    next.update(descendant, |r| r.set(action, false));
                }
            }
        }

        self.settle(&mut next, url);
        Ok(next)
    }

    /// Toggle all four bits of `url` at once.
    ///
    /// When the node already holds every bit it is allowed, everything is
    /// cleared; otherwise the node is enabled with every allowed bit and its
    /// enabled descendants follow.
    pub fn select_all_permissions(
        &self,
        map: &PermissionMap,
        url: &str,
    ) -> Result<PermissionMap, CascadeError> {
        self.ensure_known(url)?;

        let cap = self.cap_for(map, url);
        let current = map.record(url);
        let saturated = cap.has_any_crud() && current.same_crud(&cap);

        let mut next = map.clone();
        let descendants = self.index.descendants(url);
        if saturated {
            next.update(url, PermissionRecord::clear_crud);
            for descendant in &descendants {
                next.update(descendant, PermissionRecord::clear_crud);
            }
        } else {
            next.insert(url, PermissionRecord::enabled_like(&cap));
            for descendant in &descendants {
                next.update(descendant, |r| {
                    if r.enabled {
                        r.copy_crud_from(&cap);
                    }
                });
            }
        }

        self.settle(&mut next, url);
        Ok(next)
    }

    /// Disable every node that has children but no granted descendant, over
    /// the subtree of `url` (bottom-up) and then its ancestors. Leaves are
    /// never forced off.
    fn settle(&self, map: &mut PermissionMap, url: &str) {
        let subtree = self.index.descendants(url);
        let chain = subtree
            .into_iter()
            .rev()
            .chain(std::iter::once(url))
            .chain(self.index.ancestors(url));
        for node in chain {
            if self.index.has_children(node)
                && !self.has_granted_descendants(map, node)
                && map.record(node) != PermissionRecord::disabled()
            {
                tracing::debug!(url = node, "disabling parent with no granted descendants");
                map.insert(node, PermissionRecord::disabled());
            }
        }
    }

    /// Does any descendant of `url` hold an effective grant?
    pub fn has_granted_descendants(&self, map: &PermissionMap, url: &str) -> bool {
        self.index
            .descendants(url)
            .into_iter()
            .any(|descendant| map.record(descendant).is_granted())
    }

    /// Whether the editor shows `url` as granted: its own grant, or any
    /// granted descendant.
    pub fn is_shown_granted(&self, map: &PermissionMap, url: &str) -> bool {
        map.record(url).is_granted() || self.has_granted_descendants(map, url)
    }

    /// Parent nodes shown as granted; the editor opens these on load.
    pub fn expanded_nodes(&self, map: &PermissionMap) -> BTreeSet<String> {
        self.index
            .urls()
            .filter(|url| self.index.has_children(url) && self.is_shown_granted(map, url))
            .map(str::to_string)
            .collect()
    }

    /// Re-establish every invariant over a whole map (e.g. one loaded from
    /// storage or received from a client).
    ///
    /// Unknown urls are dropped, missing nodes are added disabled, disabled
    /// nodes lose their bits, and the containment and parent rules are applied
    /// top-down then bottom-up.
    pub fn normalize(&self, map: &PermissionMap) -> PermissionMap {
        let mut next = PermissionMap::overlay(self.index, map);
        let urls: Vec<&str> = self.index.urls().collect();

        // Pre-order: ancestors are settled before their descendants read them.
        for &url in &urls {
            let cap = self.cap_for(&next, url);
            next.update(url, |r| {
                if !r.enabled {
                    r.clear_crud();
                }
                r.enforce_read_requirement();
                r.restrict_to(&cap);
            });
        }

        // Reverse pre-order: children are settled before their parents.
        for &url in urls.iter().rev() {
            if self.index.has_children(url) && !self.has_granted_descendants(&next, url) {
                next.insert(url, PermissionRecord::disabled());
            }
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navguard_navigation::{NavigationNode, NavigationSection, NavigationTree};

    fn node(url: &str, children: Vec<NavigationNode>) -> NavigationNode {
        NavigationNode::new(url, url).with_sub_items(children)
    }

    fn leaf(url: &str) -> NavigationNode {
        NavigationNode::new(url, url)
    }

    /// `/a` -> `/a/1` -> `/a/1/x`, `/a/2`; `/b` standalone.
    fn index() -> NavIndex {
        NavIndex::build(&NavigationTree::new(vec![NavigationSection::new(
            "Main",
            vec![
                node("/a", vec![node("/a/1", vec![leaf("/a/1/x")]), leaf("/a/2")]),
                leaf("/b"),
            ],
        )]))
        .unwrap()
    }

    fn crud(read: bool, add: bool, update: bool, delete: bool) -> PermissionRecord {
        PermissionRecord {
            enabled: true,
            read,
            add,
            update,
            delete,
        }
    }

    #[test]
    fn enabling_leaf_under_ungranted_parent_grants_everything() {
        let index = NavIndex::build(&NavigationTree::new(vec![NavigationSection::new(
            "S",
            vec![node("/a", vec![leaf("/a/1")])],
        )]))
        .unwrap();
        let cascade = PermissionCascade::new(&index);
        let map = PermissionMap::for_index(&index);

        let next = cascade.toggle_node_enabled(&map, "/a/1").unwrap();

        assert_eq!(next.record("/a/1"), PermissionRecord::full());
        assert!(cascade.has_granted_descendants(&next, "/a"));
        assert!(cascade.is_shown_granted(&next, "/a"));
        assert!(!next.record("/a").enabled);
        // Input untouched.
        assert_eq!(map.record("/a/1"), PermissionRecord::disabled());
    }

    #[test]
    fn enabling_node_caps_at_granted_ancestor_and_fills_subtree() {
        let index = index();
        let cascade = PermissionCascade::new(&index);
        let mut map = PermissionMap::for_index(&index);
        map.insert("/a", crud(true, true, false, false));

        let next = cascade.toggle_node_enabled(&map, "/a/1").unwrap();

        assert_eq!(next.record("/a/1"), crud(true, true, false, false));
        assert_eq!(next.record("/a/1/x"), crud(true, true, false, false));
        assert_eq!(next.record("/a/2"), PermissionRecord::disabled());
    }

    #[test]
    fn disabling_node_resets_every_descendant() {
        let index = index();
        let cascade = PermissionCascade::new(&index);
        let map = cascade
            .toggle_node_enabled(&PermissionMap::for_index(&index), "/a")
            .unwrap();
        assert_eq!(map.record("/a/1/x"), PermissionRecord::full());

        let next = cascade.toggle_node_enabled(&map, "/a/1").unwrap();
        assert_eq!(next.record("/a/1"), PermissionRecord::disabled());
        assert_eq!(next.record("/a/1/x"), PermissionRecord::disabled());
        // Sibling still granted, so the parent stays.
        assert_eq!(next.record("/a"), PermissionRecord::full());
    }

    #[test]
    fn disabling_last_granted_child_disables_parent_chain() {
        let index = index();
        let cascade = PermissionCascade::new(&index);
        let mut map = PermissionMap::for_index(&index);
        for url in ["/a", "/a/1", "/a/1/x"] {
            map.insert(url, PermissionRecord::full());
        }

        let next = cascade.toggle_node_enabled(&map, "/a/1/x").unwrap();

        assert_eq!(next.record("/a/1/x"), PermissionRecord::disabled());
        assert_eq!(next.record("/a/1"), PermissionRecord::disabled());
        assert_eq!(next.record("/a"), PermissionRecord::disabled());
    }

    #[test]
    fn leaf_with_own_grant_is_not_forced_off() {
        let index = index();
        let cascade = PermissionCascade::new(&index);
        let map = cascade
            .toggle_node_enabled(&PermissionMap::for_index(&index), "/b")
            .unwrap();
        let next = cascade
            .toggle_permission_bit(&map, "/b", CrudAction::Delete)
            .unwrap();
        assert_eq!(next.record("/b"), crud(true, true, true, false));
    }

    #[test]
    fn read_off_cascades_down_unconditionally() {
        let index = index();
        let cascade = PermissionCascade::new(&index);
        let mut map = PermissionMap::for_index(&index);
        for url in ["/a", "/a/1", "/a/1/x", "/a/2"] {
            map.insert(url, PermissionRecord::full());
        }

        let next = cascade
            .toggle_permission_bit(&map, "/a", CrudAction::Read)
            .unwrap();

        for url in ["/a", "/a/1", "/a/1/x", "/a/2"] {
            assert!(!next.record(url).has_any_crud(), "{url} kept a bit");
        }
        // Nothing granted below, so the parents are disabled as well.
        assert!(!next.record("/a").enabled);
        assert!(!next.record("/a/1").enabled);
    }

    #[test]
    fn read_on_reaches_only_enabled_descendants() {
        let index = index();
        let cascade = PermissionCascade::new(&index);
        let mut map = PermissionMap::for_index(&index);
        map.insert("/a", crud(false, false, false, false));
        map.insert("/a/2", crud(false, false, false, false));

        let next = cascade
            .toggle_permission_bit(&map, "/a", CrudAction::Read)
            .unwrap();

        assert!(next.record("/a").read);
        assert!(next.record("/a/2").read);
        assert!(!next.record("/a/1").read);
        assert!(!next.record("/a/1/x").read);
        assert!(!next.record("/a/1").enabled);
    }

    #[test]
    fn mutation_bit_on_forces_read_and_cascades_to_readers() {
        let index = index();
        let cascade = PermissionCascade::new(&index);
        let mut map = PermissionMap::for_index(&index);
        map.insert("/a", crud(false, false, false, false));
        map.insert("/a/2", crud(true, false, false, false));
        map.insert("/a/1/x", crud(false, false, false, false));

        let next = cascade
            .toggle_permission_bit(&map, "/a", CrudAction::Update)
            .unwrap();

        assert_eq!(next.record("/a"), crud(true, false, true, false));
        assert_eq!(next.record("/a/2"), crud(true, false, true, false));
        // Enabled but without read: not touched.
        assert_eq!(next.record("/a/1/x"), crud(false, false, false, false));
    }

    #[test]
    fn mutation_bit_off_cascades_down() {
        let index = index();
        let cascade = PermissionCascade::new(&index);
        let map = cascade
            .toggle_node_enabled(&PermissionMap::for_index(&index), "/a")
            .unwrap();

        let next = cascade
            .toggle_permission_bit(&map, "/a", CrudAction::Add)
            .unwrap();

        for url in ["/a", "/a/1", "/a/1/x", "/a/2"] {
            assert_eq!(next.record(url), crud(true, false, true, true), "{url}");
        }
    }

    #[test]
    fn child_cannot_exceed_parent() {
        let index = index();
        let cascade = PermissionCascade::new(&index);
        let mut map = PermissionMap::for_index(&index);
        map.insert("/a", crud(true, true, false, false));
        map.insert("/a/2", crud(true, false, false, false));

        let next = cascade
            .toggle_permission_bit(&map, "/a/2", CrudAction::Update)
            .unwrap();
        assert_eq!(next, map);
        assert!(!next.record("/a/2").update);

        // A bit the parent holds is fine.
        let next = cascade
            .toggle_permission_bit(&map, "/a/2", CrudAction::Add)
            .unwrap();
        assert!(next.record("/a/2").add);
    }

    #[test]
    fn select_all_twice_restores_all_off_and_all_on() {
        let index = index();
        let cascade = PermissionCascade::new(&index);
        let mut map = PermissionMap::for_index(&index);
        map.insert("/b", crud(false, false, false, false));

        let once = cascade.select_all_permissions(&map, "/b").unwrap();
        assert_eq!(once.record("/b"), PermissionRecord::full());
        let twice = cascade.select_all_permissions(&once, "/b").unwrap();
        assert!(twice.record("/b").same_crud(&map.record("/b")));

        let full_start = once;
        let off = cascade.select_all_permissions(&full_start, "/b").unwrap();
        let back = cascade.select_all_permissions(&off, "/b").unwrap();
        assert!(back.record("/b").same_crud(&full_start.record("/b")));
    }

    #[test]
    fn select_all_respects_cap_and_reaches_enabled_descendants() {
        let index = index();
        let cascade = PermissionCascade::new(&index);
        let mut map = PermissionMap::for_index(&index);
        map.insert("/a", crud(true, false, true, false));
        map.insert("/a/1", crud(true, false, false, false));
        map.insert("/a/1/x", crud(true, false, false, false));

        let next = cascade.select_all_permissions(&map, "/a/1").unwrap();
        assert_eq!(next.record("/a/1"), crud(true, false, true, false));
        assert_eq!(next.record("/a/1/x"), crud(true, false, true, false));

        // Saturated against the cap, so a second call clears.
        let cleared = cascade.select_all_permissions(&next, "/a/1").unwrap();
        assert!(!cleared.record("/a/1").has_any_crud());
        assert!(!cleared.record("/a/1/x").has_any_crud());
    }

    #[test]
    fn unknown_url_fails_fast() {
        let index = index();
        let cascade = PermissionCascade::new(&index);
        let map = PermissionMap::for_index(&index);
        assert_eq!(
            cascade.toggle_node_enabled(&map, "/nope"),
            Err(CascadeError::NodeNotFound("/nope".to_string()))
        );
        assert!(cascade.toggle_permission_bit(&map, "/nope", CrudAction::Read).is_err());
        assert!(cascade.select_all_permissions(&map, "/nope").is_err());
    }

    #[test]
    fn expanded_nodes_lists_parents_shown_granted() {
        let index = index();
        let cascade = PermissionCascade::new(&index);
        let map = cascade
            .toggle_node_enabled(&PermissionMap::for_index(&index), "/a/1/x")
            .unwrap();
        let expanded = cascade.expanded_nodes(&map);
        assert_eq!(
            expanded.into_iter().collect::<Vec<_>>(),
            vec!["/a".to_string(), "/a/1".to_string()]
        );
    }

    #[test]
    fn normalize_repairs_persisted_maps() {
        let index = index();
        let cascade = PermissionCascade::new(&index);
        let mut map = PermissionMap::new();
        // Parent grants read + add only.
        map.insert("/a", crud(true, true, false, false));
        // Children exceed the parent, two levels deep.
        map.insert("/a/1", crud(true, true, true, true));
        map.insert("/a/1/x", crud(true, true, true, true));
        // Mutation without read.
        map.insert("/a/2", crud(false, true, false, false));
        // Disabled node holding bits.
        map.insert("/b", PermissionRecord { enabled: false, ..PermissionRecord::full() });
        map.insert("/gone", PermissionRecord::full());

        let next = cascade.normalize(&map);

        assert_eq!(next.len(), index.len());
        assert!(!next.contains("/gone"));
        assert_eq!(next.record("/a"), crud(true, true, false, false));
        assert_eq!(next.record("/a/1"), crud(true, true, false, false));
        assert_eq!(next.record("/a/1/x"), crud(true, true, false, false));
        assert!(!next.record("/a/2").has_any_crud());
        assert_eq!(next.record("/b"), PermissionRecord::disabled());
    }

    #[test]
    fn normalize_disables_parents_without_granted_descendants() {
        let index = index();
        let cascade = PermissionCascade::new(&index);
        let mut map = PermissionMap::for_index(&index);
        map.insert("/a", PermissionRecord::full());

        let next = cascade.normalize(&map);
        assert_eq!(next.record("/a"), PermissionRecord::disabled());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        const URLS: [&str; 5] = ["/a", "/a/1", "/a/1/x", "/a/2", "/b"];

        #[derive(Debug, Clone)]
        enum Op {
            Enable(usize),
            Bit(usize, CrudAction),
            SelectAll(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            let action = prop_oneof![
                Just(CrudAction::Read),
                Just(CrudAction::Add),
                Just(CrudAction::Update),
                Just(CrudAction::Delete),
            ];
            prop_oneof![
                (0..URLS.len()).prop_map(Op::Enable),
                ((0..URLS.len()), action).prop_map(|(i, a)| Op::Bit(i, a)),
                (0..URLS.len()).prop_map(Op::SelectAll),
            ]
        }

        fn apply(cascade: &PermissionCascade<'_>, map: &PermissionMap, op: &Op) -> PermissionMap {
            match *op {
                Op::Enable(i) => cascade.toggle_node_enabled(map, URLS[i]),
                Op::Bit(i, action) => cascade.toggle_permission_bit(map, URLS[i], action),
                Op::SelectAll(i) => cascade.select_all_permissions(map, URLS[i]),
            }
            .unwrap()
        }

        fn check_invariants(cascade: &PermissionCascade<'_>, map: &PermissionMap) -> Result<(), TestCaseError> {
            for url in URLS {
                let record = map.record(url);

                // A: mutations imply read.
                prop_assert!(
                    !(record.add || record.update || record.delete) || record.read,
                    "{url} holds a mutation without read: {record:?}"
                );

                // C: containment under the nearest granted ancestor.
                if record.is_granted() {
                    if let Some(ancestor) = cascade.capping_ancestor(map, url) {
                        let cap = map.record(ancestor);
                        for action in CrudAction::ALL {
                            prop_assert!(
                                !record.get(action) || cap.get(action),
                                "{url} holds {action} that {ancestor} lacks"
                            );
                        }
                    }
                }

                // D: parents with nothing granted below are disabled.
                if cascade.index().has_children(url) && !cascade.has_granted_descendants(map, url) {
                    prop_assert!(!record.enabled, "{url} enabled with no granted descendants");
                }
            }
            Ok(())
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 512,
                ..ProptestConfig::default()
            })]

            /// Property: any sequence of edits from a fresh role keeps every invariant.
            #[test]
            fn invariants_hold_after_any_sequence(ops in proptest::collection::vec(op(), 0..24)) {
                let index = index();
                let cascade = PermissionCascade::new(&index);
                let mut map = PermissionMap::for_index(&index);
                for op in &ops {
                    map = apply(&cascade, &map, op);
                    check_invariants(&cascade, &map)?;
                }
            }

            /// Property: disabling a node clears its entire subtree.
            #[test]
            fn disable_clears_subtree(ops in proptest::collection::vec(op(), 0..16), target in 0..URLS.len()) {
                let index = index();
                let cascade = PermissionCascade::new(&index);
                let mut map = PermissionMap::for_index(&index);
                for op in &ops {
                    map = apply(&cascade, &map, op);
                }
                let url = URLS[target];
                if map.record(url).enabled {
                    let next = cascade.toggle_node_enabled(&map, url).unwrap();
                    prop_assert_eq!(next.record(url), PermissionRecord::disabled());
                    for descendant in index.descendants(url) {
                        prop_assert_eq!(next.record(descendant), PermissionRecord::disabled());
                    }
                }
            }

            /// Property: normalising an arbitrary map establishes every invariant.
            #[test]
            fn normalize_establishes_invariants(
                raw in proptest::collection::vec(proptest::array::uniform5(any::<bool>()), URLS.len())
            ) {
                let index = index();
                let cascade = PermissionCascade::new(&index);
                let map: PermissionMap = URLS
                    .iter()
                    .zip(raw)
                    .map(|(url, [enabled, read, add, update, delete])| {
                        (url.to_string(), PermissionRecord { enabled, read, add, update, delete })
                    })
                    .collect();
                let normalized = cascade.normalize(&map);
                check_invariants(&cascade, &normalized)?;
                prop_assert_eq!(cascade.normalize(&normalized), normalized);
            }
        }
    }
}
