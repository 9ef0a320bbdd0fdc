//! The role permission map: node url -> [`PermissionRecord`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use navguard_navigation::NavIndex;

use crate::permissions::PermissionRecord;
use crate::view::{CrudGrant, ReadPermissionView};

/// Permission records of one role, keyed by node url.
///
/// This is the `permissions` object of the role payload. Editing sessions
/// hold one record for every node of the tenant's forest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMap(BTreeMap<String, PermissionRecord>);

impl PermissionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// One disabled record per indexed node (a fresh role).
    pub fn for_index(index: &NavIndex) -> Self {
        Self(
            index
                .urls()
                .map(|url| (url.to_string(), PermissionRecord::disabled()))
                .collect(),
        )
    }

    /// Fresh map for `index` with persisted records laid over it.
    ///
    /// Urls the forest no longer has are dropped; nodes the persisted map
    /// does not mention stay disabled.
    pub fn overlay(index: &NavIndex, persisted: &PermissionMap) -> Self {
        let mut map = Self::for_index(index);
        for (url, record) in persisted.iter() {
            match map.0.get_mut(url) {
                Some(slot) => *slot = *record,
                None => tracing::debug!(url, "ignoring persisted permission for unknown node"),
            }
        }
        map
    }

    pub fn get(&self, url: &str) -> Option<&PermissionRecord> {
        self.0.get(url)
    }

    /// Record for `url`, or the disabled default when absent.
    pub fn record(&self, url: &str) -> PermissionRecord {
        self.0.get(url).copied().unwrap_or_default()
    }

    pub fn insert(&mut self, url: impl Into<String>, record: PermissionRecord) {
        self.0.insert(url.into(), record);
    }

    /// Apply `f` to the record of `url`, creating a disabled one if needed.
    pub fn update(&mut self, url: &str, f: impl FnOnce(&mut PermissionRecord)) {
        f(self.0.entry(url.to_string()).or_default());
    }

    pub fn contains(&self, url: &str) -> bool {
        self.0.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PermissionRecord)> {
        self.0.iter().map(|(url, record)| (url.as_str(), record))
    }

    /// Urls whose record is effectively granted, in url order.
    pub fn granted_urls(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, record)| record.is_granted())
            .map(|(url, _)| url)
    }

    /// Session projection: every enabled node with `read`, with its grants.
    pub fn read_view(&self) -> ReadPermissionView {
        self.iter()
            .filter(|(_, record)| record.enabled && record.read)
            .map(|(url, record)| {
                (
                    url.to_string(),
                    CrudGrant {
                        read: record.read,
                        add: record.add,
                        update: record.update,
                        delete: record.delete,
                    },
                )
            })
            .collect()
    }
}

impl FromIterator<(String, PermissionRecord)> for PermissionMap {
    fn from_iter<I: IntoIterator<Item = (String, PermissionRecord)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
