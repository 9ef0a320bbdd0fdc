//! Tenant-isolated storage for roles and subscribed menus.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use navguard_core::{DomainError, DomainResult, TenantId};

/// Tenant-isolated key/value store abstraction.
pub trait TenantStore<K, V>: Send + Sync {
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V>;
    fn upsert(&self, tenant_id: TenantId, key: K, value: V);
    fn list(&self, tenant_id: TenantId) -> Vec<V>;
    /// Returns the removed value, if there was one.
    fn remove(&self, tenant_id: TenantId, key: &K) -> Option<V>;

    /// Compute and store the value for `key` under a single write lock.
    ///
    /// `build` sees the value currently stored under `key` and every other
    /// value of the tenant. An error from `build` leaves the store untouched.
    fn upsert_with(
        &self,
        tenant_id: TenantId,
        key: K,
        build: &dyn Fn(Option<&V>, &[&V]) -> DomainResult<V>,
    ) -> DomainResult<V>;
}

impl<K, V, S> TenantStore<K, V> for Arc<S>
where
    S: TenantStore<K, V> + ?Sized,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        (**self).get(tenant_id, key)
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        (**self).upsert(tenant_id, key, value)
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        (**self).list(tenant_id)
    }

    fn remove(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        (**self).remove(tenant_id, key)
    }

    fn upsert_with(
        &self,
        tenant_id: TenantId,
        key: K,
        build: &dyn Fn(Option<&V>, &[&V]) -> DomainResult<V>,
    ) -> DomainResult<V> {
        (**self).upsert_with(tenant_id, key, build)
    }
}

/// In-memory tenant-isolated store.
#[derive(Debug)]
pub struct InMemoryTenantStore<K, V> {
    inner: RwLock<HashMap<(TenantId, K), V>>,
}

impl<K, V> InMemoryTenantStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryTenantStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> TenantStore<K, V> for InMemoryTenantStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        let map = self.inner.read().ok()?;
        map.get(&(tenant_id, key.clone())).cloned()
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        if let Ok(mut map) = self.inner.write() {
            map.insert((tenant_id, key), value);
        }
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };

        map.iter()
            .filter_map(|((t, _k), v)| if *t == tenant_id { Some(v.clone()) } else { None })
            .collect()
    }

    fn remove(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        let mut map = self.inner.write().ok()?;
        map.remove(&(tenant_id, key.clone()))
    }

    fn upsert_with(
        &self,
        tenant_id: TenantId,
        key: K,
        build: &dyn Fn(Option<&V>, &[&V]) -> DomainResult<V>,
    ) -> DomainResult<V> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("tenant store lock poisoned"))?;

        let current = map.get(&(tenant_id, key.clone()));
        let others: Vec<&V> = map
            .iter()
            .filter(|((t, k), _v)| *t == tenant_id && *k != key)
            .map(|(_k, v)| v)
            .collect();
        let value = build(current, &others)?;

        map.insert((tenant_id, key), value.clone());
        Ok(value)
    }
}
