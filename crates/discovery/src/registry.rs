//! Owned map of live controllers.
//!
//! Lookups never create entries. Creation on lookup is a separate, explicitly
//! named call, so every dispatch site states which of the two rules it uses:
//! get-or-create for switch online/management paths, must-exist for port and
//! ISL level events.

use std::collections::BTreeMap;

/// Keyed arena of state machines, owned by a single worker.
///
/// Iteration follows key order, so side effects broadcast over all
/// controllers come out in a stable order.
#[derive(Debug, Clone)]
pub struct Registry<K, V> {
    inner: BTreeMap<K, V>,
}

impl<K, V> Registry<K, V>
where
    K: Ord + Copy,
{
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Returns the controller for `key`. **This never creates entries.**
    pub fn locate(&self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    /// Mutable variant of [`Registry::locate`]. **This never creates entries.**
    pub fn locate_mut(&mut self, key: &K) -> Option<&mut V> {
        self.inner.get_mut(key)
    }

    /// Returns the controller for `key`, building it with `create` first if
    /// it is absent.
    pub fn locate_or_create<F>(&mut self, key: K, create: F) -> &mut V
    where
        F: FnOnce(K) -> V,
    {
        self.inner.entry(key).or_insert_with(|| create(key))
    }

    /// Inserts a controller, returning the one it replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.inner.insert(key, value)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.inner.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.inner.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.inner.values_mut()
    }
}

impl<K, V> Default for Registry<K, V>
where
    K: Ord + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_never_creates() {
        let mut registry: Registry<u32, String> = Registry::new();

        assert!(registry.locate(&1).is_none());
        assert!(registry.locate_mut(&1).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_locate_or_create() {
        let mut registry: Registry<u32, String> = Registry::new();

        let value = registry.locate_or_create(7, |key| format!("fsm-{}", key));
        assert_eq!(value, "fsm-7");
        value.push_str("-touched");

        let value = registry.locate_or_create(7, |_| "replacement".to_string());
        assert_eq!(value, "fsm-7-touched");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_iteration_in_key_order() {
        let mut registry: Registry<u32, u32> = Registry::new();
        registry.insert(3, 30);
        registry.insert(1, 10);
        registry.insert(2, 20);

        assert_eq!(registry.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(registry.remove(&2), Some(20));
        assert_eq!(registry.values().copied().collect::<Vec<_>>(), vec![10, 30]);
    }
}
