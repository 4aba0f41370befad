use dashmap::{mapref::entry::Entry, DashMap};
use std::{hash::Hash, sync::Arc};

/// Process-local map shared between handler tasks. Each call takes only the
/// shard lock of its key, so no lock is held across an await point.
#[derive(Clone, Debug)]
pub struct MemoryCache<K: Eq + Hash, V: Clone> {
    cache: Arc<DashMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> MemoryCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Arc::new(DashMap::with_capacity(capacity)),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.cache.get(key).map(|value| value.value().clone())
    }

    /// Returns `true` when the key was not present before.
    pub fn set(&self, key: K, value: V) -> bool {
        self.cache.insert(key, value).is_none()
    }

    /// Inserts only when the key is vacant; an existing value is left untouched.
    pub fn set_if_absent(&self, key: K, value: V) -> bool {
        match self.cache.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn del(&self, key: &K) -> Option<V> {
        self.cache.remove(key).map(|(_, value)| value)
    }

    /// Keeps only the entries for which `keep` returns `true`; returns how many were dropped.
    pub fn retain<F>(&self, mut keep: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        let before = self.cache.len();
        self.cache.retain(|key, value| keep(key, value));
        before.saturating_sub(self.cache.len())
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_del() {
        let cache: MemoryCache<String, u32> = MemoryCache::new(4);

        assert!(cache.set("a".into(), 1));
        assert!(!cache.set("a".into(), 2));
        assert_eq!(cache.get(&"a".to_string()), Some(2));

        assert_eq!(cache.del(&"a".to_string()), Some(2));
        assert_eq!(cache.get(&"a".to_string()), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_if_absent_keeps_existing() {
        let cache: MemoryCache<&'static str, u32> = MemoryCache::new(2);

        assert!(cache.set_if_absent("k", 1));
        assert!(!cache.set_if_absent("k", 2));
        assert_eq!(cache.get(&"k"), Some(1));
    }

    #[test]
    fn test_retain_counts_dropped() {
        let cache: MemoryCache<i64, i64> = MemoryCache::new(8);
        for i in 0..6 {
            cache.set(i, i * 10);
        }

        let dropped = cache.retain(|_, v| *v >= 30);

        assert_eq!(dropped, 3);
        assert_eq!(cache.len(), 3);
        assert!(cache.get(&5).is_some());
        assert!(cache.get(&0).is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let cache: MemoryCache<i64, &'static str> = MemoryCache::new(1);
        let other = cache.clone();

        cache.set(7, "seven");

        assert_eq!(other.get(&7), Some("seven"));
    }
}
