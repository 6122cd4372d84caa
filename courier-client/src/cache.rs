//! Fixed-capacity map with insertion-order batch eviction.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// A map holding at most `capacity` entries.
///
/// Inserting a new key into a full cache first drops the `⌈capacity/2⌉ + 1`
/// oldest entries in one pass. Re-inserting an existing key replaces its
/// value and makes it the newest entry; reads do not touch the order.
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    capacity: usize,
    next:     u64,
    order:    BTreeMap<u64, K>,
    entries:  HashMap<K, (u64, V)>,
}

impl<K: Eq + Hash + Clone, V> BoundedCache<K, V> {
    /// A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next:     0,
            order:    BTreeMap::new(),
            entries:  HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert `value`, returning the previous value stored under `key`.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let previous = match self.entries.remove(&key) {
            Some((seq, old)) => {
                self.order.remove(&seq);
                Some(old)
            }
            None => {
                if self.entries.len() >= self.capacity {
                    self.evict();
                }
                None
            }
        };
        let seq = self.next;
        self.next += 1;
        self.order.insert(seq, key.clone());
        self.entries.insert(key, (seq, value));
        previous
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (seq, value) = self.entries.remove(key)?;
        self.order.remove(&seq);
        Some(value)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }

    fn evict(&mut self) {
        let count = (self.capacity.div_ceil(2) + 1).min(self.entries.len());
        for _ in 0..count {
            if let Some((_, key)) = self.order.pop_first() {
                self.entries.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_holds_one_entry() {
        let mut cache = BoundedCache::new(0);
        assert_eq!(cache.capacity(), 1);
        assert!(cache.is_empty());

        cache.insert('a', ());
        cache.insert('b', ());
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key(&'b'));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn full_cache_drops_oldest_half_plus_one() {
        let mut cache = BoundedCache::new(10);
        for i in 0..10 {
            cache.insert(i, i * 10);
        }
        assert_eq!(cache.len(), 10);

        cache.insert(10, 100);
        // 10 - (5 + 1) survivors, then the new entry.
        assert_eq!(cache.len(), 5);
        for gone in 0..6 {
            assert!(!cache.contains_key(&gone));
        }
        for kept in 6..=10 {
            assert_eq!(cache.get(&kept), Some(&(kept * 10)));
        }
    }

    #[test]
    fn odd_capacity_rounds_up() {
        let mut cache = BoundedCache::new(5);
        for i in 0..5 {
            cache.insert(i, ());
        }
        cache.insert(5, ());
        // ⌈5/2⌉ + 1 = 4 evicted
        assert_eq!(cache.len(), 2);
        assert!(cache.contains_key(&4) && cache.contains_key(&5));
    }

    #[test]
    fn never_exceeds_capacity() {
        for capacity in [1, 2, 3, 7, 64] {
            let mut cache = BoundedCache::new(capacity);
            for i in 0..500 {
                cache.insert(i, ());
                assert!(cache.len() <= capacity);
            }
        }
    }

    #[test]
    fn reinsert_moves_to_newest_without_evicting() {
        let mut cache = BoundedCache::new(3);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);
        assert_eq!(cache.insert("a", 4), Some(1));
        assert_eq!(cache.len(), 3);

        // "b" is now the oldest; 3/2 rounded up plus one = 3 go.
        cache.insert("d", 5);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"d"), Some(&5));
    }

    #[test]
    fn remove_frees_a_slot() {
        let mut cache = BoundedCache::new(2);
        cache.insert(1, ());
        cache.insert(2, ());
        cache.remove(&1);
        cache.insert(3, ());
        assert_eq!(cache.len(), 2);
        assert!(cache.contains_key(&2));
    }
}
