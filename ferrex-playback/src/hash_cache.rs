use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

use tracing::trace;

pub const DEFAULT_CAPACITY: usize = 2_000;

/// Last seen value hash for one key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub last_hash: u64,
}

#[derive(Debug)]
struct Slot {
    last_hash: u64,
    stamp: u64,
}

/// Bounded key -> value-hash cache used to suppress duplicate change
/// notifications.
///
/// Ordering is by last touch: every `touch` moves the key to the newest
/// position and eviction drops the oldest keys once the capacity is
/// exceeded. Reads never reorder.
#[derive(Debug)]
pub struct HashCache {
    cap: usize,
    slots: HashMap<String, Slot>,
    // stamp -> key, oldest first
    order: BTreeMap<u64, String>,
    next_stamp: u64,
}

impl Default for HashCache {
    fn default() -> Self {
        Self::new()
    }
}

impl HashCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            slots: HashMap::new(),
            order: BTreeMap::new(),
            next_stamp: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    pub fn last_hash(&self, key: &str) -> Option<u64> {
        self.slots.get(key).map(|slot| slot.last_hash)
    }

    /// Record `value` for `key`.
    ///
    /// Returns `true` only when the key was already known and the value hash
    /// differs from the stored one. New keys and unchanged values return
    /// `false`.
    pub fn touch<V: Hash + ?Sized>(&mut self, key: &str, value: &V) -> bool {
        let hash = hash_value(value);
        let stamp = self.bump_stamp();

        let changed = match self.slots.get_mut(key) {
            Some(slot) => {
                self.order.remove(&slot.stamp);
                slot.stamp = stamp;
                let changed = slot.last_hash != hash;
                if changed {
                    slot.last_hash = hash;
                }
                changed
            }
            None => {
                self.slots.insert(
                    key.to_owned(),
                    Slot {
                        last_hash: hash,
                        stamp,
                    },
                );
                false
            }
        };
        self.order.insert(stamp, key.to_owned());

        self.evict_overflow();
        changed
    }

    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let slot = self.slots.remove(key)?;
        self.order.remove(&slot.stamp);
        Some(CacheEntry {
            key: key.to_owned(),
            last_hash: slot.last_hash,
        })
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.order.clear();
    }

    /// Entries from least to most recently touched.
    pub fn entries(&self) -> impl Iterator<Item = CacheEntry> + '_ {
        self.order.values().filter_map(|key| {
            self.slots.get(key).map(|slot| CacheEntry {
                key: key.clone(),
                last_hash: slot.last_hash,
            })
        })
    }

    fn bump_stamp(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }

    fn evict_overflow(&mut self) {
        while self.slots.len() > self.cap {
            let Some((_, oldest)) = self.order.pop_first() else {
                break;
            };
            self.slots.remove(&oldest);
            trace!(key = %oldest, "evicted hash cache entry");
        }
    }
}

fn hash_value<V: Hash + ?Sized>(value: &V) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_key_is_not_a_change() {
        let mut cache = HashCache::new();
        assert!(!cache.touch("item-1", &true));
        assert!(cache.contains("item-1"));
    }

    #[test]
    fn unchanged_value_is_not_a_change() {
        let mut cache = HashCache::new();
        cache.touch("item-1", "played");
        assert!(!cache.touch("item-1", "played"));
    }

    #[test]
    fn changed_value_is_reported_once() {
        let mut cache = HashCache::new();
        cache.touch("item-1", &1u32);
        assert!(cache.touch("item-1", &2u32));
        assert!(!cache.touch("item-1", &2u32));
    }

    #[test]
    fn overflow_evicts_least_recently_touched() {
        let mut cache = HashCache::new();
        for i in 0..=DEFAULT_CAPACITY {
            cache.touch(&format!("key-{i}"), &i);
        }

        assert_eq!(cache.len(), DEFAULT_CAPACITY);
        assert!(!cache.contains("key-0"));
        assert!(cache.contains("key-1"));
        assert!(cache.contains(&format!("key-{DEFAULT_CAPACITY}")));
    }

    #[test]
    fn touching_refreshes_position_even_when_unchanged() {
        let mut cache = HashCache::with_capacity(3);
        cache.touch("a", &1);
        cache.touch("b", &1);
        cache.touch("c", &1);

        // Same value, but "a" becomes the newest entry.
        assert!(!cache.touch("a", &1));
        cache.touch("d", &1);

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        let keys: Vec<_> = cache.entries().map(|e| e.key).collect();
        assert_eq!(keys, vec!["c", "a", "d"]);
    }

    #[test]
    fn evicted_key_comes_back_as_new() {
        let mut cache = HashCache::with_capacity(1);
        cache.touch("a", &1);
        cache.touch("b", &1);
        // "a" was evicted, so a different value is not reported as a change.
        assert!(!cache.touch("a", &2));
    }

    #[test]
    fn remove_and_clear() {
        let mut cache = HashCache::new();
        cache.touch("a", &1);
        cache.touch("b", &2);

        let removed = cache.remove("a").unwrap();
        assert_eq!(removed.key, "a");
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.entries().count(), 0);
    }
}
