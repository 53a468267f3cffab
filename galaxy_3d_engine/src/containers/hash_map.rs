//! Chained-bucket hash map with a wyhash-derived key hash.
//!
//! Table size is fixed at construction; unlike `std::collections::HashMap`
//! there is no automatic rehash, matching the data model's
//! `HashMap<K,V>` contract exactly (fixed bucket count chosen up front,
//! chained collision resolution, bit-exact key comparison).

use std::mem::size_of;

use crate::memory::Tag;

use super::{record_alloc, record_free, AllocatorHandle};

/// A hash map over fixed bucket count with chained (`Vec`-per-bucket)
/// collision resolution. Keys are hashed with [`crate::math::wyhash`] and
/// compared bit-exact (`PartialEq`); there is no automatic rehash.
pub struct PoolHashMap<K, V> {
    buckets: Vec<Vec<(K, V)>>,
    len: usize,
    tag: Tag,
    allocator: Option<AllocatorHandle>,
}

impl<K: AsRef<[u8]> + PartialEq + Clone, V: Clone> PoolHashMap<K, V> {
    pub fn new(bucket_count: usize) -> Self {
        Self::with_allocator(bucket_count, Tag::DataStruct, None)
    }

    pub fn with_allocator(bucket_count: usize, tag: Tag, allocator: Option<AllocatorHandle>) -> Self {
        assert!(bucket_count > 0, "bucket_count must be non-zero");
        Self {
            buckets: (0..bucket_count).map(|_| Vec::new()).collect(),
            len: 0,
            tag,
            allocator,
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn bucket_for(&self, key: &K) -> usize {
        crate::math::wyhash(key.as_ref()) as usize % self.buckets.len()
    }

    /// Insert or overwrite. Returns the previous value, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let idx = self.bucket_for(&key);
        let bucket = &mut self.buckets[idx];
        if let Some(slot) = bucket.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        let entry_bytes = (size_of::<K>() + size_of::<V>()) as i64;
        bucket.push((key, value));
        self.len += 1;
        record_alloc(&self.allocator, self.tag, entry_bytes);
        None
    }

    /// Returns `default` on a miss, matching the data model's
    /// "caller-provided invalid value" contract.
    pub fn get_or(&self, key: &K, default: V) -> V
    where
        V: Clone,
    {
        self.get(key).cloned().unwrap_or(default)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let idx = self.bucket_for(key);
        self.buckets[idx].iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.bucket_for(key);
        self.buckets[idx].iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.bucket_for(key);
        let bucket = &mut self.buckets[idx];
        let pos = bucket.iter().position(|(k, _)| k == key)?;
        let (_, value) = bucket.remove(pos);
        self.len -= 1;
        record_free(&self.allocator, self.tag, (size_of::<K>() + size_of::<V>()) as i64);
        Some(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets.iter().flat_map(|b| b.iter().map(|(k, v)| (k, v)))
    }
}

#[cfg(test)]
#[path = "hash_map_tests.rs"]
mod tests;
