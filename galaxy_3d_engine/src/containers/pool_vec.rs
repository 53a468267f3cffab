//! Accounting-instrumented dynamic array: an owning `Vec<T>` that reports
//! growth and truncation to a shared [`crate::memory::PoolAllocator`].

use std::mem::size_of;
use std::ops::{Deref, DerefMut};

use crate::memory::Tag;

use super::{record_alloc, record_free, AllocatorHandle};

/// A `Vec<T>` wrapper that attributes its capacity growth to a pool tag.
pub struct PoolVec<T> {
    inner: Vec<T>,
    tag: Tag,
    allocator: Option<AllocatorHandle>,
    reported_capacity: usize,
}

impl<T> PoolVec<T> {
    pub fn new() -> Self {
        Self::with_allocator(Tag::DataStruct, None)
    }

    pub fn with_allocator(tag: Tag, allocator: Option<AllocatorHandle>) -> Self {
        Self {
            inner: Vec::new(),
            tag,
            allocator,
            reported_capacity: 0,
        }
    }

    fn sync_capacity_accounting(&mut self) {
        let current = self.inner.capacity();
        if current > self.reported_capacity {
            let delta = (current - self.reported_capacity) * size_of::<T>();
            record_alloc(&self.allocator, self.tag, delta as i64);
        } else if current < self.reported_capacity {
            let delta = (self.reported_capacity - current) * size_of::<T>();
            record_free(&self.allocator, self.tag, delta as i64);
        }
        self.reported_capacity = current;
    }

    pub fn push(&mut self, value: T) {
        self.inner.push(value);
        self.sync_capacity_accounting();
    }

    pub fn pop(&mut self) -> Option<T> {
        self.inner.pop()
    }

    /// `Vector::Find`, fixed: searches by index `i`, not by `self.len()`
    /// (the original source's acknowledged bug).
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<usize> {
        self.inner.iter().position(predicate)
    }

    pub fn shrink_to_fit(&mut self) {
        self.inner.shrink_to_fit();
        self.sync_capacity_accounting();
    }
}

impl<T> Default for PoolVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for PoolVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.inner
    }
}

impl<T> DerefMut for PoolVec<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.inner
    }
}

impl<T> Drop for PoolVec<T> {
    fn drop(&mut self) {
        record_free(&self.allocator, self.tag, (self.reported_capacity * size_of::<T>()) as i64);
    }
}

#[cfg(test)]
#[path = "pool_vec_tests.rs"]
mod tests;
