//! Doubly linked list over a `slotmap` arena.
//!
//! Per the Design Notes, a node-based `List` maps to "a doubly linked list
//! with stable iterators": nodes live in a [`slotmap::SlotMap`] so a
//! [`ListKey`] held externally stays valid (or cleanly fails to resolve)
//! across unrelated insertions and removals, instead of the raw
//! next/prev pointers the original container used.

use slotmap::{new_key_type, SlotMap};
use std::mem::size_of;

use crate::memory::Tag;

use super::{record_alloc, record_free, AllocatorHandle};

new_key_type! {
    /// Stable handle to one node of a [`PoolList`].
    pub struct ListKey;
}

struct Node<T> {
    value: T,
    prev: Option<ListKey>,
    next: Option<ListKey>,
}

/// A doubly linked list with stable, slotmap-backed node handles.
pub struct PoolList<T> {
    nodes: SlotMap<ListKey, Node<T>>,
    head: Option<ListKey>,
    tail: Option<ListKey>,
    tag: Tag,
    allocator: Option<AllocatorHandle>,
}

impl<T> PoolList<T> {
    pub fn new() -> Self {
        Self::with_allocator(Tag::DataStruct, None)
    }

    pub fn with_allocator(tag: Tag, allocator: Option<AllocatorHandle>) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
            tag,
            allocator,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn push_back(&mut self, value: T) -> ListKey {
        let key = self.nodes.insert(Node { value, prev: self.tail, next: None });
        if let Some(tail) = self.tail {
            self.nodes[tail].next = Some(key);
        } else {
            self.head = Some(key);
        }
        self.tail = Some(key);
        record_alloc(&self.allocator, self.tag, size_of::<T>() as i64);
        key
    }

    pub fn push_front(&mut self, value: T) -> ListKey {
        let key = self.nodes.insert(Node { value, prev: None, next: self.head });
        if let Some(head) = self.head {
            self.nodes[head].prev = Some(key);
        } else {
            self.tail = Some(key);
        }
        self.head = Some(key);
        record_alloc(&self.allocator, self.tag, size_of::<T>() as i64);
        key
    }

    /// Remove and return the front element, or `None` on an empty list --
    /// the original container's acknowledged bug (`PopBack` dereferencing a
    /// nullable tail) is deliberately not reproduced.
    pub fn pop_front(&mut self) -> Option<T> {
        let key = self.head?;
        Some(self.remove(key))
    }

    pub fn pop_back(&mut self) -> Option<T> {
        let key = self.tail?;
        Some(self.remove(key))
    }

    /// Remove an arbitrary node by its stable key.
    pub fn remove(&mut self, key: ListKey) -> T {
        let node = self.nodes.remove(key).expect("ListKey not present in this list");
        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }
        record_free(&self.allocator, self.tag, size_of::<T>() as i64);
        node.value
    }

    pub fn get(&self, key: ListKey) -> Option<&T> {
        self.nodes.get(key).map(|n| &n.value)
    }

    pub fn get_mut(&mut self, key: ListKey) -> Option<&mut T> {
        self.nodes.get_mut(key).map(|n| &mut n.value)
    }

    /// Front-to-back iteration, invalidated by any mutation of the list.
    pub fn iter(&self) -> PoolListIter<'_, T> {
        PoolListIter { list: self, current: self.head }
    }
}

impl<T> Default for PoolList<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct PoolListIter<'a, T> {
    list: &'a PoolList<T>,
    current: Option<ListKey>,
}

impl<'a, T> Iterator for PoolListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let key = self.current?;
        let node = &self.list.nodes[key];
        self.current = node.next;
        Some(&node.value)
    }
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
