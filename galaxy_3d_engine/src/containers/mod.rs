//! Owned containers parameterised by the pool allocator (`memory` module).
//!
//! Each container reports its byte/alloc/free deltas to a shared
//! [`crate::memory::PoolAllocator`] under a [`crate::memory::Tag`] fixed at
//! construction (`DataStruct` unless the caller specializes it), the way
//! the data model requires containers to "route allocation through A".
//! Storage itself uses ordinary owned Rust types — a `Vec`, a `slotmap`
//! arena, a chained bucket table — per the Design Notes' instruction to
//! map hand-rolled C++ containers onto the target language's owning
//! container rather than recreate their internal byte layout.

mod hash_map;
mod list;
mod pool_string;
mod pool_vec;

pub use hash_map::PoolHashMap;
pub use list::{ListKey, PoolList};
pub use pool_string::PoolString;
pub use pool_vec::PoolVec;

use std::sync::{Arc, Mutex};

use crate::memory::{PoolAllocator, Tag};

/// Shared handle to the allocator a container reports usage to.
pub type AllocatorHandle = Arc<Mutex<PoolAllocator>>;

pub(crate) fn record_alloc(allocator: &Option<AllocatorHandle>, tag: Tag, bytes: i64) {
    if let Some(alloc) = allocator {
        if let Ok(mut guard) = alloc.lock() {
            guard.note_external_alloc(tag, bytes);
        }
    }
}

pub(crate) fn record_free(allocator: &Option<AllocatorHandle>, tag: Tag, bytes: i64) {
    if let Some(alloc) = allocator {
        if let Ok(mut guard) = alloc.lock() {
            guard.note_external_free(tag, bytes);
        }
    }
}
