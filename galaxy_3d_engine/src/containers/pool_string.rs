//! Nul-terminated mutable string buffer with integer round-trip conversions.
//!
//! The underlying storage is a plain `String`; the "nul-terminated"
//! contract from the data model is expressed at the API boundary
//! (`as_cstr_bytes`) rather than by literally embedding a `\0` byte, since
//! Rust's `String` already guarantees valid UTF-8 and a safe API has no
//! use for a raw terminator inside the buffer itself.

use crate::memory::Tag;

use super::{record_alloc, record_free, AllocatorHandle};

pub struct PoolString {
    inner: String,
    tag: Tag,
    allocator: Option<AllocatorHandle>,
    reported_capacity: usize,
}

impl PoolString {
    pub fn new() -> Self {
        Self::with_allocator(Tag::DataStruct, None)
    }

    pub fn with_allocator(tag: Tag, allocator: Option<AllocatorHandle>) -> Self {
        Self {
            inner: String::new(),
            tag,
            allocator,
            reported_capacity: 0,
        }
    }

    pub fn from_str(s: &str) -> Self {
        let mut out = Self::new();
        out.push_str(s);
        out
    }

    fn sync_capacity_accounting(&mut self) {
        let current = self.inner.capacity();
        if current > self.reported_capacity {
            record_alloc(&self.allocator, self.tag, (current - self.reported_capacity) as i64);
        } else if current < self.reported_capacity {
            record_free(&self.allocator, self.tag, (self.reported_capacity - current) as i64);
        }
        self.reported_capacity = current;
    }

    pub fn push_str(&mut self, s: &str) {
        self.inner.push_str(s);
        self.sync_capacity_accounting();
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Bytes including a trailing nul terminator, for FFI-style consumers.
    pub fn as_cstr_bytes(&self) -> Vec<u8> {
        let mut bytes = self.inner.as_bytes().to_vec();
        bytes.push(0);
        bytes
    }

    /// Parse the buffer as a signed integer of type `N`.
    pub fn to_int<N>(&self) -> Option<N>
    where
        N: std::str::FromStr,
    {
        self.inner.trim().parse::<N>().ok()
    }

    /// Parse the buffer as an unsigned 64-bit integer, ASCII decimal, no
    /// leading sign.
    pub fn to_u64(&self) -> Option<u64> {
        let trimmed = self.inner.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        trimmed.parse::<u64>().ok()
    }
}

impl Default for PoolString {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PoolString {
    fn drop(&mut self) {
        record_free(&self.allocator, self.tag, self.reported_capacity as i64);
    }
}

#[cfg(test)]
#[path = "pool_string_tests.rs"]
mod tests;
