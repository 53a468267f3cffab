//! Fixed-size-class pool allocator.
//!
//! Each class owns a flat `Vec<u8>` backing store split into fixed-size
//! slots plus a free-index tracker, mirroring the teacher's
//! [`crate::utils::slot_allocator::SlotAllocator`] recycling idiom rather
//! than raw pointer arithmetic: a `Block` handle (class, slot index, tag)
//! stands in for the address-range-classified pointer the original
//! allocator returns, giving the same O(1) tag-agnostic `Free` without
//! unsafe code this workspace cannot exercise through the toolchain.

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

/// Allocation tag used to attribute pool usage to a subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    DataStruct,
    Renderer,
    Texture,
    Audio,
    Physics,
    GameObject,
    UI,
    Resource,
    Game,
}

const ALL_TAGS: [Tag; 9] = [
    Tag::DataStruct,
    Tag::Renderer,
    Tag::Texture,
    Tag::Audio,
    Tag::Physics,
    Tag::GameObject,
    Tag::UI,
    Tag::Resource,
    Tag::Game,
];

/// One of the four fixed allocation size classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    Kb1,
    Kb16,
    Kb256,
    Mb4,
}

impl SizeClass {
    const ORDER: [SizeClass; 4] = [SizeClass::Kb1, SizeClass::Kb16, SizeClass::Kb256, SizeClass::Mb4];

    pub fn slot_size(self) -> usize {
        match self {
            SizeClass::Kb1 => 1024,
            SizeClass::Kb16 => 16 * 1024,
            SizeClass::Kb256 => 256 * 1024,
            SizeClass::Mb4 => 4 * 1024 * 1024,
        }
    }

    /// Smallest class whose slot size is `>= size`, if any.
    fn smallest_fitting(size: usize) -> Option<SizeClass> {
        Self::ORDER.into_iter().find(|c| size <= c.slot_size())
    }

    fn next(self) -> Option<SizeClass> {
        let idx = Self::ORDER.iter().position(|c| *c == self)?;
        Self::ORDER.get(idx + 1).copied()
    }
}

/// A stable handle to a live pool allocation, returned by [`PoolAllocator::allocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    /// Lives in one of the four fixed size-classes.
    Pooled { class: SizeClass, index: u32, tag: Tag },
    /// The dynamic region was exhausted; this allocation was routed to the host.
    Host { id: u32, tag: Tag },
}

impl Block {
    pub fn tag(&self) -> Tag {
        match self {
            Block::Pooled { tag, .. } => *tag,
            Block::Host { tag, .. } => *tag,
        }
    }
}

/// Running per-tag byte/alloc/free counters, returned by [`PoolAllocator::stats`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TagStats {
    pub bytes: i64,
    pub allocs: u64,
    pub frees: u64,
}

struct ClassArena {
    slot_size: usize,
    slots: Vec<u8>,
    live: Vec<bool>,
    free_list: Vec<u32>,
    next_id: u32,
}

impl ClassArena {
    fn new(slot_size: usize, slot_count: usize) -> Self {
        Self {
            slot_size,
            slots: vec![0u8; slot_size * slot_count.max(1)],
            live: vec![false; slot_count.max(1)],
            free_list: Vec::new(),
            next_id: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.live.len()
    }

    fn try_alloc(&mut self) -> Option<u32> {
        if let Some(index) = self.free_list.pop() {
            self.live[index as usize] = true;
            return Some(index);
        }
        if (self.next_id as usize) < self.capacity() {
            let index = self.next_id;
            self.next_id += 1;
            self.live[index as usize] = true;
            return Some(index);
        }
        None
    }

    fn slot_mut(&mut self, index: u32) -> &mut [u8] {
        let start = index as usize * self.slot_size;
        &mut self.slots[start..start + self.slot_size]
    }

    fn slot(&self, index: u32) -> &[u8] {
        let start = index as usize * self.slot_size;
        &self.slots[start..start + self.slot_size]
    }

    fn free(&mut self, index: u32) -> Result<()> {
        if !self.live.get(index as usize).copied().unwrap_or(false) {
            crate::engine_bail!(
                "galaxy3d::PoolAllocator",
                "double free or invalid slot index {} (invariant violation)",
                index
            );
        }
        self.slot_mut(index).fill(0);
        self.live[index as usize] = false;
        self.free_list.push(index);
        Ok(())
    }
}

/// The process-wide pool allocator: four fixed-size classes plus a host
/// fallback for oversized or class-exhausted requests.
pub struct PoolAllocator {
    classes: FxHashMap<SizeClass, ClassArena>,
    host_blocks: FxHashMap<u32, (Vec<u8>, Tag)>,
    next_host_id: u32,
    stats: FxHashMap<Tag, TagStats>,
}

impl PoolAllocator {
    /// Build the four size classes from a total byte budget, split per the
    /// data model: `region_4MB ~= total/20`, `region_256KB ~= 15%` of the
    /// remainder, `region_16KB ~= 30%` of what's left, `region_1KB` takes
    /// the rest.
    pub fn new(total_bytes: usize) -> Self {
        let mb4_budget = total_bytes / 20;
        let remainder_after_mb4 = total_bytes.saturating_sub(mb4_budget);
        let kb256_budget = remainder_after_mb4 * 15 / 100;
        let remainder_after_kb256 = remainder_after_mb4.saturating_sub(kb256_budget);
        let kb16_budget = remainder_after_kb256 * 30 / 100;
        let kb1_budget = remainder_after_kb256.saturating_sub(kb16_budget);

        let mut classes = FxHashMap::default();
        classes.insert(SizeClass::Mb4, ClassArena::new(SizeClass::Mb4.slot_size(), mb4_budget / SizeClass::Mb4.slot_size()));
        classes.insert(SizeClass::Kb256, ClassArena::new(SizeClass::Kb256.slot_size(), kb256_budget / SizeClass::Kb256.slot_size()));
        classes.insert(SizeClass::Kb16, ClassArena::new(SizeClass::Kb16.slot_size(), kb16_budget / SizeClass::Kb16.slot_size()));
        classes.insert(SizeClass::Kb1, ClassArena::new(SizeClass::Kb1.slot_size(), kb1_budget / SizeClass::Kb1.slot_size()));

        let mut stats = FxHashMap::default();
        for tag in ALL_TAGS {
            stats.insert(tag, TagStats::default());
        }

        Self {
            classes,
            host_blocks: FxHashMap::default(),
            next_host_id: 0,
            stats,
        }
    }

    /// Pick the smallest class with `size <= class-size`; promote to the
    /// next larger class if that one is full; fall back to the host
    /// allocator if all four are exhausted. Returns a zero-initialized slot.
    pub fn allocate(&mut self, size: usize, tag: Tag) -> Block {
        let mut class = SizeClass::smallest_fitting(size);
        while let Some(c) = class {
            if let Some(arena) = self.classes.get_mut(&c) {
                if let Some(index) = arena.try_alloc() {
                    self.record_alloc(tag, arena.slot_size as i64);
                    return Block::Pooled { class: c, index, tag };
                }
            }
            class = c.next();
        }

        let id = self.next_host_id;
        self.next_host_id += 1;
        self.host_blocks.insert(id, (vec![0u8; size], tag));
        self.record_alloc(tag, size as i64);
        Block::Host { id, tag }
    }

    /// Returns the slot to its class's free list and zeros its bytes.
    /// Freeing a host-fallback block simply drops its buffer.
    pub fn free(&mut self, block: Block, size: usize) -> Result<()> {
        match block {
            Block::Pooled { class, index, tag } => {
                let arena = self.classes.get_mut(&class).ok_or_else(|| {
                    Error::InvalidHandle(format!("no arena for size class {:?}", class))
                })?;
                arena.free(index)?;
                self.record_free(tag, arena.slot_size as i64);
                Ok(())
            }
            Block::Host { id, tag } => {
                if self.host_blocks.remove(&id).is_none() {
                    crate::engine_bail!("galaxy3d::PoolAllocator", "double free of host block {}", id);
                }
                self.record_free(tag, size as i64);
                Ok(())
            }
        }
    }

    pub fn slot(&self, block: Block) -> Result<&[u8]> {
        match block {
            Block::Pooled { class, index, .. } => {
                let arena = self.classes.get(&class).ok_or_else(|| {
                    Error::InvalidHandle(format!("no arena for size class {:?}", class))
                })?;
                Ok(arena.slot(index))
            }
            Block::Host { id, .. } => self
                .host_blocks
                .get(&id)
                .map(|(buf, _)| buf.as_slice())
                .ok_or_else(|| Error::InvalidHandle(format!("host block {} not found", id))),
        }
    }

    pub fn slot_mut(&mut self, block: Block) -> Result<&mut [u8]> {
        match block {
            Block::Pooled { class, index, .. } => {
                let arena = self.classes.get_mut(&class).ok_or_else(|| {
                    Error::InvalidHandle(format!("no arena for size class {:?}", class))
                })?;
                Ok(arena.slot_mut(index))
            }
            Block::Host { id, .. } => self
                .host_blocks
                .get_mut(&id)
                .map(|(buf, _)| buf.as_mut_slice())
                .ok_or_else(|| Error::InvalidHandle(format!("host block {} not found", id))),
        }
    }

    pub fn stats(&self) -> &FxHashMap<Tag, TagStats> {
        &self.stats
    }

    /// Record an allocation made outside the pool's own slots (e.g. a
    /// container's internal `Vec` growth) against a tag's running totals,
    /// without handing out a [`Block`]. Used by the `containers` module.
    pub fn note_external_alloc(&mut self, tag: Tag, bytes: i64) {
        let entry = self.stats.entry(tag).or_default();
        entry.bytes += bytes;
        entry.allocs += 1;
    }

    /// Counterpart to [`PoolAllocator::note_external_alloc`].
    pub fn note_external_free(&mut self, tag: Tag, bytes: i64) {
        let entry = self.stats.entry(tag).or_default();
        entry.bytes -= bytes;
        entry.frees += 1;
    }

    pub fn class_capacity(&self, class: SizeClass) -> usize {
        self.classes.get(&class).map(|a| a.capacity()).unwrap_or(0)
    }

    fn record_alloc(&mut self, tag: Tag, bytes: i64) {
        let entry = self.stats.entry(tag).or_default();
        entry.bytes += bytes;
        entry.allocs += 1;
    }

    fn record_free(&mut self, tag: Tag, bytes: i64) {
        let entry = self.stats.entry(tag).or_default();
        entry.bytes -= bytes;
        entry.frees += 1;
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
