//! Custom pool allocator: four fixed-size classes plus a linear static arena.
//!
//! Containers (`containers` module) route their backing storage through a
//! shared [`PoolAllocator`] instead of the host allocator, tagging every
//! allocation so usage can be attributed per subsystem.

mod pool;
mod arena;

pub use pool::{Block, PoolAllocator, SizeClass, Tag, TagStats};
pub use arena::LinearArena;
