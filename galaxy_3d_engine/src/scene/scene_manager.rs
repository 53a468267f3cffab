//! Central scene manager for the engine.
//!
//! Manages scenes and their contents (nodes, instances, etc.).
//! Scene types will be added incrementally as the engine evolves.

pub struct SceneManager {
}

impl SceneManager {
    /// Create a new empty scene manager
    pub fn new() -> Self {
        Self {
        }
    }
}
