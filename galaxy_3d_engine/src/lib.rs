/*!
# Galaxy 3D Engine

Core runtime for a 2D/3D game engine: pool allocator, containers, math and
hashing, broadphase/narrowphase physics, a resource registry, a trait-based
GPU device layer (backend implementations such as Vulkan are loaded as a
separate crate), a scene/render frontend, an audio mixer, and the
cooperative main loop tying them together.

## Architecture

- **GraphicsDevice**: Factory trait for creating GPU resources
- **ResourceManager**: Centralized, refcounted storage for textures, geometry, pipelines, materials
- **Scene / SceneManager**: Render instances, culling, and draw batching
- **AudioMixer**: Ring-buffer PCM mixing above a backend-agnostic `AudioDevice` trait
- **GameLoop**: Time advance, physics step, game update, audio, render, frame pacing

Backend implementations provide concrete types that implement these traits.
*/

// Error handling module
pub mod error;

// Engine singleton manager module
mod engine;

// Logging: severity levels, the `Logger` trait, and the `engine_*!` macros
#[macro_use]
pub mod log;

// Pool allocator and linear arena
pub mod memory;

// Vector/matrix/quaternion aliases, 2D AABB, and wyhash-derived hashing
pub mod math;

// Allocator-backed owning containers
pub mod containers;

// Broadphase + narrowphase + solver
pub mod physics;

// Low-level camera, frustum, and render view
pub mod camera;

// GPU resource traits (buffers, textures, pipelines, binding groups, command lists)
pub mod graphics_device;

// Frame directed-acyclic-graph of render passes
pub mod render_graph;

// Centralized storage for textures, geometry, pipelines, and materials
pub mod resource;

// Scene graph: render instances and drawing strategies
pub mod scene;

// Small standalone utilities (slot allocation, etc.)
pub mod utils;

// Stereo PCM ring-buffer mixer and the platform audio device SPI
pub mod audio;

// Persisted engine settings (audio volumes, window geometry, frame pacing)
pub mod settings;

// Cooperative single-threaded main loop and the platform shim boundary
pub mod game_loop;

// Re-export error types at crate root
pub use error::{Error, Galaxy3dError, Galaxy3dResult, Result};

// Re-export settings
pub use settings::Settings;

// Re-export the main loop
pub use game_loop::{GameLoop, InputSnapshot, PlatformShim};

// Re-export the Engine singleton
pub use engine::Engine;

// Re-export math library
pub use glam;
