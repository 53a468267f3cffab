//! Vector/matrix aliases, 2D AABB, and the engine's wyhash-derived hashing and RNG.

mod aabb;
mod hash;

pub use aabb::Box;
pub use hash::{wyhash, Rng};

/// 2-component float vector, aliased onto `glam` so containers and the GPU
/// upload path share one representation.
pub type Vector2 = glam::Vec2;
/// 3-component float vector.
pub type Vector3 = glam::Vec3;
/// 4-component float vector.
pub type Vector4 = glam::Vec4;
/// 4x4 column-major matrix.
pub type Matrix4 = glam::Mat4;
/// Unit quaternion rotation.
pub type Quaternion = glam::Quat;
