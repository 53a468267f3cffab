//! 2D physics: broadphase pair generation, narrowphase contact
//! determination, and impulse resolution, orchestrated per frame by
//! [`World`].

mod broadphase;
mod contact;
mod narrowphase;
mod object;
mod solver;
mod world;

pub use broadphase::{DynamicTree, ProxyId};
pub use contact::Contact;
pub use narrowphase::{narrow_phase, ContactGeometry};
pub use object::{Collider, ObjectId, PhysicsObject};
pub use world::{World, MAX_STEP};
