//! 2D physics body: transform, motion state, and collider.

use crate::math::{Box, Vector2};

use super::broadphase::ProxyId;

slotmap::new_key_type! {
    /// Stable handle to a [`PhysicsObject`] owned by a [`super::World`].
    pub struct ObjectId;
}

/// A collision shape attached to a [`PhysicsObject`], in the body's local space.
#[derive(Debug, Clone)]
pub enum Collider {
    Circle { radius: f32 },
    Polygon { vertices: Vec<Vector2> },
}

impl Collider {
    /// The world-space AABB of this collider at `position`/`rotation`.
    pub fn world_box(&self, position: Vector2, rotation: f32) -> Box {
        match self {
            Collider::Circle { radius } => Box::new(
                position.x - radius,
                position.x + radius,
                position.y - radius,
                position.y + radius,
            ),
            Collider::Polygon { vertices } => {
                let (sin, cos) = rotation.sin_cos();
                let mut b = Box::empty();
                for v in vertices {
                    let rotated = Vector2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos) + position;
                    b = b.combine(&Box::new(rotated.x, rotated.x, rotated.y, rotated.y));
                }
                b
            }
        }
    }

    pub fn area(&self) -> f32 {
        match self {
            Collider::Circle { radius } => std::f32::consts::PI * radius * radius,
            Collider::Polygon { vertices } => {
                let mut sum = 0.0;
                for i in 0..vertices.len() {
                    let a = vertices[i];
                    let b = vertices[(i + 1) % vertices.len()];
                    sum += a.x * b.y - b.x * a.y;
                }
                (sum * 0.5).abs()
            }
        }
    }
}

/// A 2D rigid body tracked by the physics world.
#[derive(Debug, Clone)]
pub struct PhysicsObject {
    pub proxy_id: Option<ProxyId>,
    pub collider: Collider,
    pub position: Vector2,
    pub rotation: f32,
    pub prev_position: Vector2,
    pub prev_rotation: f32,
    pub velocity: Vector2,
    pub angular_velocity: f32,
    pub force: Vector2,
    pub torque: f32,
    pub mass: f32,
    pub mass_inv: f32,
    pub inertia: f32,
    pub inertia_inv: f32,
    pub friction: f32,
    pub restitution: f32,
    pub gravity_scale: f32,
    pub drag: f32,
    pub angular_drag: f32,
    pub area: f32,
    pub layer_mask: u32,
    pub kinematic: bool,
    pub freeze_rotation: bool,
    pub grounded: bool,
}

impl PhysicsObject {
    pub fn new(collider: Collider, position: Vector2, mass: f32, kinematic: bool) -> Self {
        let area = collider.area();
        let (mass_inv, inertia, inertia_inv) = if kinematic || mass <= 0.0 {
            (0.0, 0.0, 0.0)
        } else {
            let inertia = mass * area / std::f32::consts::PI;
            (1.0 / mass, inertia, 1.0 / inertia)
        };
        Self {
            proxy_id: None,
            collider,
            position,
            rotation: 0.0,
            prev_position: position,
            prev_rotation: 0.0,
            velocity: Vector2::ZERO,
            angular_velocity: 0.0,
            force: Vector2::ZERO,
            torque: 0.0,
            mass,
            mass_inv,
            inertia,
            inertia_inv,
            friction: 0.3,
            restitution: 0.0,
            gravity_scale: 1.0,
            drag: 0.0,
            angular_drag: 0.0,
            area,
            layer_mask: u32::MAX,
            kinematic,
            freeze_rotation: false,
            grounded: false,
        }
    }

    pub fn world_box(&self) -> Box {
        self.collider.world_box(self.position, self.rotation)
    }
}

#[cfg(test)]
#[path = "object_tests.rs"]
mod tests;
