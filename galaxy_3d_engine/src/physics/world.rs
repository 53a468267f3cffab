//! Per-frame orchestration: integrate, move proxies, generate broadphase
//! pairs, narrowphase, solve, commit — grounded on `Physics::Update` /
//! `ContactManager::FindNewContacts` / `Physics::ResolveCollision`.

use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::math::Vector2;

use super::broadphase::DynamicTree;
use super::contact::Contact;
use super::narrowphase::narrow_phase;
use super::object::{ObjectId, PhysicsObject};
use super::solver;

/// Caps the physics step so a stalled frame doesn't explode the simulation
/// ("catch-up" cap from the main-loop contract).
pub const MAX_STEP: f32 = 0.1;

pub struct World {
    objects: SlotMap<ObjectId, PhysicsObject>,
    tree: DynamicTree<ObjectId>,
    pub gravity: Vector2,
    last_contacts: Vec<Contact>,
}

impl World {
    pub fn new(gravity: Vector2) -> Self {
        Self {
            objects: SlotMap::with_key(),
            tree: DynamicTree::new(),
            gravity,
            last_contacts: Vec::new(),
        }
    }

    pub fn insert(&mut self, object: PhysicsObject) -> ObjectId {
        let id = self.objects.insert(object);
        let proxy = self.tree.create_proxy(self.objects[id].world_box(), id);
        self.objects[id].proxy_id = Some(proxy);
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<PhysicsObject> {
        let object = self.objects.remove(id)?;
        if let Some(proxy) = object.proxy_id {
            self.tree.destroy_proxy(proxy);
        }
        Some(object)
    }

    pub fn get(&self, id: ObjectId) -> Option<&PhysicsObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut PhysicsObject> {
        self.objects.get_mut(id)
    }

    pub fn last_contacts(&self) -> &[Contact] {
        &self.last_contacts
    }

    /// Runs one physics step: integrate, move proxies, generate pairs,
    /// narrowphase, resolve. Writeback happens directly on the objects as
    /// each stage runs — there is no separate transform to commit into.
    pub fn step(&mut self, dt: f32) {
        let dt = dt.min(MAX_STEP);
        self.integrate(dt);
        self.move_proxies(dt);

        let pairs = self.tree.generate_pairs();
        let mut seen: FxHashSet<(ObjectId, ObjectId)> = FxHashSet::default();
        self.last_contacts.clear();

        for (proxy_a, proxy_b) in pairs {
            let Some(&id_a) = self.tree.object(proxy_a) else { continue };
            let Some(&id_b) = self.tree.object(proxy_b) else { continue };
            if id_a == id_b || seen.contains(&(id_a, id_b)) || seen.contains(&(id_b, id_a)) {
                continue;
            }
            seen.insert((id_a, id_b));

            let (Some(obj_a), Some(obj_b)) = (self.objects.get(id_a), self.objects.get(id_b)) else {
                continue;
            };
            if obj_a.kinematic && obj_b.kinematic {
                continue;
            }
            if obj_a.layer_mask & obj_b.layer_mask == 0 {
                continue;
            }

            if let Some(geometry) = narrow_phase(obj_a, obj_b) {
                let contact = Contact {
                    a: id_a,
                    b: id_b,
                    normal: geometry.normal,
                    penetration: geometry.penetration,
                    restitution: obj_a.restitution.max(obj_b.restitution),
                    friction: (obj_a.friction * obj_b.friction).sqrt(),
                };
                self.resolve(&contact);
                self.last_contacts.push(contact);
            }
        }
    }

    fn integrate(&mut self, dt: f32) {
        for (_, object) in self.objects.iter_mut() {
            if object.kinematic {
                continue;
            }
            object.prev_position = object.position;
            object.prev_rotation = object.rotation;

            let drag_force = -object.velocity * object.drag;
            let acceleration = self.gravity * object.gravity_scale + (object.force + drag_force) * object.mass_inv;
            object.velocity += acceleration * dt;

            if !object.freeze_rotation {
                let angular_drag = -object.angular_velocity * object.angular_drag;
                object.angular_velocity += (object.torque * object.inertia_inv + angular_drag) * dt;
            }

            object.position += object.velocity * dt;
            object.rotation += object.angular_velocity * dt;

            object.force = Vector2::ZERO;
            object.torque = 0.0;
        }
    }

    fn move_proxies(&mut self, dt: f32) {
        for (_, object) in self.objects.iter() {
            let Some(proxy) = object.proxy_id else { continue };
            let displacement = object.velocity * dt;
            self.tree.move_proxy(proxy, object.world_box(), displacement);
        }
    }

    /// Resolves one contact by operating on detached clones, then writing
    /// the results back — avoids needing two simultaneous mutable
    /// borrows out of the same slot map.
    fn resolve(&mut self, contact: &Contact) {
        if contact.a == contact.b {
            return;
        }
        let (Some(mut a), Some(mut b)) = (
            self.objects.get(contact.a).cloned(),
            self.objects.get(contact.b).cloned(),
        ) else {
            return;
        };
        solver::resolve(contact, &mut a, &mut b);
        self.objects[contact.a] = a;
        self.objects[contact.b] = b;
    }
}

#[cfg(test)]
#[path = "world_tests.rs"]
mod tests;
