//! Impulse resolution for a single contact: normal impulse with
//! restitution, Baumgarte positional correction, and a Coulomb friction
//! cone — grounded on `Physics::ResolveCollision`.

use crate::math::Vector2;

use super::contact::Contact;
use super::object::PhysicsObject;

/// Fraction of penetration corrected per solve (rest is left to the next
/// frame's contact, avoiding jitter from a full-strength correction).
const BAUMGARTE: f32 = 0.2;
/// Penetration below this is left uncorrected ("slop"), standard practice
/// to avoid objects jittering apart from restitution-free resting contact.
const PENETRATION_SLOP: f32 = 0.01;

/// Applies equal-and-opposite impulses to `a` and `b` and writes a
/// positional correction directly into their positions.
pub fn resolve(contact: &Contact, a: &mut PhysicsObject, b: &mut PhysicsObject) {
    let inv_mass_sum = a.mass_inv + b.mass_inv;
    if inv_mass_sum == 0.0 {
        return;
    }

    let relative_velocity = b.velocity - a.velocity;
    let velocity_along_normal = relative_velocity.dot(contact.normal);

    if velocity_along_normal <= 0.0 {
        let restitution = contact.restitution.min(a.restitution.max(b.restitution));
        let j = -(1.0 + restitution) * velocity_along_normal / inv_mass_sum;
        let impulse = contact.normal * j;

        a.velocity -= impulse * a.mass_inv;
        b.velocity += impulse * b.mass_inv;

        let relative_velocity = b.velocity - a.velocity;
        let tangent = {
            let t = relative_velocity - contact.normal * relative_velocity.dot(contact.normal);
            if t.length_squared() > 1e-8 {
                t.normalize()
            } else {
                Vector2::ZERO
            }
        };
        if tangent != Vector2::ZERO {
            let jt = -relative_velocity.dot(tangent) / inv_mass_sum;
            let mu = (a.friction * b.friction).sqrt();
            let friction_impulse = tangent * jt.clamp(-j * mu, j * mu);
            a.velocity -= friction_impulse * a.mass_inv;
            b.velocity += friction_impulse * b.mass_inv;
        }
    }

    let correction_magnitude =
        (contact.penetration - PENETRATION_SLOP).max(0.0) / inv_mass_sum * BAUMGARTE;
    let correction = contact.normal * correction_magnitude;
    a.position -= correction * a.mass_inv;
    b.position += correction * b.mass_inv;
}

#[cfg(test)]
#[path = "solver_tests.rs"]
mod tests;
