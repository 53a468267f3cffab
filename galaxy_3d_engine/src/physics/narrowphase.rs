//! Exact contact determination between two colliders.
//!
//! Circle-circle uses the closed-form distance test directly (stability
//! requirement for resting contacts). Every other pairing goes through
//! GJK to find a simplex enclosing the Minkowski difference's origin,
//! then EPA to extract the separating normal and penetration depth. The
//! support/simplex/triple-product helpers mirror `Physics::Support`,
//! `Physics::ContainsOrigin`, and `Physics::TripleProduct` from the
//! original engine's GJK/EPA scaffold; `ClosestEdge` becomes
//! [`closest_edge`].

use crate::math::Vector2;

use super::object::{Collider, PhysicsObject};

const GJK_MAX_ITERATIONS: u32 = 32;
const EPA_MAX_ITERATIONS: u32 = 32;
const EPA_TOLERANCE: f32 = 1e-4;

/// Output of a narrowphase dispatch: a separating normal (from `a` to `b`)
/// and the overlap depth along it.
#[derive(Debug, Clone, Copy)]
pub struct ContactGeometry {
    pub normal: Vector2,
    pub penetration: f32,
}

enum Shape<'a> {
    Circle { center: Vector2, radius: f32 },
    Polygon { vertices: &'a [Vector2] },
}

fn world_vertices(object: &PhysicsObject, scratch: &mut Vec<Vector2>) {
    if let Collider::Polygon { vertices } = &object.collider {
        let (sin, cos) = object.rotation.sin_cos();
        scratch.clear();
        scratch.extend(vertices.iter().map(|v| {
            Vector2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos) + object.position
        }));
    }
}

fn support_point(shape: &Shape, direction: Vector2) -> Vector2 {
    match shape {
        Shape::Circle { center, radius } => {
            if direction.length_squared() > 0.0 {
                *center + direction.normalize() * *radius
            } else {
                *center
            }
        }
        Shape::Polygon { vertices } => farthest_point(vertices, direction),
    }
}

fn farthest_point(shape: &[Vector2], direction: Vector2) -> Vector2 {
    let mut best = shape[0];
    let mut best_dot = best.dot(direction);
    for &v in &shape[1..] {
        let d = v.dot(direction);
        if d > best_dot {
            best_dot = d;
            best = v;
        }
    }
    best
}

fn minkowski_support(a: &Shape, b: &Shape, direction: Vector2) -> Vector2 {
    support_point(a, direction) - support_point(b, -direction)
}

/// `(a × b) × c`, expanded via the vector identity so it works in 2D
/// without a literal cross-product type.
fn triple_product(a: Vector2, b: Vector2, c: Vector2) -> Vector2 {
    b * a.dot(c) - a * b.dot(c)
}

/// Advances the simplex toward the origin. Returns `Some(new_direction)`
/// while still searching, `None` when it can prove no overlap exists, and
/// leaves `simplex.len() == 3` when the origin is enclosed.
fn contains_origin(simplex: &mut Vec<Vector2>, direction: &mut Vector2) -> bool {
    let a = *simplex.last().unwrap();
    let ao = -a;

    if simplex.len() == 3 {
        let b = simplex[1];
        let c = simplex[0];
        let ab = b - a;
        let ac = c - a;

        let ab_perp = triple_product(ac, ab, ab);
        let ac_perp = triple_product(ab, ac, ac);

        if ab_perp.dot(ao) > 0.0 {
            simplex.remove(0);
            *direction = ab_perp;
            false
        } else if ac_perp.dot(ao) > 0.0 {
            simplex.remove(1);
            *direction = ac_perp;
            false
        } else {
            true
        }
    } else {
        let b = simplex[0];
        let ab = b - a;
        *direction = triple_product(ab, ao, ab);
        if direction.length_squared() == 0.0 {
            // `ao` lies on `ab`; either perpendicular works.
            *direction = Vector2::new(ab.y, -ab.x);
        }
        false
    }
}

fn gjk(a: &Shape, b: &Shape) -> Option<Vec<Vector2>> {
    let mut direction = Vector2::new(1.0, 0.0);
    let mut simplex = vec![minkowski_support(a, b, direction)];
    direction = -simplex[0];

    for _ in 0..GJK_MAX_ITERATIONS {
        if direction.length_squared() == 0.0 {
            return Some(simplex);
        }
        let point = minkowski_support(a, b, direction);
        if point.dot(direction) < 0.0 {
            return None;
        }
        simplex.push(point);
        if contains_origin(&mut simplex, &mut direction) {
            return Some(simplex);
        }
    }
    None
}

struct Edge {
    normal: Vector2,
    distance: f32,
    index: usize,
}

fn closest_edge(polytope: &[Vector2]) -> Edge {
    let mut closest = Edge {
        normal: Vector2::ZERO,
        distance: f32::MAX,
        index: 0,
    };
    for i in 0..polytope.len() {
        let j = (i + 1) % polytope.len();
        let a = polytope[i];
        let b = polytope[j];
        let edge = b - a;
        let mut normal = Vector2::new(edge.y, -edge.x);
        if normal.length_squared() > 0.0 {
            normal = normal.normalize();
        }
        if normal.dot(a) < 0.0 {
            normal = -normal;
        }
        let distance = normal.dot(a);
        if distance < closest.distance {
            closest = Edge { normal, distance, index: j };
        }
    }
    closest
}

fn epa(a: &Shape, b: &Shape, simplex: Vec<Vector2>) -> Option<ContactGeometry> {
    let mut polytope = simplex;
    for _ in 0..EPA_MAX_ITERATIONS {
        let edge = closest_edge(&polytope);
        let point = minkowski_support(a, b, edge.normal);
        let d = point.dot(edge.normal);
        if d - edge.distance < EPA_TOLERANCE {
            return Some(ContactGeometry {
                normal: edge.normal,
                penetration: d,
            });
        }
        polytope.insert(edge.index, point);
    }
    None
}

fn circle_vs_circle(center_a: Vector2, radius_a: f32, center_b: Vector2, radius_b: f32) -> Option<ContactGeometry> {
    let delta = center_b - center_a;
    let dist_sq = delta.length_squared();
    let radius_sum = radius_a + radius_b;
    if dist_sq >= radius_sum * radius_sum {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-8 {
        delta / dist
    } else {
        Vector2::new(1.0, 0.0)
    };
    Some(ContactGeometry {
        normal,
        penetration: radius_sum - dist,
    })
}

/// Dispatches on `(a.collider, b.collider)`, returning a contact whose
/// normal points from `a` toward `b`, or `None` when they do not overlap.
pub fn narrow_phase(a: &PhysicsObject, b: &PhysicsObject) -> Option<ContactGeometry> {
    if let (Collider::Circle { radius: ra }, Collider::Circle { radius: rb }) = (&a.collider, &b.collider) {
        return circle_vs_circle(a.position, *ra, b.position, *rb);
    }

    let mut scratch_a = Vec::new();
    let mut scratch_b = Vec::new();
    world_vertices(a, &mut scratch_a);
    world_vertices(b, &mut scratch_b);

    let shape_a = match &a.collider {
        Collider::Circle { radius } => Shape::Circle { center: a.position, radius: *radius },
        Collider::Polygon { .. } => Shape::Polygon { vertices: &scratch_a },
    };
    let shape_b = match &b.collider {
        Collider::Circle { radius } => Shape::Circle { center: b.position, radius: *radius },
        Collider::Polygon { .. } => Shape::Polygon { vertices: &scratch_b },
    };

    let simplex = gjk(&shape_a, &shape_b)?;
    if simplex.len() < 3 {
        // Degenerate: GJK terminated on a line/point without enclosing the
        // origin. Treat as no contact rather than risk EPA on a bad seed.
        return None;
    }
    epa(&shape_a, &shape_b, simplex)
}

#[cfg(test)]
#[path = "narrowphase_tests.rs"]
mod tests;
