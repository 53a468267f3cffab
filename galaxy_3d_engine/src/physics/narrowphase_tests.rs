use super::*;
use crate::math::Vector2;
use crate::physics::object::{Collider, PhysicsObject};

fn circle(position: Vector2, radius: f32) -> PhysicsObject {
    PhysicsObject::new(Collider::Circle { radius }, position, 1.0, false)
}

fn square(position: Vector2, half: f32) -> PhysicsObject {
    let vertices = vec![
        Vector2::new(-half, -half),
        Vector2::new(half, -half),
        Vector2::new(half, half),
        Vector2::new(-half, half),
    ];
    PhysicsObject::new(Collider::Polygon { vertices }, position, 1.0, false)
}

#[test]
fn circle_circle_overlapping_reports_normal_and_penetration() {
    let a = circle(Vector2::new(0.0, 0.0), 1.0);
    let b = circle(Vector2::new(1.5, 0.0), 1.0);
    let contact = narrow_phase(&a, &b).expect("expected overlap");
    assert!((contact.normal - Vector2::new(1.0, 0.0)).length() < 1e-5);
    assert!((contact.penetration - 0.5).abs() < 1e-5);
}

#[test]
fn circle_circle_separated_reports_no_contact() {
    let a = circle(Vector2::new(0.0, 0.0), 1.0);
    let b = circle(Vector2::new(2.0, 0.0), 1.0);
    assert!(narrow_phase(&a, &b).is_none());
}

#[test]
fn overlapping_squares_report_positive_penetration() {
    let a = square(Vector2::new(0.0, 0.0), 0.5);
    let b = square(Vector2::new(0.8, 0.0), 0.5);
    let contact = narrow_phase(&a, &b).expect("expected overlap");
    assert!(contact.penetration > 0.0);
}

#[test]
fn separated_squares_report_no_contact() {
    let a = square(Vector2::new(0.0, 0.0), 0.5);
    let b = square(Vector2::new(5.0, 0.0), 0.5);
    assert!(narrow_phase(&a, &b).is_none());
}

#[test]
fn circle_vs_polygon_detects_overlap() {
    let a = circle(Vector2::new(0.0, 0.0), 1.0);
    let b = square(Vector2::new(1.2, 0.0), 0.5);
    let contact = narrow_phase(&a, &b).expect("expected overlap");
    assert!(contact.penetration > 0.0);
}
