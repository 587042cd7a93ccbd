//! Rigid body integration and collision response
//!
//! Bodies carry no rotation. Each frame is split into a fixed number of
//! substeps; every substep integrates all bodies, then tests every unordered
//! pair once and resolves overlaps with a positional split plus a single
//! inelastic impulse along the contact normal.

use glam::Vec2;

use super::components::{BodyShape, RigidBody};
use crate::geometry::{Rect, rects_overlap};
use crate::settings::Tuning;

/// Result of a narrow-phase test between bodies A and B
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// Whether the bodies overlap
    pub hit: bool,
    /// Contact normal pointing from A toward B
    pub normal: Vec2,
    /// Overlap depth along `normal`
    pub penetration: f32,
}

impl Collision {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }

    fn hit(normal: Vec2, penetration: f32) -> Self {
        Self {
            hit: true,
            normal,
            penetration,
        }
    }

    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// Box against box. The normal is the side of least penetration, ties going
/// to the first candidate in the order -X, +X, -Y, +Y.
pub fn aabb_aabb(a: &Rect, b: &Rect) -> Collision {
    if !rects_overlap(a, b) {
        return Collision::miss();
    }

    let sides = [
        Vec2::new(-1.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, -1.0),
        Vec2::new(0.0, 1.0),
    ];
    let depths = [
        b.max.x - a.min.x,
        a.max.x - b.min.x,
        b.max.y - a.min.y,
        a.max.y - b.min.y,
    ];

    let mut best = 0;
    for i in 1..4 {
        if depths[i] < depths[best] {
            best = i;
        }
    }

    Collision::hit(sides[best], depths[best])
}

/// Box A against circle B
pub fn aabb_circle(a: &Rect, center: Vec2, radius: f32) -> Collision {
    let closest = center.clamp(a.min, a.max);
    let delta = center - closest;
    let dist_sq = delta.length_squared();

    if dist_sq >= radius * radius {
        return Collision::miss();
    }

    if dist_sq > 0.0 {
        let dist = dist_sq.sqrt();
        return Collision::hit(delta / dist, radius - dist);
    }

    // Centre inside the box: push out through the nearest face
    let faces = [
        (Vec2::new(-1.0, 0.0), center.x - a.min.x),
        (Vec2::new(1.0, 0.0), a.max.x - center.x),
        (Vec2::new(0.0, -1.0), center.y - a.min.y),
        (Vec2::new(0.0, 1.0), a.max.y - center.y),
    ];
    let mut best = faces[0];
    for face in &faces[1..] {
        if face.1 < best.1 {
            best = *face;
        }
    }
    Collision::hit(best.0, best.1 + radius)
}

/// Circle A against circle B
pub fn circle_circle(a_center: Vec2, a_radius: f32, b_center: Vec2, b_radius: f32) -> Collision {
    let delta = b_center - a_center;
    let reach = a_radius + b_radius;
    let dist_sq = delta.length_squared();

    if dist_sq >= reach * reach {
        return Collision::miss();
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > 0.0 { delta / dist } else { Vec2::Y };
    Collision::hit(normal, reach - dist)
}

/// Dispatch on the shape pair. The normal always points from `a` to `b`.
pub fn test_collision(a: &RigidBody, b: &RigidBody) -> Collision {
    match (a.shape, b.shape) {
        (BodyShape::Aabb, BodyShape::Aabb) => aabb_aabb(&a.rect(), &b.rect()),
        (BodyShape::Aabb, BodyShape::Circle) => aabb_circle(&a.rect(), b.pos, b.radius()),
        (BodyShape::Circle, BodyShape::Aabb) => aabb_circle(&b.rect(), a.pos, a.radius()).flipped(),
        (BodyShape::Circle, BodyShape::Circle) => {
            circle_circle(a.pos, a.radius(), b.pos, b.radius())
        }
    }
}

/// Separate two overlapping bodies and cancel their closing speed.
///
/// Pairs where both bodies are static are skipped outright.
pub fn resolve_collision(a: &mut RigidBody, b: &mut RigidBody, collision: &Collision) {
    let sum_inv_mass = a.inv_mass + b.inv_mass;
    if sum_inv_mass == 0.0 {
        return;
    }

    let correction = collision.normal * collision.penetration;
    a.pos -= correction * (a.inv_mass / sum_inv_mass);
    b.pos += correction * (b.inv_mass / sum_inv_mass);

    const RESTITUTION: f32 = 0.0;
    let closing = (b.vel - a.vel).dot(collision.normal);
    let j = -(1.0 + RESTITUTION) * closing / sum_inv_mass;
    let impulse = collision.normal * j;

    a.vel -= impulse * a.inv_mass;
    b.vel += impulse * b.inv_mass;
}

/// Advance all bodies by `dt`.
///
/// `controlled` indexes the body that receives `movement` as extra force.
pub fn physics_update(
    bodies: &mut [RigidBody],
    dt: f32,
    movement: Vec2,
    controlled: Option<usize>,
    tuning: &Tuning,
) {
    let substeps = tuning.substeps.max(1);
    let step = dt / substeps as f32;

    for _ in 0..substeps {
        for (index, body) in bodies.iter_mut().enumerate() {
            let mut force = tuning.gravity - tuning.linear_damping * body.vel;
            if controlled == Some(index) {
                force += tuning.move_accel * movement;
            }
            let accel = force * body.inv_mass;

            body.pos += step * body.vel + 0.5 * accel * step * step;
            body.vel += step * accel;
        }

        for index_a in 1..bodies.len() {
            let (lower, upper) = bodies.split_at_mut(index_a);
            let a = &mut upper[0];
            for b in lower.iter_mut() {
                if a.inv_mass + b.inv_mass == 0.0 {
                    continue;
                }
                let collision = test_collision(a, b);
                if collision.hit {
                    resolve_collision(a, b, &collision);
                }
            }
        }
    }
}
