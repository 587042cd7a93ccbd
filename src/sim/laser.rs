//! Laser beam tracing
//!
//! A beam is traced by repeatedly casting a ray against every line segment and
//! the four edges of every opaque rigid body, keeping the nearest hit.
//! Reflective lines mirror the ray; anything else absorbs it. Every struck
//! entity is flagged as activated for the current frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::components::{Components, EntityRef, Laser};
use crate::geometry::{LineSegment, inverse_unchecked, mat2_from_columns};
use crate::settings::Tuning;

/// One straight piece of a beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaserBeam {
    pub start: Vec2,
    pub end: Vec2,
    pub color: u32,
}

impl LaserBeam {
    pub fn direction(&self) -> Vec2 {
        (self.end - self.start).normalize_or_zero()
    }

    pub fn length(&self) -> f32 {
        (self.end - self.start).length()
    }
}

/// All beam segments emitted by one laser this frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeamPath {
    /// Index into the laser table
    pub laser: usize,
    pub segments: Vec<LaserBeam>,
}

/// Where a ray met a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Hit point, pulled back slightly toward the ray origin
    pub point: Vec2,
    /// Unit surface normal (sign unspecified)
    pub normal: Vec2,
    /// Ray parameter of the hit
    pub t: f32,
}

/// Intersect the ray `origin + t * direction` with `wall`.
///
/// Solves `start + s * wall_dir = origin + t * direction` as a 2x2 system. A hit
/// needs `s` in `[0, 1]` and `t > 0`; parallel walls produce non-finite
/// parameters and miss.
pub fn ray_segment(origin: Vec2, direction: Vec2, wall: &LineSegment, epsilon: f32) -> Option<RayHit> {
    let wall_dir = wall.direction();
    let st = inverse_unchecked(mat2_from_columns(wall_dir, -direction)) * (origin - wall.start);
    let (s, t) = (st.x, st.y);

    if !((0.0..=1.0).contains(&s) && t > 0.0) {
        return None;
    }

    let normal = Vec2::new(-wall_dir.y, wall_dir.x).normalize_or_zero();
    Some(RayHit {
        point: origin + t * direction - epsilon * direction.normalize_or_zero(),
        normal,
        t,
    })
}

/// Mirror `direction` about the unit `normal`
#[inline]
pub fn reflect(direction: Vec2, normal: Vec2) -> Vec2 {
    direction - 2.0 * direction.dot(normal) * normal
}

struct NearestHit {
    hit: RayHit,
    owner: EntityRef,
    reflective: bool,
}

fn nearest_hit(
    components: &Components,
    origin: Vec2,
    direction: Vec2,
    tuning: &Tuning,
) -> Option<NearestHit> {
    let mut best: Option<NearestHit> = None;
    let mut t_min = tuning.max_ray_distance;

    let mut consider = |wall: LineSegment, owner: EntityRef, reflective: bool| {
        if let Some(hit) = ray_segment(origin, direction, &wall, tuning.ray_epsilon) {
            if hit.t < t_min {
                t_min = hit.t;
                best = Some(NearestHit {
                    hit,
                    owner,
                    reflective,
                });
            }
        }
    };

    for line in &components.lines {
        consider(
            LineSegment::from_offset(line.start, line.offset),
            line.owner,
            line.reflective,
        );
    }

    for body in components.rigid_bodies.iter().filter(|b| !b.translucent) {
        for edge in body.rect().edges() {
            consider(edge, body.owner, false);
        }
    }

    best
}

/// Trace the beam of `laser` through the scene.
///
/// Returns at most `tuning.max_beams` segments. When the ray escapes without
/// hitting anything a final segment of `tuning.fallback_beam_length` is
/// emitted. Struck entities get `is_activated` set.
pub fn calculate_reflections(
    laser: &Laser,
    components: &mut Components,
    tuning: &Tuning,
) -> Vec<LaserBeam> {
    let cap = tuning.max_beams;
    let mut beams = Vec::with_capacity(cap);

    let mut origin = laser.position;
    let mut direction = laser.direction();
    let mut absorbed = false;

    while beams.len() < cap {
        let Some(nearest) = nearest_hit(components, origin, direction, tuning) else {
            break;
        };

        beams.push(LaserBeam {
            start: origin,
            end: nearest.hit.point,
            color: laser.color,
        });

        if let Some(entity) = components.entity_mut(nearest.owner) {
            entity.is_activated = true;
        }

        if nearest.reflective {
            origin = nearest.hit.point;
            direction = reflect(direction, nearest.hit.normal);
        } else {
            absorbed = true;
            break;
        }
    }

    if !absorbed && beams.len() < cap {
        beams.push(LaserBeam {
            start: origin,
            end: origin + tuning.fallback_beam_length * direction.normalize_or_zero(),
            color: laser.color,
        });
    }

    beams
}

/// Fire every enabled laser and record the resulting beam paths
pub fn update_lasers(components: &mut Components, tuning: &Tuning) {
    let mut paths = Vec::with_capacity(components.lasers.len());

    for index in 0..components.lasers.len() {
        let laser = components.lasers[index].clone();
        let enabled = laser
            .activated_by
            .is_none_or(|controller| components.was_activated(controller));
        if !enabled {
            continue;
        }

        let segments = calculate_reflections(&laser, components, tuning);
        paths.push(BeamPath {
            laser: index,
            segments,
        });
    }

    components.beams = paths;
}
