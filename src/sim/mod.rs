//! Deterministic simulation module
//!
//! All level logic lives here. This module must stay pure and single-threaded:
//! - Caller-supplied frame time, fixed substeps inside
//! - Stable iteration order (table order everywhere)
//! - No rendering, storage or platform dependencies

pub mod components;
pub mod element;
pub mod laser;
pub mod map;
pub mod physics;
pub mod tick;

pub use components::{
    Activation, Attachment, BodyShape, Components, Entity, EntityRef, Goal, Laser, Line, RigidBody,
};
pub use element::{ElementId, ElementKind, MapElement, Shape};
pub use laser::{BeamPath, LaserBeam, calculate_reflections, ray_segment, reflect, update_lasers};
pub use map::{Map, snap_to_grid};
pub use physics::{Collision, physics_update, resolve_collision, test_collision};
pub use tick::{FrameReport, TickInput, tick};
