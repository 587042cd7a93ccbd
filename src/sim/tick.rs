//! Per-frame simulation step
//!
//! Order within a frame:
//! 1. latch last frame's laser hits (`is_activated` -> `was_activated`)
//! 2. morph controlled shapes toward their activated/unactivated target
//! 3. apply jump, then integrate and collide all bodies
//! 4. move attached entities onto their anchors
//! 5. trace lasers, flagging struck entities for the next frame
//!
//! A hit in frame T is therefore seen by dependents from frame T+1.

use glam::Vec2;

use super::components::{Components, EntityRef};
use super::laser::update_lasers;
use super::map::Map;
use super::physics::physics_update;
use crate::settings::Tuning;

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement axis, clamped to unit length
    pub movement: Vec2,
    /// Jump pressed this frame (edge, not held)
    pub jump: bool,
}

/// What happened during a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Player reached a goal region
    pub level_completed: bool,
}

/// Move every entity's activation flag into its latch and clear it
pub fn latch_activation(components: &mut Components) {
    let entities = components
        .entities
        .iter_mut()
        .chain(std::iter::once(&mut components.player));
    for entity in entities {
        entity.was_activated = entity.is_activated;
        entity.is_activated = false;
    }
}

/// Interpolate controlled shapes toward the target chosen by their controller
pub fn interpolate_activation(components: &mut Components, dt: f32, tuning: &Tuning) {
    let t = (dt * tuning.activation_speed).clamp(0.0, 1.0);

    for index in 0..components.entities.len() {
        let Some(activation) = components.entities[index].activation else {
            continue;
        };
        let owner = EntityRef::Element(index);
        let Some(current) = components.shape_of(owner) else {
            continue;
        };

        let active = components.was_activated(activation.by);
        let next = current.lerp_toward(activation.target(active), t);
        components.apply_shape(owner, &next);
    }
}

/// Place every attached entity at its anchor plus offset
pub fn propagate_attachments(components: &mut Components) {
    for i in 0..components.attachments.len() {
        let attachment = components.attachments[i];
        let Some(anchor) = components.anchor(attachment.attached_to.into()) else {
            continue;
        };
        components.set_anchor(attachment.entity.into(), anchor + attachment.offset);
    }
}

/// Advance the map by one frame of `dt` seconds
pub fn tick(map: &mut Map, input: &TickInput, dt: f32, tuning: &Tuning) -> FrameReport {
    let components = &mut map.components;

    latch_activation(components);
    interpolate_activation(components, dt, tuning);

    let controlled = components.player.rigid_body;
    if input.jump {
        if let Some(player) = components.player_body_mut() {
            player.vel.y = tuning.jump_speed;
        }
    }

    let movement = input.movement.clamp_length_max(1.0);
    physics_update(&mut components.rigid_bodies, dt, movement, controlled, tuning);

    propagate_attachments(components);
    update_lasers(components, tuning);

    FrameReport {
        level_completed: map.player_reached_goal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_DT;
    use crate::sim::element::{ElementId, ElementKind, MapElement, Shape};

    /// Laser pointing at a receiver, and a door the receiver controls
    fn door_map() -> (Map, ElementId, ElementId) {
        let mut map = Map::new();
        let mut laser = MapElement::with_defaults(ElementKind::Laser, Vec2::new(0.1, 0.5));
        laser.angle = 0.0;
        map.add_element(laser);
        let receiver = map.add_default(ElementKind::Receiver, Vec2::new(0.4, 0.5));
        let door = map.add_default(ElementKind::Rectangle, Vec2::new(0.8, 0.1));
        map.set_controller(door, Some(receiver));
        *map.editable_shape_mut(door, true).unwrap() = Shape::PointSize {
            position: Vec2::new(0.8, 0.4),
            size: Vec2::splat(0.04),
        };
        (map, receiver, door)
    }

    fn door_pos(map: &Map, door: ElementId) -> Vec2 {
        let c = &map.components;
        c.rigid_bodies[c.entities[door.index()].rigid_body.unwrap()].pos
    }

    #[test]
    fn test_activation_has_one_frame_latency() {
        let tuning = Tuning::default();
        let (mut map, receiver, door) = door_map();
        map.rebuild(&tuning);
        let start = door_pos(&map, door);

        // Frame T: beam strikes the receiver, door has not reacted yet
        tick(&mut map, &TickInput::default(), DEFAULT_DT, &tuning);
        assert!(map.components.entities[receiver.index()].is_activated);
        assert!(!map.components.entities[receiver.index()].was_activated);
        assert!((door_pos(&map, door) - start).length() < 1e-6);

        // Frame T+1: door starts moving toward its activated shape
        tick(&mut map, &TickInput::default(), DEFAULT_DT, &tuning);
        assert!(map.components.entities[receiver.index()].was_activated);
        let moved = door_pos(&map, door);
        assert!(moved.y > start.y);
        assert!(moved.y < 0.4);
    }

    #[test]
    fn test_door_converges_on_target() {
        let tuning = Tuning::default();
        let (mut map, _, door) = door_map();
        map.rebuild(&tuning);
        for _ in 0..600 {
            tick(&mut map, &TickInput::default(), DEFAULT_DT, &tuning);
        }
        assert!((door_pos(&map, door) - Vec2::new(0.8, 0.4)).length() < 1e-3);
    }

    #[test]
    fn test_attached_line_follows_box() {
        let tuning = Tuning::default();
        let mut map = Map::new();
        let floor = map.add_element(MapElement::new(
            ElementKind::Rectangle,
            Vec2::new(0.5, 0.05),
            Vec2::new(1.0, 0.1),
            0xFFFFFFFF,
        ));
        let crate_id = map.add_default(ElementKind::Box, Vec2::new(0.2, 0.3));
        let mirror = map.add_default(ElementKind::Reflector, Vec2::new(0.25, 0.35));
        map.attach(mirror, crate_id);
        map.rebuild(&tuning);
        assert!(map.element(floor).is_some());

        for _ in 0..120 {
            tick(&mut map, &TickInput::default(), DEFAULT_DT, &tuning);
        }

        let c = &map.components;
        let body = &c.rigid_bodies[c.entities[crate_id.index()].rigid_body.unwrap()];
        let line = &c.lines[c.entities[mirror.index()].line.unwrap()];
        assert!(body.pos.y < 0.3);
        assert!((line.start - (body.pos + Vec2::new(0.05, 0.05))).length() < 1e-5);
    }

    #[test]
    fn test_controlled_goal_moves_under_player() {
        let mut tuning = Tuning::default();
        tuning.gravity = Vec2::ZERO;
        let (mut map, receiver, _) = door_map();
        let goal = map.add_default(ElementKind::Goal, Vec2::new(0.9, 0.1));
        map.set_controller(goal, Some(receiver));
        *map.editable_shape_mut(goal, true).unwrap() = Shape::PointSize {
            position: tuning.player_spawn,
            size: Vec2::splat(0.04),
        };
        map.rebuild(&tuning);

        assert!(!tick(&mut map, &TickInput::default(), DEFAULT_DT, &tuning).level_completed);
        let mut reached = false;
        for _ in 0..600 {
            reached |= tick(&mut map, &TickInput::default(), DEFAULT_DT, &tuning).level_completed;
        }
        assert!(reached);
        // The authored shape is untouched
        assert_eq!(map.element(goal).unwrap().shape.anchor(), Vec2::new(0.9, 0.1));
    }

    #[test]
    fn test_attached_goal_follows_box() {
        let tuning = Tuning::default();
        let mut map = Map::new();
        let crate_id = map.add_default(ElementKind::Box, Vec2::new(0.2, 0.3));
        let goal = map.add_default(ElementKind::Goal, Vec2::new(0.2, 0.4));
        map.attach(goal, crate_id);
        map.rebuild(&tuning);

        for _ in 0..30 {
            tick(&mut map, &TickInput::default(), DEFAULT_DT, &tuning);
        }

        let c = &map.components;
        let body = &c.rigid_bodies[c.entities[crate_id.index()].rigid_body.unwrap()];
        let g = &c.goals[c.entities[goal.index()].goal.unwrap()];
        assert!(body.pos.y < 0.3);
        assert!((g.position - (body.pos + Vec2::new(0.0, 0.1))).length() < 1e-5);
    }

    #[test]
    fn test_jump_sets_vertical_speed() {
        let mut tuning = Tuning::default();
        tuning.gravity = Vec2::ZERO;
        tuning.linear_damping = 0.0;
        let mut map = Map::new();
        map.rebuild(&tuning);

        let input = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut map, &input, DEFAULT_DT, &tuning);
        let player = map.components.player_body().unwrap();
        assert!((player.vel.y - tuning.jump_speed).abs() < 1e-6);
        assert!(player.pos.y > tuning.player_spawn.y);
    }

    #[test]
    fn test_movement_is_clamped() {
        let mut tuning = Tuning::default();
        tuning.gravity = Vec2::ZERO;
        let mut a = Map::new();
        let mut b = Map::new();
        a.rebuild(&tuning);
        b.rebuild(&tuning);

        let unit = TickInput {
            movement: Vec2::X,
            ..Default::default()
        };
        let huge = TickInput {
            movement: Vec2::new(50.0, 0.0),
            ..Default::default()
        };
        tick(&mut a, &unit, DEFAULT_DT, &tuning);
        tick(&mut b, &huge, DEFAULT_DT, &tuning);
        let (pa, pb) = (
            a.components.player_body().unwrap().pos,
            b.components.player_body().unwrap().pos,
        );
        assert!((pa - pb).length() < 1e-6);
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let (mut map1, _, _) = door_map();
        let (mut map2, _, _) = door_map();
        map1.rebuild(&tuning);
        map2.rebuild(&tuning);

        let inputs = [
            TickInput {
                movement: Vec2::new(0.5, 0.0),
                ..Default::default()
            },
            TickInput {
                jump: true,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for input in &inputs {
            tick(&mut map1, input, DEFAULT_DT, &tuning);
            tick(&mut map2, input, DEFAULT_DT, &tuning);
        }

        for (a, b) in map1
            .components
            .rigid_bodies
            .iter()
            .zip(&map2.components.rigid_bodies)
        {
            assert_eq!(a.pos, b.pos);
            assert_eq!(a.vel, b.vel);
        }
    }
}
