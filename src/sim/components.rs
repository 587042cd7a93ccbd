//! Simulation components derived from a map's element table
//!
//! Components are never edited or persisted on their own. Whenever the element
//! list changes meaningfully (editor closed, map loaded, map switched) the
//! whole set is thrown away and rebuilt by [`Components::build`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::element::{ElementId, ElementKind, MapElement, Shape};
use super::laser::BeamPath;
use crate::geometry::{Rect, point_in_rect};
use crate::settings::Tuning;

/// Who owns a component: the player or the element at a table index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Player,
    Element(usize),
}

impl From<ElementId> for EntityRef {
    fn from(id: ElementId) -> Self {
        EntityRef::Element(id.index())
    }
}

/// Collision shape of a rigid body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyShape {
    #[default]
    Aabb,
    Circle,
}

/// A body taking part in physics and occluding lasers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBody {
    pub owner: EntityRef,
    pub shape: BodyShape,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Full extents; circles use `size.x` as diameter
    pub size: Vec2,
    /// Zero means static
    pub inv_mass: f32,
    pub color: u32,
    /// Translucent bodies (windows) let laser light through
    pub translucent: bool,
}

impl RigidBody {
    pub fn new(owner: EntityRef, shape: BodyShape, pos: Vec2, size: Vec2, inv_mass: f32) -> Self {
        Self {
            owner,
            shape,
            pos,
            vel: Vec2::ZERO,
            size,
            inv_mass,
            color: 0xFFFFFFFF,
            translucent: false,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.pos, self.size)
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        0.5 * self.size.x
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }
}

/// A wall segment, optionally mirrored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub owner: EntityRef,
    pub start: Vec2,
    pub offset: Vec2,
    pub reflective: bool,
    pub color: u32,
}

impl Line {
    #[inline]
    pub fn end(&self) -> Vec2 {
        self.start + self.offset
    }
}

/// A laser emitter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    pub owner: EntityRef,
    pub position: Vec2,
    /// Emitter marker extents
    pub size: Vec2,
    /// Direction in turns
    pub angle: f32,
    pub color: u32,
    /// When set, the laser only fires while this controller is activated
    pub activated_by: Option<ElementId>,
}

impl Laser {
    /// Unit direction of the emitted ray
    pub fn direction(&self) -> Vec2 {
        let radians = self.angle * std::f32::consts::TAU;
        Vec2::new(radians.cos(), radians.sin())
    }
}

/// Region the player must reach to finish the level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub owner: EntityRef,
    pub position: Vec2,
    pub size: Vec2,
}

impl Goal {
    /// Whether a body of `body_size` centred at `point` counts as inside
    pub fn contains(&self, point: Vec2, body_size: Vec2) -> bool {
        point_in_rect(&Rect::from_center_size(self.position, self.size + body_size), point)
    }
}

/// Rigid positional link from one entity to another
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub entity: ElementId,
    pub attached_to: ElementId,
    pub offset: Vec2,
}

/// Shape targets an element morphs between, selected by its controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    pub by: ElementId,
    pub activated: Shape,
    pub unactivated: Shape,
}

impl Activation {
    pub fn target(&self, active: bool) -> &Shape {
        if active { &self.activated } else { &self.unactivated }
    }
}

/// Simulation-facing record for one element (or the player)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entity {
    pub kind: ElementKind,
    pub rigid_body: Option<usize>,
    pub line: Option<usize>,
    pub laser: Option<usize>,
    pub goal: Option<usize>,
    pub activation: Option<Activation>,
    /// Activation latched at the top of the frame
    pub was_activated: bool,
    /// Set by laser hits during the current frame
    pub is_activated: bool,
}

/// All derived component tables of a map
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    pub player: Entity,
    /// Index-aligned with the element table
    pub entities: Vec<Entity>,
    pub rigid_bodies: Vec<RigidBody>,
    pub lines: Vec<Line>,
    pub lasers: Vec<Laser>,
    pub goals: Vec<Goal>,
    pub attachments: Vec<Attachment>,
    /// Beam paths produced by the most recent frame
    #[serde(skip)]
    pub beams: Vec<BeamPath>,
}

impl Components {
    /// Rebuild every component from scratch
    pub fn build(elements: &[MapElement], tuning: &Tuning) -> Self {
        let capacity = elements.len() + 1;
        let mut out = Self {
            player: Entity::default(),
            entities: Vec::with_capacity(elements.len()),
            rigid_bodies: Vec::with_capacity(capacity),
            lines: Vec::with_capacity(capacity),
            lasers: Vec::with_capacity(capacity),
            goals: Vec::new(),
            attachments: Vec::new(),
            beams: Vec::new(),
        };

        let mut player_body = RigidBody::new(
            EntityRef::Player,
            BodyShape::Aabb,
            tuning.clamped_spawn(),
            tuning.player_size,
            1.0,
        );
        player_body.color = 0xFFC0C0C0;
        out.player.rigid_body = Some(out.rigid_bodies.len());
        out.rigid_bodies.push(player_body);

        for (index, element) in elements.iter().enumerate() {
            let owner = EntityRef::Element(index);
            let mut entity = Entity {
                kind: element.kind,
                ..Default::default()
            };

            if let Some(by) = element.activated_by {
                if is_live(elements, by) {
                    entity.activation = Some(Activation {
                        by,
                        activated: element.activated_shape,
                        unactivated: element.unactivated_shape,
                    });
                } else {
                    log::warn!(
                        "element {} is controlled by missing element {}, ignoring",
                        index,
                        by.raw()
                    );
                }
            }

            let (e1, e2) = element.shape.pair();
            match element.kind {
                ElementKind::Box | ElementKind::Circle => {
                    let shape = if element.kind == ElementKind::Circle {
                        BodyShape::Circle
                    } else {
                        BodyShape::Aabb
                    };
                    let mut body = RigidBody::new(owner, shape, e1, e2, 1.0);
                    body.color = element.color;
                    entity.rigid_body = Some(out.rigid_bodies.len());
                    out.rigid_bodies.push(body);
                }
                ElementKind::Rectangle | ElementKind::Window | ElementKind::Receiver => {
                    let mut body = RigidBody::new(owner, BodyShape::Aabb, e1, e2, 0.0);
                    body.color = element.color;
                    body.translucent = element.kind == ElementKind::Window;
                    entity.rigid_body = Some(out.rigid_bodies.len());
                    out.rigid_bodies.push(body);
                }
                ElementKind::Reflector | ElementKind::Line => {
                    entity.line = Some(out.lines.len());
                    out.lines.push(Line {
                        owner,
                        start: e1,
                        offset: e2,
                        reflective: element.kind == ElementKind::Reflector,
                        color: element.color,
                    });
                }
                ElementKind::Laser => {
                    entity.laser = Some(out.lasers.len());
                    // A missing controller keeps the laser gated; it reads as never activated
                    out.lasers.push(Laser {
                        owner,
                        position: e1,
                        size: e2,
                        angle: element.angle,
                        color: element.color,
                        activated_by: element.activated_by,
                    });
                }
                ElementKind::Goal => {
                    entity.goal = Some(out.goals.len());
                    out.goals.push(Goal {
                        owner,
                        position: e1,
                        size: e2,
                    });
                }
                ElementKind::Null => {}
            }

            if let (Some(attached_to), Some(entity_id)) =
                (element.attached_to, ElementId::new(index as u32))
            {
                if is_live(elements, attached_to) && attached_to != entity_id {
                    out.attachments.push(Attachment {
                        entity: entity_id,
                        attached_to,
                        offset: element.attachment_offset,
                    });
                } else {
                    log::warn!(
                        "element {} is attached to missing element {}, ignoring",
                        index,
                        attached_to.raw()
                    );
                }
            }

            out.entities.push(entity);
        }

        log::debug!(
            "built components: {} bodies, {} lines, {} lasers, {} goals, {} attachments",
            out.rigid_bodies.len(),
            out.lines.len(),
            out.lasers.len(),
            out.goals.len(),
            out.attachments.len()
        );

        out
    }

    pub fn entity(&self, r: EntityRef) -> Option<&Entity> {
        match r {
            EntityRef::Player => Some(&self.player),
            EntityRef::Element(index) => self.entities.get(index),
        }
    }

    pub fn entity_mut(&mut self, r: EntityRef) -> Option<&mut Entity> {
        match r {
            EntityRef::Player => Some(&mut self.player),
            EntityRef::Element(index) => self.entities.get_mut(index),
        }
    }

    /// Whether `controller` was struck by a beam last frame. Dangling references read as inactive.
    pub fn was_activated(&self, controller: ElementId) -> bool {
        self.entities
            .get(controller.index())
            .is_some_and(|e| e.was_activated)
    }

    /// Rigid body of the player
    pub fn player_body(&self) -> Option<&RigidBody> {
        self.player.rigid_body.and_then(|i| self.rigid_bodies.get(i))
    }

    pub fn player_body_mut(&mut self) -> Option<&mut RigidBody> {
        self.player
            .rigid_body
            .and_then(|i| self.rigid_bodies.get_mut(i))
    }

    /// Current anchor point of whatever component `r` owns
    pub fn anchor(&self, r: EntityRef) -> Option<Vec2> {
        let entity = self.entity(r)?;
        if let Some(i) = entity.rigid_body {
            return self.rigid_bodies.get(i).map(|b| b.pos);
        }
        if let Some(i) = entity.line {
            return self.lines.get(i).map(|l| l.start);
        }
        if let Some(i) = entity.laser {
            return self.lasers.get(i).map(|l| l.position);
        }
        if let Some(i) = entity.goal {
            return self.goals.get(i).map(|g| g.position);
        }
        None
    }

    /// Move whatever component `r` owns so its anchor sits at `anchor`
    pub fn set_anchor(&mut self, r: EntityRef, anchor: Vec2) {
        let Some(entity) = self.entity(r) else {
            return;
        };
        let (body, line, laser, goal) = (entity.rigid_body, entity.line, entity.laser, entity.goal);
        if let Some(b) = body.and_then(|i| self.rigid_bodies.get_mut(i)) {
            b.pos = anchor;
        }
        if let Some(l) = line.and_then(|i| self.lines.get_mut(i)) {
            l.start = anchor;
        }
        if let Some(l) = laser.and_then(|i| self.lasers.get_mut(i)) {
            l.position = anchor;
        }
        if let Some(g) = goal.and_then(|i| self.goals.get_mut(i)) {
            g.position = anchor;
        }
    }

    /// Current shape of the component `r` owns, in the element's shape form
    pub fn shape_of(&self, r: EntityRef) -> Option<Shape> {
        let entity = self.entity(r)?;
        if let Some(b) = entity.rigid_body.and_then(|i| self.rigid_bodies.get(i)) {
            return Some(Shape::PointSize {
                position: b.pos,
                size: b.size,
            });
        }
        if let Some(l) = entity.line.and_then(|i| self.lines.get(i)) {
            return Some(Shape::Segment {
                start: l.start,
                offset: l.offset,
            });
        }
        if let Some(l) = entity.laser.and_then(|i| self.lasers.get(i)) {
            return Some(Shape::PointSize {
                position: l.position,
                size: l.size,
            });
        }
        if let Some(g) = entity.goal.and_then(|i| self.goals.get(i)) {
            return Some(Shape::PointSize {
                position: g.position,
                size: g.size,
            });
        }
        None
    }

    /// Write `shape` back into the component `r` owns
    pub fn apply_shape(&mut self, r: EntityRef, shape: &Shape) {
        let Some(entity) = self.entity(r) else {
            return;
        };
        let (body, line, laser, goal) = (entity.rigid_body, entity.line, entity.laser, entity.goal);
        let (e1, e2) = shape.pair();
        if let Some(b) = body.and_then(|i| self.rigid_bodies.get_mut(i)) {
            b.pos = e1;
            b.size = e2;
        }
        if let Some(l) = line.and_then(|i| self.lines.get_mut(i)) {
            l.start = e1;
            l.offset = e2;
        }
        if let Some(l) = laser.and_then(|i| self.lasers.get_mut(i)) {
            l.position = e1;
            l.size = e2;
        }
        if let Some(g) = goal.and_then(|i| self.goals.get_mut(i)) {
            g.position = e1;
            g.size = e2;
        }
    }
}

/// True when `id` points at an existing, non-tombstoned element
fn is_live(elements: &[MapElement], id: ElementId) -> bool {
    elements.get(id.index()).is_some_and(|e| !e.is_null())
}
