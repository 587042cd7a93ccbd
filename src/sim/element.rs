//! Map elements: the authored, serialized description of a level
//!
//! Elements are stored in a flat table and referenced by index. Index 0 is the
//! reserved "no reference" slot, so every real cross-reference is an
//! `Option<ElementId>` holding a non-zero index. Deleting an element replaces it
//! with a `Null` tombstone so that no other index ever shifts.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::{LineSegment, Rect};

/// Stable index of an element in its map's element table (never 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(u32);

impl ElementId {
    /// Build an id from a raw table index. Index 0 is the sentinel and yields `None`.
    pub fn new(index: u32) -> Option<Self> {
        (index != 0).then_some(Self(index))
    }

    /// Id for a table slot known to be past the sentinel
    pub(crate) fn from_table_index(index: usize) -> Self {
        debug_assert!(index != 0, "slot 0 is the reference sentinel");
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Raw encoding of an optional reference, 0 meaning none
    pub fn encode(id: Option<Self>) -> u32 {
        id.map_or(0, |id| id.0)
    }
}

/// Element type tag. Discriminants are the on-disk tag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u32)]
pub enum ElementKind {
    #[default]
    Null = 0,
    Rectangle = 1,
    Reflector = 2,
    Receiver = 3,
    Laser = 4,
    Box = 5,
    Goal = 6,
    Window = 7,
    Line = 8,
    Circle = 9,
}

impl ElementKind {
    pub const ALL: [ElementKind; 10] = [
        ElementKind::Null,
        ElementKind::Rectangle,
        ElementKind::Reflector,
        ElementKind::Receiver,
        ElementKind::Laser,
        ElementKind::Box,
        ElementKind::Goal,
        ElementKind::Window,
        ElementKind::Line,
        ElementKind::Circle,
    ];

    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    #[inline]
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// Lines and reflectors are segments, everything else is a boxed shape
    pub fn is_segment(self) -> bool {
        matches!(self, ElementKind::Reflector | ElementKind::Line)
    }

    /// Shape with both vectors zeroed, in the form this kind uses
    pub fn empty_shape(self) -> Shape {
        Shape::from_pair(self, Vec2::ZERO, Vec2::ZERO)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Null => "Null",
            ElementKind::Rectangle => "Rectangle",
            ElementKind::Reflector => "Reflector",
            ElementKind::Receiver => "Receiver",
            ElementKind::Laser => "Laser",
            ElementKind::Box => "Box",
            ElementKind::Goal => "Goal",
            ElementKind::Window => "Window",
            ElementKind::Line => "Line",
            ElementKind::Circle => "Circle",
        }
    }
}

/// Geometry of an element. Which variant is valid depends on the element kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Centre position and full extents
    PointSize { position: Vec2, size: Vec2 },
    /// Segment from `start` to `start + offset`
    Segment { start: Vec2, offset: Vec2 },
}

impl Default for Shape {
    fn default() -> Self {
        Shape::PointSize {
            position: Vec2::ZERO,
            size: Vec2::ZERO,
        }
    }
}

impl Shape {
    /// Interpret a raw vector pair according to `kind`
    pub fn from_pair(kind: ElementKind, e1: Vec2, e2: Vec2) -> Self {
        if kind.is_segment() {
            Shape::Segment {
                start: e1,
                offset: e2,
            }
        } else {
            Shape::PointSize {
                position: e1,
                size: e2,
            }
        }
    }

    /// The two raw vectors, in storage order
    pub fn pair(&self) -> (Vec2, Vec2) {
        match *self {
            Shape::PointSize { position, size } => (position, size),
            Shape::Segment { start, offset } => (start, offset),
        }
    }

    /// Anchor used for dragging and attachments: centre or segment start
    pub fn anchor(&self) -> Vec2 {
        self.pair().0
    }

    pub fn set_anchor(&mut self, anchor: Vec2) {
        match self {
            Shape::PointSize { position, .. } => *position = anchor,
            Shape::Segment { start, .. } => *start = anchor,
        }
    }

    /// Second vector: size or segment offset
    pub fn extent(&self) -> Vec2 {
        self.pair().1
    }

    pub fn set_extent(&mut self, extent: Vec2) {
        match self {
            Shape::PointSize { size, .. } => *size = extent,
            Shape::Segment { offset, .. } => *offset = extent,
        }
    }

    /// Move both vectors toward `target` by factor `t`, keeping this variant
    pub fn lerp_toward(&self, target: &Shape, t: f32) -> Shape {
        let (a1, a2) = self.pair();
        let (b1, b2) = target.pair();
        let (e1, e2) = (a1.lerp(b1, t), a2.lerp(b2, t));
        match self {
            Shape::PointSize { .. } => Shape::PointSize {
                position: e1,
                size: e2,
            },
            Shape::Segment { .. } => Shape::Segment {
                start: e1,
                offset: e2,
            },
        }
    }

    /// Axis-aligned bounds; segments are padded so thin lines stay pickable
    pub fn bounds(&self) -> Rect {
        const SEGMENT_PADDING: f32 = 0.01;
        match *self {
            Shape::PointSize { position, size } => Rect::from_center_size(position, size),
            Shape::Segment { start, offset } => {
                let end = start + offset;
                Rect::new(start.min(end), start.max(end)).grown(Vec2::splat(SEGMENT_PADDING))
            }
        }
    }

    pub fn segment(&self) -> Option<LineSegment> {
        match *self {
            Shape::Segment { start, offset } => Some(LineSegment::from_offset(start, offset)),
            Shape::PointSize { .. } => None,
        }
    }
}

/// One authored level element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapElement {
    pub kind: ElementKind,
    pub shape: Shape,
    /// Controller whose activation drives this element
    pub activated_by: Option<ElementId>,
    pub activated_shape: Shape,
    pub unactivated_shape: Shape,
    /// Packed 0xAARRGGBB
    pub color: u32,
    /// Laser direction in turns (1.0 = full circle)
    pub angle: f32,
    pub attached_to: Option<ElementId>,
    pub attachment_offset: Vec2,
}

impl Default for MapElement {
    fn default() -> Self {
        Self::tombstone()
    }
}

impl MapElement {
    /// Element of `kind` with the given shape vectors and everything else cleared
    pub fn new(kind: ElementKind, e1: Vec2, e2: Vec2, color: u32) -> Self {
        Self {
            kind,
            shape: Shape::from_pair(kind, e1, e2),
            activated_by: None,
            activated_shape: kind.empty_shape(),
            unactivated_shape: kind.empty_shape(),
            color,
            angle: 0.0,
            attached_to: None,
            attachment_offset: Vec2::ZERO,
        }
    }

    /// The placeholder left behind by a deletion
    pub fn tombstone() -> Self {
        Self::new(ElementKind::Null, Vec2::ZERO, Vec2::ZERO, 0)
    }

    /// Default element the editor creates for `kind`, centred on `at`
    pub fn with_defaults(kind: ElementKind, at: Vec2) -> Self {
        const TILE_SIZE: Vec2 = Vec2::splat(crate::consts::TILE_SIZE);
        const BOX_SIZE: Vec2 = Vec2::new(0.03, 0.03);
        const MARKER_SIZE: Vec2 = Vec2::new(0.01, 0.01);

        match kind {
            ElementKind::Null => Self::tombstone(),
            ElementKind::Rectangle => Self::new(kind, at, TILE_SIZE, 0xFFFFFFFF),
            ElementKind::Receiver => Self::new(kind, at, MARKER_SIZE, 0xFFFFFFFF),
            ElementKind::Laser => Self::new(kind, at, MARKER_SIZE, 0xFF00FF00),
            ElementKind::Reflector => Self::new(kind, at, TILE_SIZE, 0xFF808080),
            ElementKind::Box | ElementKind::Circle => Self::new(kind, at, BOX_SIZE, 0xFFFFFFFF),
            ElementKind::Goal => Self::new(kind, at, TILE_SIZE, 0xFF0000FF),
            ElementKind::Window => Self::new(kind, at, TILE_SIZE, 0x80FFFFFF),
            ElementKind::Line => Self::new(kind, at, TILE_SIZE, 0xFFFFFFFF),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.kind == ElementKind::Null
    }

    pub fn bounds(&self) -> Option<Rect> {
        (!self.is_null()).then(|| self.shape.bounds())
    }
}
