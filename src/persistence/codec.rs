//! Binary map format
//!
//! Little-endian, fixed layout:
//!
//! ```text
//! u32 element_count
//! u32 padding        (ignored on read)
//! u32 element_size   (stride of one record)
//! element_count x element record
//! ```
//!
//! Readers honour the declared stride even when it differs from the compiled
//! record size, so maps written by older or newer builds still load.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::MapError;
use crate::sim::{ElementId, ElementKind, Map, MapElement, Shape};

/// File header
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct MapHeader {
    pub element_count: u32,
    pub padding: u32,
    pub element_size: u32,
}

/// On-disk element record. Shapes are stored as raw vector pairs.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ElementRecord {
    pub kind: u32,
    pub shape: [f32; 4],
    pub activated_by: u32,
    pub activated_shape: [f32; 4],
    pub unactivated_shape: [f32; 4],
    pub color: u32,
    pub angle: f32,
    pub attached_to: u32,
    pub attachment_offset: [f32; 2],
}

pub const HEADER_SIZE: usize = std::mem::size_of::<MapHeader>();
pub const RECORD_SIZE: usize = std::mem::size_of::<ElementRecord>();

fn le_f32(v: f32) -> f32 {
    f32::from_bits(v.to_bits().to_le())
}

impl MapHeader {
    /// Convert between host and little-endian order (an involution)
    fn swap_le(self) -> Self {
        Self {
            element_count: self.element_count.to_le(),
            padding: self.padding.to_le(),
            element_size: self.element_size.to_le(),
        }
    }
}

impl ElementRecord {
    /// Convert between host and little-endian order (an involution)
    fn swap_le(self) -> Self {
        Self {
            kind: self.kind.to_le(),
            shape: self.shape.map(le_f32),
            activated_by: self.activated_by.to_le(),
            activated_shape: self.activated_shape.map(le_f32),
            unactivated_shape: self.unactivated_shape.map(le_f32),
            color: self.color.to_le(),
            angle: le_f32(self.angle),
            attached_to: self.attached_to.to_le(),
            attachment_offset: self.attachment_offset.map(le_f32),
        }
    }
}

fn pack_shape(shape: &Shape) -> [f32; 4] {
    let (e1, e2) = shape.pair();
    [e1.x, e1.y, e2.x, e2.y]
}

fn unpack_shape(kind: ElementKind, raw: [f32; 4]) -> Shape {
    Shape::from_pair(kind, Vec2::new(raw[0], raw[1]), Vec2::new(raw[2], raw[3]))
}

impl From<&MapElement> for ElementRecord {
    fn from(e: &MapElement) -> Self {
        Self {
            kind: e.kind.tag(),
            shape: pack_shape(&e.shape),
            activated_by: ElementId::encode(e.activated_by),
            activated_shape: pack_shape(&e.activated_shape),
            unactivated_shape: pack_shape(&e.unactivated_shape),
            color: e.color,
            angle: e.angle,
            attached_to: ElementId::encode(e.attached_to),
            attachment_offset: e.attachment_offset.to_array(),
        }
    }
}

impl ElementRecord {
    /// Decode into an element. Unknown kind tags become tombstones.
    pub fn to_element(&self, index: usize) -> MapElement {
        let Some(kind) = ElementKind::from_tag(self.kind) else {
            log::warn!("element {} has unknown kind tag {}, treating as Null", index, self.kind);
            return MapElement::tombstone();
        };

        MapElement {
            kind,
            shape: unpack_shape(kind, self.shape),
            activated_by: ElementId::new(self.activated_by),
            activated_shape: unpack_shape(kind, self.activated_shape),
            unactivated_shape: unpack_shape(kind, self.unactivated_shape),
            color: self.color,
            angle: self.angle,
            attached_to: ElementId::new(self.attached_to),
            attachment_offset: Vec2::from_array(self.attachment_offset),
        }
    }
}

/// Encode a map's element table
pub fn serialize_map(map: &Map) -> Vec<u8> {
    let header = MapHeader {
        element_count: map.elements.len() as u32,
        padding: 0,
        element_size: RECORD_SIZE as u32,
    };

    let mut out = Vec::with_capacity(HEADER_SIZE + map.elements.len() * RECORD_SIZE);
    out.extend_from_slice(bytemuck::bytes_of(&header.swap_le()));
    for element in &map.elements {
        let record = ElementRecord::from(element).swap_le();
        out.extend_from_slice(bytemuck::bytes_of(&record));
    }
    out
}

/// Decode a map. The returned map has no components until rebuilt.
pub fn deserialize_map(data: &[u8]) -> Result<Map, MapError> {
    if data.len() < HEADER_SIZE {
        return Err(MapError::Empty);
    }

    let header: MapHeader = bytemuck::pod_read_unaligned::<MapHeader>(&data[..HEADER_SIZE]).swap_le();
    let count = header.element_count as usize;
    let stride = header.element_size as usize;

    if stride == 0 && count > 0 {
        return Err(MapError::ZeroStride { count });
    }

    if stride != RECORD_SIZE {
        log::warn!(
            "map element record is {} bytes, expected {}; reading with declared stride",
            stride,
            RECORD_SIZE
        );
    }

    let body = &data[HEADER_SIZE..];
    let expected = count.saturating_mul(stride);
    if body.len() < expected {
        return Err(MapError::Truncated {
            expected: HEADER_SIZE.saturating_add(expected),
            actual: data.len(),
        });
    }

    let copy = stride.min(RECORD_SIZE);
    let mut elements = Vec::with_capacity(count.min(body.len() / stride.max(1)));
    for index in 0..count {
        let chunk = &body[index * stride..index * stride + copy];
        let mut record = ElementRecord::zeroed();
        bytemuck::bytes_of_mut(&mut record)[..copy].copy_from_slice(chunk);
        elements.push(record.swap_le().to_element(index));
    }

    Ok(Map::from_elements(elements))
}
