//! A level: the authored element table plus its derived components
//!
//! The editor mutates `elements` directly. Simulation components only reflect
//! those edits after an explicit [`Map::rebuild`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::components::Components;
use super::element::{ElementId, ElementKind, MapElement, Shape};
use crate::geometry::point_in_rect;
use crate::settings::Tuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Map {
    /// Authored elements. Slot 0 is the reserved reference sentinel.
    pub elements: Vec<MapElement>,
    /// Derived simulation state
    #[serde(skip)]
    pub components: Components,
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl Map {
    /// Empty map holding only the reserved sentinel slot
    pub fn new() -> Self {
        Self {
            elements: vec![MapElement::tombstone()],
            components: Components::default(),
        }
    }

    /// Wrap an element table as loaded from storage. Components start empty.
    pub fn from_elements(elements: Vec<MapElement>) -> Self {
        Self {
            elements,
            components: Components::default(),
        }
    }

    /// Throw away every derived component and rebuild from the element table
    pub fn rebuild(&mut self, tuning: &Tuning) {
        self.components = Components::build(&self.elements, tuning);
    }

    pub fn element(&self, id: ElementId) -> Option<&MapElement> {
        self.elements.get(id.index())
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut MapElement> {
        self.elements.get_mut(id.index())
    }

    /// Ids of all non-tombstoned elements, in table order
    pub fn live_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_null())
            .filter_map(|(i, _)| ElementId::new(i as u32))
    }

    /// Append an element and return its stable id
    pub fn add_element(&mut self, element: MapElement) -> ElementId {
        if self.elements.is_empty() {
            self.elements.push(MapElement::tombstone());
        }
        self.elements.push(element);
        ElementId::from_table_index(self.elements.len() - 1)
    }

    /// Append an element of `kind` with editor defaults, centred on `at`
    pub fn add_default(&mut self, kind: ElementKind, at: Vec2) -> ElementId {
        self.add_element(MapElement::with_defaults(kind, at))
    }

    /// Append a copy of an existing element
    pub fn copy_element(&mut self, id: ElementId) -> Option<ElementId> {
        let element = *self.element(id)?;
        Some(self.add_element(element))
    }

    /// Replace the element with a tombstone. Every other index stays valid.
    pub fn delete_element(&mut self, id: ElementId) {
        if let Some(element) = self.element_mut(id) {
            *element = MapElement::tombstone();
        }
    }

    /// Make `controller` drive `id`. Both target shapes start as the current shape.
    pub fn set_controller(&mut self, id: ElementId, controller: Option<ElementId>) {
        if let Some(element) = self.element_mut(id) {
            element.activated_by = controller;
            element.activated_shape = element.shape;
            element.unactivated_shape = element.shape;
        }
    }

    /// Attach `id` to `anchor`, keeping their current relative placement
    pub fn attach(&mut self, id: ElementId, anchor: ElementId) {
        let Some(anchor_pos) = self.element(anchor).map(|e| e.shape.anchor()) else {
            return;
        };
        if let Some(element) = self.element_mut(id) {
            element.attached_to = Some(anchor);
            element.attachment_offset = element.shape.anchor() - anchor_pos;
        }
    }

    pub fn detach(&mut self, id: ElementId) {
        if let Some(element) = self.element_mut(id) {
            element.attached_to = None;
            element.attachment_offset = Vec2::ZERO;
        }
    }

    /// Shape the editor should modify: one of the two target shapes for
    /// controlled elements, otherwise the element's own shape
    pub fn editable_shape_mut(&mut self, id: ElementId, activated_state: bool) -> Option<&mut Shape> {
        let element = self.element_mut(id)?;
        Some(match (element.activated_by, activated_state) {
            (Some(_), true) => &mut element.activated_shape,
            (Some(_), false) => &mut element.unactivated_shape,
            (None, _) => &mut element.shape,
        })
    }

    /// Show the selected target state on a controlled element
    pub fn preview_state(&mut self, id: ElementId, activated_state: bool) {
        if let Some(element) = self.element_mut(id) {
            if element.activated_by.is_some() {
                element.shape = if activated_state {
                    element.activated_shape
                } else {
                    element.unactivated_shape
                };
            }
        }
    }

    /// First element whose bounds contain `point`
    pub fn element_at(&self, point: Vec2) -> Option<ElementId> {
        self.live_ids().find(|&id| {
            self.element(id)
                .and_then(MapElement::bounds)
                .is_some_and(|b| point_in_rect(&b, point))
        })
    }

    /// Whether the player's centre lies inside any goal grown by the player size.
    /// Goals are read from the components, so moving goals count where they are now.
    pub fn player_reached_goal(&self) -> bool {
        let Some(player) = self.components.player_body() else {
            return false;
        };
        self.components
            .goals
            .iter()
            .any(|goal| goal.contains(player.pos, player.size))
    }
}

/// Snap a dragged centre so the shape's bottom-left corner lands on the tile grid
pub fn snap_to_grid(center: Vec2, size: Vec2, tile: Vec2) -> Vec2 {
    let corner = center - 0.5 * size;
    let snapped = (corner / tile).round() * tile;
    snapped + 0.5 * size
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_map_reserves_sentinel() {
        let mut map = Map::new();
        let first = map.add_default(ElementKind::Rectangle, Vec2::splat(0.2));
        assert_eq!(first.index(), 1);
        assert!(map.elements[0].is_null());
    }

    #[test]
    fn test_set_controller_copies_shape() {
        let mut map = Map::new();
        let door = map.add_default(ElementKind::Rectangle, Vec2::splat(0.2));
        let sensor = map.add_default(ElementKind::Receiver, Vec2::splat(0.4));
        map.set_controller(door, Some(sensor));

        let e = map.element(door).unwrap();
        assert_eq!(e.activated_by, Some(sensor));
        assert_eq!(e.activated_shape, e.shape);
        assert_eq!(e.unactivated_shape, e.shape);

        *map.editable_shape_mut(door, true).unwrap() = Shape::PointSize {
            position: Vec2::ONE,
            size: Vec2::ONE,
        };
        map.preview_state(door, true);
        assert_eq!(map.element(door).unwrap().shape.anchor(), Vec2::ONE);
    }

    #[test]
    fn test_attach_records_offset() {
        let mut map = Map::new();
        let anchor = map.add_default(ElementKind::Box, Vec2::new(0.5, 0.5));
        let rider = map.add_default(ElementKind::Reflector, Vec2::new(0.6, 0.7));
        map.attach(rider, anchor);
        let e = map.element(rider).unwrap();
        assert_eq!(e.attached_to, Some(anchor));
        assert!((e.attachment_offset - Vec2::new(0.1, 0.2)).length() < 1e-6);

        map.detach(rider);
        assert_eq!(map.element(rider).unwrap().attached_to, None);
    }

    #[test]
    fn test_element_at_picks_first_match() {
        let mut map = Map::new();
        let a = map.add_default(ElementKind::Rectangle, Vec2::splat(0.5));
        let _b = map.add_default(ElementKind::Rectangle, Vec2::splat(0.5));
        assert_eq!(map.element_at(Vec2::splat(0.5)), Some(a));
        assert_eq!(map.element_at(Vec2::splat(0.9)), None);

        map.delete_element(a);
        assert_eq!(map.element_at(Vec2::splat(0.5)).map(|id| id.index()), Some(2));
    }

    #[test]
    fn test_goal_detection() {
        let tuning = Tuning::default();
        let mut map = Map::new();
        map.add_default(ElementKind::Goal, tuning.player_spawn + Vec2::new(0.02, 0.0));
        map.rebuild(&tuning);
        assert!(map.player_reached_goal());

        let mut far = Map::new();
        far.add_default(ElementKind::Goal, Vec2::new(0.9, 0.1));
        far.rebuild(&tuning);
        assert!(!far.player_reached_goal());
    }

    #[test]
    fn test_snap_to_grid() {
        let snapped = snap_to_grid(Vec2::new(0.107, 0.093), Vec2::splat(0.04), Vec2::splat(0.04));
        assert!((snapped - Vec2::new(0.1, 0.1)).length() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_delete_keeps_other_indices(
            count in 2usize..24,
            pick in 0usize..1000,
            refs in proptest::collection::vec((0usize..24, 0usize..24), 0..16),
        ) {
            let mut map = Map::new();
            let ids: Vec<ElementId> = (0..count)
                .map(|i| map.add_default(ElementKind::ALL[1 + i % 9], Vec2::splat(i as f32 * 0.01)))
                .collect();
            for (from, to) in refs {
                let (from, to) = (ids[from % count], ids[to % count]);
                map.set_controller(from, Some(to));
                map.attach(from, to);
            }

            let victim = ids[pick % count];
            let before = map.elements.clone();
            map.delete_element(victim);

            prop_assert_eq!(map.elements.len(), before.len());
            for (i, (old, new)) in before.iter().zip(&map.elements).enumerate() {
                if i == victim.index() {
                    prop_assert!(new.is_null());
                } else {
                    prop_assert_eq!(old, new);
                }
            }
        }
    }
}
