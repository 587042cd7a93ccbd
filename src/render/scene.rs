//! Scene pass: turns a map and its components into draw commands

use glam::Vec2;

use super::{RenderList, colors};
use crate::consts::{SCREEN_TOP, TILE_SIZE};
use crate::sim::{BodyShape, ElementKind, EntityRef, Map, Shape};

const GRID_SPACING: f32 = TILE_SIZE;
const STRIPE_THICKNESS: f32 = 0.002;
const LINE_THICKNESS: f32 = 0.01;
/// Lets the last stripe land on a rectangle's far edge despite float drift
const STRIPE_SLACK: f32 = 0.001;
/// The bright beam core overshoots each end by this much
const BEAM_OVERSHOOT: f32 = 0.002;

/// (alpha, thickness, overshoot) for the glow layers of a beam, outermost first
const BEAM_LAYERS: [(u32, f32, bool); 4] = [
    (0x40000000, 0.008, false),
    (0x80000000, 0.005, false),
    (0xC0000000, 0.0025, true),
    (0xFF000000, 0.001, true),
];

fn point_size(shape: &Shape) -> (Vec2, Vec2) {
    let (position, size) = shape.pair();
    (position - 0.5 * size, size)
}

/// Shape to draw for element `index`: the simulated one while playing, the
/// authored one while editing or when the element owns no component
fn live_shape(map: &Map, index: usize, editing: bool) -> Shape {
    let authored = map.elements[index].shape;
    if editing {
        return authored;
    }
    map.components
        .shape_of(EntityRef::Element(index))
        .unwrap_or(authored)
}

fn stripes(out: &mut RenderList, min: Vec2, max: Vec2, limit: Vec2, color: u32) {
    for x in (0..).map(|i| min.x + i as f32 * GRID_SPACING).take_while(|&x| x < limit.x) {
        out.line(Vec2::new(x, min.y), Vec2::new(x, max.y), color, STRIPE_THICKNESS);
    }
    for y in (0..).map(|i| min.y + i as f32 * GRID_SPACING).take_while(|&y| y < limit.y) {
        out.line(Vec2::new(min.x, y), Vec2::new(max.x, y), color, STRIPE_THICKNESS);
    }
}

/// Append one frame of `map` to `out`.
///
/// Order: background, grid, scene elements, bodies (play mode only), laser
/// beams from the last tick, then translucent windows so they tint what is
/// behind them. While playing, everything is drawn where the simulation has it,
/// so animated doors and attached pieces show their current placement. While
/// editing, authored shapes are drawn instead.
pub fn draw_map(map: &Map, editing: bool, out: &mut RenderList) {
    let screen = Vec2::new(1.0, SCREEN_TOP);
    out.rect(Vec2::ZERO, screen, colors::BACKGROUND);
    stripes(out, Vec2::ZERO, screen, screen, colors::GRID_STRIPE);

    for (index, element) in map.elements.iter().enumerate() {
        match element.kind {
            ElementKind::Line | ElementKind::Reflector => {
                if let Shape::Segment { start, offset } = live_shape(map, index, editing) {
                    out.line(start, start + offset, element.color, LINE_THICKNESS);
                }
            }
            ElementKind::Rectangle => {
                let (min, size) = point_size(&live_shape(map, index, editing));
                let max = min + size;
                out.rect(min, size, element.color);
                stripes(out, min, max, max + STRIPE_SLACK, colors::RECT_STRIPE);
            }
            ElementKind::Receiver | ElementKind::Laser | ElementKind::Goal => {
                let (min, size) = point_size(&live_shape(map, index, editing));
                out.rect(min, size, element.color);
            }
            ElementKind::Box if editing => {
                let (min, size) = point_size(&element.shape);
                out.rect(min, size, colors::EDITOR_BODY);
            }
            ElementKind::Circle if editing => {
                let (position, size) = element.shape.pair();
                out.circle(position, 0.5 * size.x, colors::EDITOR_BODY);
            }
            _ => {}
        }
    }

    let components = &map.components;
    if !editing {
        for body in &components.rigid_bodies {
            let dynamic = matches!(body.owner, EntityRef::Player) || !body.is_static();
            if !dynamic {
                continue;
            }
            match body.shape {
                BodyShape::Aabb => out.rect(body.pos - 0.5 * body.size, body.size, colors::BODY),
                BodyShape::Circle => out.circle(body.pos, body.radius(), colors::BODY),
            }
        }
    }

    for path in &components.beams {
        for beam in &path.segments {
            let rgb = beam.color & 0x00FF_FFFF;
            let reach = BEAM_OVERSHOOT * beam.direction();
            for (alpha, thickness, overshoot) in BEAM_LAYERS {
                let (start, end) = if overshoot {
                    (beam.start - reach, beam.end + reach)
                } else {
                    (beam.start, beam.end)
                };
                out.line(start, end, rgb | alpha, thickness);
            }
        }
    }

    for (index, element) in map.elements.iter().enumerate() {
        if element.kind == ElementKind::Window {
            let (min, size) = point_size(&live_shape(map, index, editing));
            out.rect(min, size, element.color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_DT;
    use crate::render::RenderCommand;
    use crate::settings::Tuning;
    use crate::sim::{MapElement, TickInput, tick};

    fn rect_centres(list: &RenderList, color: u32) -> Vec<Vec2> {
        list.commands()
            .iter()
            .filter_map(|cmd| match cmd {
                RenderCommand::Rect { min, size, color: c } if *c == color => Some(*min + 0.5 * *size),
                _ => None,
            })
            .collect()
    }

    fn rects_with(list: &RenderList, color: u32) -> usize {
        list.commands()
            .iter()
            .filter(|cmd| matches!(cmd, RenderCommand::Rect { color: c, .. } if *c == color))
            .count()
    }

    #[test]
    fn test_empty_map_is_background_and_grid() {
        let tuning = Tuning::default();
        let mut map = Map::new();
        map.rebuild(&tuning);

        let mut list = RenderList::new();
        draw_map(&map, true, &mut list);

        assert!(matches!(
            list.commands()[0],
            RenderCommand::Rect { color: colors::BACKGROUND, .. }
        ));
        // 25 vertical and 15 horizontal stripes
        assert_eq!(list.len(), 1 + 25 + 15);
    }

    #[test]
    fn test_player_only_drawn_while_playing() {
        let tuning = Tuning::default();
        let mut map = Map::new();
        map.add_default(ElementKind::Box, Vec2::new(0.7, 0.3));
        map.rebuild(&tuning);

        let mut editing = RenderList::new();
        draw_map(&map, true, &mut editing);
        assert_eq!(rects_with(&editing, colors::BODY), 0);
        assert_eq!(rects_with(&editing, colors::EDITOR_BODY), 1);

        let mut playing = RenderList::new();
        draw_map(&map, false, &mut playing);
        assert_eq!(rects_with(&playing, colors::BODY), 2);
        assert_eq!(rects_with(&playing, colors::EDITOR_BODY), 0);
    }

    #[test]
    fn test_beams_are_four_layers_and_windows_last() {
        let tuning = Tuning::default();
        let mut map = Map::new();
        let mut laser = MapElement::with_defaults(ElementKind::Laser, Vec2::new(0.1, 0.05));
        laser.color = 0xFF00FF00;
        map.add_element(laser);
        map.add_default(ElementKind::Window, Vec2::new(0.5, 0.05));
        map.rebuild(&tuning);
        tick(&mut map, &TickInput::default(), DEFAULT_DT, &tuning);

        let mut list = RenderList::new();
        draw_map(&map, false, &mut list);

        let beam_lines: Vec<_> = list
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Line { color, thickness, .. } if color & 0xFFFFFF == 0x00FF00 => {
                    Some((*color >> 24, *thickness))
                }
                _ => None,
            })
            .collect();
        assert_eq!(beam_lines.len() % 4, 0);
        assert!(!beam_lines.is_empty());
        assert_eq!(beam_lines[0], (0x40, 0.008));
        assert_eq!(beam_lines[3], (0xFF, 0.001));

        assert!(matches!(
            list.commands().last(),
            Some(RenderCommand::Rect { color: 0x80FFFFFF, .. })
        ));
    }

    #[test]
    fn test_animated_door_drawn_where_simulated() {
        const DOOR: u32 = 0xFF123456;
        let tuning = Tuning::default();
        let mut map = Map::new();
        map.add_default(ElementKind::Laser, Vec2::new(0.1, 0.5));
        let receiver = map.add_default(ElementKind::Receiver, Vec2::new(0.4, 0.5));
        let mut door = MapElement::with_defaults(ElementKind::Rectangle, Vec2::new(0.8, 0.1));
        door.color = DOOR;
        let door = map.add_element(door);
        map.set_controller(door, Some(receiver));
        *map.editable_shape_mut(door, true).unwrap() = Shape::PointSize {
            position: Vec2::new(0.8, 0.4),
            size: Vec2::splat(0.04),
        };
        map.rebuild(&tuning);
        for _ in 0..600 {
            tick(&mut map, &TickInput::default(), DEFAULT_DT, &tuning);
        }

        let mut playing = RenderList::new();
        draw_map(&map, false, &mut playing);
        let drawn = rect_centres(&playing, DOOR);
        assert_eq!(drawn.len(), 1);
        assert!((drawn[0] - Vec2::new(0.8, 0.4)).length() < 1e-3);

        let mut editing = RenderList::new();
        draw_map(&map, true, &mut editing);
        let authored = rect_centres(&editing, DOOR);
        assert!((authored[0] - Vec2::new(0.8, 0.1)).length() < 1e-5);
    }

    #[test]
    fn test_attached_mirror_drawn_on_falling_box() {
        const MIRROR: u32 = 0xFF654321;
        let tuning = Tuning::default();
        let mut map = Map::new();
        let crate_id = map.add_default(ElementKind::Box, Vec2::new(0.2, 0.3));
        let mut mirror = MapElement::with_defaults(ElementKind::Reflector, Vec2::new(0.25, 0.35));
        mirror.color = MIRROR;
        let mirror = map.add_element(mirror);
        map.attach(mirror, crate_id);
        map.rebuild(&tuning);
        for _ in 0..30 {
            tick(&mut map, &TickInput::default(), DEFAULT_DT, &tuning);
        }

        let c = &map.components;
        let expected = c.lines[c.entities[mirror.index()].line.unwrap()].start;
        assert!(expected.y < 0.35);

        let mut list = RenderList::new();
        draw_map(&map, false, &mut list);
        let starts: Vec<Vec2> = list
            .commands()
            .iter()
            .filter_map(|cmd| match cmd {
                RenderCommand::Line { start, color, .. } if *color == MIRROR => Some(*start),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec![expected]);
    }
}
