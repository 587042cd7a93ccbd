//! Backend-agnostic draw commands
//!
//! The simulation never talks to a graphics API. Each frame the host asks
//! [`draw_map`] for a flat list of primitives in painter's order and feeds them
//! to whatever backend it has.

mod scene;

pub use scene::draw_map;

use glam::Vec2;

/// Commands kept per frame; anything past this is dropped
pub const MAX_COMMANDS: usize = 2048;

/// Packed 0xAARRGGBB to normalized RGBA
pub fn unpack_color(argb: u32) -> [f32; 4] {
    let channel = |shift: u32| ((argb >> shift) & 0xFF) as f32 / 255.0;
    [channel(16), channel(8), channel(0), channel(24)]
}

/// Colors used by the scene pass
pub mod colors {
    pub const BACKGROUND: u32 = 0xFF4040C0;
    pub const GRID_STRIPE: u32 = 0x20FFFFFF;
    pub const RECT_STRIPE: u32 = 0x20000000;
    pub const BODY: u32 = 0xFFFFFFFF;
    /// Dynamic bodies as authored, shown only in the editor
    pub const EDITOR_BODY: u32 = 0xFFFF0000;
}

/// One 2D primitive in world units (x in 0..1, y in 0..SCREEN_TOP)
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Filled axis-aligned rectangle from its minimum corner
    Rect { min: Vec2, size: Vec2, color: u32 },
    Circle { center: Vec2, radius: f32, color: u32 },
    Line {
        start: Vec2,
        end: Vec2,
        color: u32,
        thickness: f32,
    },
    Text { text: String, position: Vec2, size: Vec2 },
}

/// Bounded list of commands for one frame
#[derive(Debug, Clone)]
pub struct RenderList {
    commands: Vec<RenderCommand>,
    dropped: usize,
}

impl Default for RenderList {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderList {
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(MAX_COMMANDS),
            dropped: 0,
        }
    }

    /// Forget last frame's commands, keeping the allocation
    pub fn clear(&mut self) {
        self.commands.clear();
        self.dropped = 0;
    }

    pub fn push(&mut self, command: RenderCommand) {
        if self.commands.len() >= MAX_COMMANDS {
            if self.dropped == 0 {
                log::warn!("render list full ({} commands), dropping the rest", MAX_COMMANDS);
            }
            self.dropped += 1;
            return;
        }
        self.commands.push(command);
    }

    pub fn rect(&mut self, min: Vec2, size: Vec2, color: u32) {
        self.push(RenderCommand::Rect { min, size, color });
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: u32) {
        self.push(RenderCommand::Circle {
            center,
            radius,
            color,
        });
    }

    pub fn line(&mut self, start: Vec2, end: Vec2, color: u32, thickness: f32) {
        self.push(RenderCommand::Line {
            start,
            end,
            color,
            thickness,
        });
    }

    pub fn text(&mut self, text: impl Into<String>, position: Vec2, size: Vec2) {
        self.push(RenderCommand::Text {
            text: text.into(),
            position,
            size,
        });
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands rejected since the last clear
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_color() {
        assert_eq!(unpack_color(0xFF000000), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(unpack_color(0x00FF0000), [1.0, 0.0, 0.0, 0.0]);
        let c = unpack_color(colors::BACKGROUND);
        assert!((c[2] - 192.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_overflow_drops_and_counts() {
        let mut list = RenderList::new();
        for _ in 0..MAX_COMMANDS + 5 {
            list.rect(Vec2::ZERO, Vec2::ONE, 0);
        }
        assert_eq!(list.len(), MAX_COMMANDS);
        assert_eq!(list.dropped(), 5);

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.dropped(), 0);
    }
}
