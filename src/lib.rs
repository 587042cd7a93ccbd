//! Laser Puzzle - simulation core of a 2D laser-reflection physics puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (elements, components, physics, lasers)
//! - `geometry`: Rectangles, segments and 2x2 matrix helpers
//! - `persistence`: Binary map format and numbered map slots
//! - `settings`: Data-driven tuning
//! - `render`: Backend-agnostic draw command generation
//! - `game`: Play/edit mode and level progression

pub mod game;
pub mod geometry;
pub mod persistence;
pub mod render;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use persistence::{MapError, MapLibrary};
pub use settings::Tuning;

/// World configuration constants
pub mod consts {
    /// World is 1.0 wide and 9/16 tall
    pub const SCREEN_TOP: f32 = 0.5625;
    /// Frame time used by the headless host and tests
    pub const DEFAULT_DT: f32 = 1.0 / 60.0;
    /// Editor grid tile
    pub const TILE_SIZE: f32 = 0.04;
}
