//! Simulation tuning
//!
//! Every gameplay constant lives here so levels can be balanced without a
//! rebuild. Stored as JSON next to the maps; missing fields take defaults.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::SCREEN_TOP;

/// Tunable simulation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Physics ===
    /// Constant acceleration applied to every body
    pub gravity: Vec2,
    /// Velocity-proportional drag
    pub linear_damping: f32,
    /// Scale applied to the movement input on the controlled body
    pub move_accel: f32,
    /// Vertical speed set when jump is pressed
    pub jump_speed: f32,
    /// Fixed substeps per frame
    pub substeps: u32,

    // === Activation ===
    /// Shape interpolation rate, multiplied by frame time
    pub activation_speed: f32,

    // === Lasers ===
    /// Maximum segments per beam
    pub max_beams: usize,
    /// Length of the segment drawn when a beam escapes
    pub fallback_beam_length: f32,
    /// Pull-back applied to hit points so reflections don't re-hit their mirror
    pub ray_epsilon: f32,
    /// Hits further than this along the ray are ignored
    pub max_ray_distance: f32,

    // === Player ===
    pub player_spawn: Vec2,
    pub player_size: Vec2,

    // === Flow ===
    /// Switch to the next map when the player reaches a goal
    pub advance_on_goal: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -2.5),
            linear_damping: 10.0,
            move_accel: 5.0,
            jump_speed: 1.5,
            substeps: 3,

            activation_speed: 3.0,

            max_beams: 10,
            fallback_beam_length: 10.0,
            ray_epsilon: 0.00001,
            max_ray_distance: 100.0,

            player_spawn: Vec2::new(0.5, 0.3),
            player_size: Vec2::new(0.025, 0.025),

            advance_on_goal: true,
        }
    }
}

impl Tuning {
    /// Load tuning from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Bad tuning file {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default tuning");
                Self::default()
            }
        }
    }

    /// Write tuning as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Tuning saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Player spawn clamped to the visible area
    pub fn clamped_spawn(&self) -> Vec2 {
        self.player_spawn
            .clamp(Vec2::ZERO, Vec2::new(1.0, SCREEN_TOP))
    }
}
