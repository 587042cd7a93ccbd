//! Top-level game state: the map library plus play/edit mode

use glam::Vec2;

use crate::persistence::MapLibrary;
use crate::render::{RenderList, draw_map};
use crate::settings::Tuning;
use crate::sim::{FrameReport, TickInput, tick};

const LABEL_SIZE: Vec2 = Vec2::new(0.1, 0.05);

/// Everything the host needs to drive one session
#[derive(Debug, Clone)]
pub struct Game {
    library: MapLibrary,
    tuning: Tuning,
    editing: bool,
    completed: u32,
}

impl Game {
    pub fn new(library: MapLibrary, tuning: Tuning) -> Self {
        Self {
            library,
            tuning,
            editing: false,
            completed: 0,
        }
    }

    pub fn library(&self) -> &MapLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut MapLibrary {
        &mut self.library
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Levels finished this session
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Enter or leave the editor. Leaving rebuilds components so edits take effect.
    pub fn set_editing(&mut self, editing: bool) {
        if self.editing && !editing {
            self.library.current_mut().rebuild(&self.tuning);
        }
        self.editing = editing;
    }

    pub fn toggle_editing(&mut self) {
        self.set_editing(!self.editing);
    }

    /// Run one frame. Nothing moves while the editor is open.
    pub fn update(&mut self, input: &TickInput, dt: f32) -> FrameReport {
        if self.editing {
            return FrameReport::default();
        }

        let report = tick(self.library.current_mut(), input, dt, &self.tuning);
        if report.level_completed {
            self.completed += 1;
            log::info!("Map {} completed", self.library.current_index());
            if self.tuning.advance_on_goal {
                if let Err(e) = self.library.next_map(&self.tuning) {
                    log::error!("Failed to advance map: {}", e);
                }
            }
        }
        report
    }

    /// Emit this frame's draw commands, clearing `out` first
    pub fn draw(&self, out: &mut RenderList) {
        out.clear();
        draw_map(self.library.current(), self.editing, out);
        out.text(
            format!("Map {}", self.library.current_index()),
            Vec2::ZERO,
            LABEL_SIZE,
        );
    }
}
