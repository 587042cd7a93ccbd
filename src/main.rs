//! Laser Puzzle headless entry point
//!
//! Loads tuning and maps from the working directory, plays the first map for a
//! few seconds with no input and reports what happened.

use laser_puzzle::consts::DEFAULT_DT;
use laser_puzzle::persistence::FsStore;
use laser_puzzle::render::RenderList;
use laser_puzzle::sim::TickInput;
use laser_puzzle::{Game, MapLibrary, Tuning};

const TUNING_PATH: &str = "tuning.json";
const FRAMES: usize = 120;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Laser Puzzle (headless) starting...");

    let tuning = Tuning::load(TUNING_PATH);
    let store = FsStore::new(".");
    let library = MapLibrary::load_maps(&store, &tuning);
    let mut game = Game::new(library, tuning);

    let input = TickInput::default();
    let mut commands = RenderList::new();
    for _ in 0..FRAMES {
        game.update(&input, DEFAULT_DT);
        game.draw(&mut commands);
    }

    let map = game.library().current();
    let beams: usize = map.components.beams.iter().map(|p| p.segments.len()).sum();
    let activated = map.components.entities.iter().filter(|e| e.was_activated).count();
    log::info!(
        "Map {}: {} elements, {} beam segments, {} activated, {} levels completed",
        game.library().current_index(),
        map.elements.len(),
        beams,
        activated,
        game.completed()
    );
    if let Some(player) = map.components.player_body() {
        log::info!("Player at ({:.4}, {:.4})", player.pos.x, player.pos.y);
    }
    log::info!("Last frame: {} draw commands", commands.len());
}

#[cfg(target_arch = "wasm32")]
fn main() {}
