/// The step function: advances the world by one frame.
///
/// Processing order while playing:
///   1. Smash cooldown tick
///   2. Movement resolution, one request per held direction, in
///      Up / Down / Left / Right order, each from the position the
///      previous one produced. Checking every direction against the
///      frame-start position instead would let a diagonal slip past a
///      corner neither single step allows.
///   3. Wall smash (only when the cooldown has run out)
///   4. Status check against the occupied tile → phase change
///   5. Void animation
///
/// Outside `Playing` only the level controls are read; see `resolve_controls`.

use log::info;

use crate::domain::entity::{FrameInput, Status};
use crate::error::LoadError;
use super::event::GameEvent;
use super::level::load_level;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;
    world.player.settle();

    world.player.tick();
    resolve_movement(world, input);
    resolve_smash(world, input.smash, &mut events);
    resolve_status(world, &mut events);

    if world.grid.animate_tick() {
        events.push(GameEvent::BackgroundAnimated);
    }
    events
}

/// Retry / advance handling for the overlay phases.
///
/// Level loads can fail here; the error is fatal to the run.
pub fn resolve_controls(world: &mut WorldState, input: FrameInput) -> Result<Vec<GameEvent>, LoadError> {
    let mut events = vec![];
    match world.phase {
        Phase::Playing => {}
        Phase::Dead => {
            if input.retry {
                restart_level(world);
                events.push(GameEvent::LevelRestarted);
            }
        }
        Phase::Escaped => {
            if input.advance {
                let next = world.current_level + 1;
                load_level(world, next)?;
                events.push(GameEvent::LevelLoaded { level: world.level_number() });
            }
        }
        Phase::Victory => {
            if input.retry {
                load_level(world, 0)?;
                events.push(GameEvent::LevelLoaded { level: world.level_number() });
            }
        }
    }
    Ok(events)
}

/// Put the current level back the way it was loaded and respawn the player.
pub fn restart_level(world: &mut WorldState) {
    world.grid.restore();
    world.player.reset_to(world.start);
    world.phase = Phase::Playing;
    info!("restarting level {}", world.level_number());
}

// ══════════════════════════════════════════════════════════════
// Per-frame phases
// ══════════════════════════════════════════════════════════════

fn resolve_movement(world: &mut WorldState, input: FrameInput) {
    let origin = world.player.pos;
    for dir in input.directions() {
        world.player.request_move(dir, &world.grid);
    }
    // Several moves in one frame: the dirty region still needs the frame start.
    world.player.prev_pos = origin;
}

fn resolve_smash(world: &mut WorldState, smash: bool, events: &mut Vec<GameEvent>) {
    if !smash || !world.player.can_smash() { return; }
    let cells = world.player.smash_adjacent_walls(&mut world.grid);
    if !cells.is_empty() {
        events.push(GameEvent::WallsSmashed { cells });
    }
}

fn resolve_status(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.player.has_moved() {
        events.push(GameEvent::PlayerMoved);
    }
    match world.player.update_status(&world.grid) {
        Status::Ok => {}
        Status::Dead => {
            info!("player died on level {}", world.level_number());
            world.phase = Phase::Dead;
            events.push(GameEvent::PlayerDied);
        }
        Status::Escaped if world.is_last_level() => {
            info!("all {} levels cleared", world.total_levels());
            world.phase = Phase::Victory;
            events.push(GameEvent::LevelEscaped { level: world.level_number() });
            events.push(GameEvent::AllLevelsCleared);
        }
        Status::Escaped => {
            info!("level {} escaped", world.level_number());
            world.phase = Phase::Escaped;
            events.push(GameEvent::LevelEscaped { level: world.level_number() });
        }
    }
}
