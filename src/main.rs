/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::{debug, error, info};

use config::GameConfig;
use domain::entity::FrameInput;
use sim::event::GameEvent;
use sim::level::{discover_levels, load_level};
use sim::step;
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::redraw;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;
use ui::surface::PixelBuffer;
use ui::tileset::Tileset;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const DEFAULT_LOG_FILE: &str = "tilemaze.log";

fn main() {
    init_logging();
    let config = GameConfig::load();

    let levels = discover_levels(&config.levels_dir);
    let mut world = WorldState::new(config.arena, config.speed.clone(), levels);
    if let Err(e) = load_level(&mut world, 0) {
        error!("cannot load first level: {e}");
        eprintln!("Cannot load first level: {e}");
        std::process::exit(1);
    }

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        error!("terminal init failed: {e}");
        eprintln!("Terminal init failed: {e}");
        std::process::exit(1);
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game aborted: {e}");
        eprintln!("Game error: {e}");
        std::process::exit(1);
    }
    info!("quit on level {}", world.level_number());
}

/// Logs go to a file; the terminal belongs to the game while it runs.
fn init_logging() {
    let path = std::env::var_os("TILEMAZE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    let file = match std::fs::File::create(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Logging disabled: cannot create {}: {e}", path.display());
            return;
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.enable_key_release();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad detected");
    }

    let tileset = Tileset::generate(config.arena.tile_size);
    let mut frame = PixelBuffer::new(config.arena.width_px, config.arena.height_px);
    redraw::draw_full(&mut frame, &tileset, &world.player, &world.grid);

    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(world.speed.frame_ms);

    // One-shot presses wait here until the next tick consumes them.
    let mut pending = FrameInput::default();

    loop {
        kb.drain_events();
        gp.update();

        if kb.quit_requested() || gp.quit_pressed() {
            break;
        }

        let mut sampled = kb.frame_input();
        gp.merge_into(&mut sampled);
        pending.smash |= sampled.smash;
        pending.retry |= sampled.retry;
        pending.advance |= sampled.advance;

        if last_tick.elapsed() >= tick_rate {
            let input = FrameInput {
                smash: pending.smash,
                retry: pending.retry,
                advance: pending.advance,
                ..sampled
            };
            pending = FrameInput::default();

            // Controls first, so a death this tick waits for a later retry.
            let mut events = step::resolve_controls(world, input)?;
            events.extend(step::step(world, input));

            repaint(&mut frame, &tileset, world, &events);
            process_sound_events(sound, &events);
            last_tick = Instant::now();
        }

        renderer.render(world, &frame)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Bring the pixel frame up to date with what changed this tick.
fn repaint(frame: &mut PixelBuffer, tileset: &Tileset, world: &WorldState, events: &[GameEvent]) {
    let reloaded = events.iter().find_map(|e| match e {
        GameEvent::LevelLoaded { level } => Some(*level),
        GameEvent::LevelRestarted => Some(world.level_number()),
        _ => None,
    });
    if let Some(level) = reloaded {
        debug!("full repaint for level {level}");
        redraw::draw_full(frame, tileset, &world.player, &world.grid);
        return;
    }

    for event in events {
        match event {
            GameEvent::BackgroundAnimated => redraw::redraw_animated(frame, tileset, &world.grid),
            GameEvent::PlayerMoved => redraw::redraw(frame, tileset, &world.player, &world.grid),
            GameEvent::WallsSmashed { cells } => {
                redraw::redraw_cells(frame, tileset, &world.player, &world.grid, cells)
            }
            _ => {}
        }
    }
    redraw::draw_actor(frame, tileset, &world.player);
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    let finale = events.contains(&GameEvent::AllLevelsCleared);
    for event in events {
        match event {
            GameEvent::WallsSmashed { .. } => sfx.play_smash(),
            GameEvent::PlayerDied => sfx.play_die(),
            GameEvent::LevelEscaped { level } if !finale => {
                debug!("escape jingle for level {level}");
                sfx.play_escape();
            }
            GameEvent::AllLevelsCleared => sfx.play_victory(),
            _ => {}
        }
    }
}
