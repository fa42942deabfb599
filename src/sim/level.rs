/// Level sources and level loading.
///
/// ## Sources (priority order):
///   1. `levels/` directory: `1.txt`, `2.txt`, … numbered consecutively
///      from 1; the first missing number ends the sequence.
///   2. Built-in embedded levels.
///
/// ## Level format:
///   Plain text, one symbol per cell, newlines ignored. Row 0 of the file is
///   the **bottom** row of the arena. Exactly `cols * rows` symbols.
///
/// ## Tile legend:
///   ' ' = Void (lethal)       '*' = Void, animation frame
///   '.' = Floor               '#' = Wall
///   '%' = Breakable wall      'b' = Broken wall
///   'x' = Exit                '@' = Player start (loads as floor)

use std::path::{Path, PathBuf};

use log::info;

use crate::domain::grid::{Point, TileGrid};
use crate::error::LoadError;
use super::world::{Phase, WorldState};

#[derive(Clone, Debug)]
pub enum LevelSource {
    File(PathBuf),
    Embedded { name: &'static str, text: &'static str },
}

impl LevelSource {
    pub fn name(&self) -> String {
        match self {
            LevelSource::File(path) => path.display().to_string(),
            LevelSource::Embedded { name, .. } => format!("built-in {name}"),
        }
    }

    /// Parse this source into `grid`, returning the start position.
    pub fn load_into(&self, grid: &mut TileGrid) -> Result<Point, LoadError> {
        match self {
            LevelSource::File(path) => grid.load_file(path),
            LevelSource::Embedded { text, .. } => grid.load(text),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Numbered level files in `dir`, or the embedded set when there are none.
pub fn discover_levels(dir: &Path) -> Vec<LevelSource> {
    let files = numbered_files(dir);
    if files.is_empty() {
        info!("no level files in {}; using built-in levels", dir.display());
        return embedded_levels();
    }
    info!("found {} level file(s) in {}", files.len(), dir.display());
    files.into_iter().map(LevelSource::File).collect()
}

/// Load level `level_idx` into the world and put the player on its start.
///
/// On failure the grid is left unloaded and the world state is otherwise
/// unchanged; the caller treats this as fatal.
pub fn load_level(world: &mut WorldState, level_idx: usize) -> Result<(), LoadError> {
    let source = match world.levels.get(level_idx) {
        Some(s) => s,
        None => {
            world.grid.reset();
            return Err(LoadError::NoSuchLevel { number: level_idx + 1 });
        }
    };

    let start = source.load_into(&mut world.grid)?;
    info!("loaded level {} from {}", level_idx + 1, source.name());

    world.current_level = level_idx;
    world.start = start;
    world.player.reset_to(start);
    world.phase = Phase::Playing;
    Ok(())
}

// ══════════════════════════════════════════════════════════════
// Directory loading
// ══════════════════════════════════════════════════════════════

fn numbered_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = vec![];
    if !dir.is_dir() {
        return files;
    }
    for n in 1.. {
        let path = dir.join(format!("{n}.txt"));
        if !path.is_file() {
            break;
        }
        files.push(path);
    }
    files
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

fn embedded_levels() -> Vec<LevelSource> {
    vec![
        LevelSource::Embedded { name: "1", text: include_str!("../../levels/1.txt") },
        LevelSource::Embedded { name: "2", text: include_str!("../../levels/2.txt") },
    ]
}
