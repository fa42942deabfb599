/// WorldState: the complete snapshot of a running game.
///
/// Owns the tile grid, the player and the level list. Core functions take
/// `&mut WorldState` (or its fields) for the duration of a call only.

use crate::config::SpeedConfig;
use crate::domain::entity::Player;
use crate::domain::grid::{Arena, Point, TileGrid};
use super::level::LevelSource;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    /// Level cleared; waiting for the advance key.
    Escaped,
    /// Game over overlay; waiting for the retry key.
    Dead,
    /// Every level cleared; retry starts over from level 1.
    Victory,
}

pub struct WorldState {
    pub grid: TileGrid,
    pub player: Player,
    /// Start position of the current level, in pixels.
    pub start: Point,
    pub phase: Phase,

    pub levels: Vec<LevelSource>,
    pub current_level: usize,

    pub speed: SpeedConfig,
    pub tick: u64,
}

impl WorldState {
    /// An empty world. Nothing is playable until `level::load_level` succeeds.
    pub fn new(arena: Arena, speed: SpeedConfig, levels: Vec<LevelSource>) -> Self {
        WorldState {
            grid: TileGrid::new(arena, speed.animation_period),
            player: Player::new(Point::default(), speed.move_speed, speed.smash_cooldown),
            start: Point::default(),
            phase: Phase::Playing,
            levels,
            current_level: 0,
            speed,
            tick: 0,
        }
    }

    /// 1-based level number for display.
    pub fn level_number(&self) -> usize {
        self.current_level + 1
    }

    pub fn total_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn is_last_level(&self) -> bool {
        self.current_level + 1 >= self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_world_carries_its_speeds() {
        let arena = Arena { tile_size: 16, width_px: 96, height_px: 64, border_margin: 4 };
        let speed = SpeedConfig { frame_ms: 25, move_speed: 3, smash_cooldown: 40, animation_period: 10 };
        let w = WorldState::new(arena, speed.clone(), vec![]);
        assert_eq!(w.speed, speed);
        assert_eq!(w.player.speed, 3);
        assert_eq!(w.player.smash_cooldown_ticks, 40);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.total_levels(), 0);
    }
}
