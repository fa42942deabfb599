/// The player actor: pixel position, facing, status and the smash cooldown.
/// Status is a three-state machine; only the tile-occupancy check moves it.

use log::debug;

use super::grid::{Point, TileGrid};
use super::rules;
use super::tile::Tile;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// Player status.
///   Ok ──(occupied tile is void)──▶ Dead
///   Ok ──(occupied tile is exit)──▶ Escaped
/// Dead and Escaped are sticky until `reset_to`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Ok,
    Dead,
    Escaped,
}

/// Movement direction. `Up` grows y.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDir {
    pub const ALL: [MoveDir; 4] = [MoveDir::Up, MoveDir::Down, MoveDir::Left, MoveDir::Right];

    /// Unit step in tile space.
    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveDir::Up => (0, 1),
            MoveDir::Down => (0, -1),
            MoveDir::Left => (-1, 0),
            MoveDir::Right => (1, 0),
        }
    }
}

/// One frame of input, sampled from the key table before the step.
/// Movement keys are held state; smash/retry/advance are fresh presses.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub smash: bool,
    pub retry: bool,
    pub advance: bool,
}

impl FrameInput {
    /// Requested directions in resolution order.
    pub fn directions(&self) -> impl Iterator<Item = MoveDir> {
        let held = [self.up, self.down, self.left, self.right];
        MoveDir::ALL.into_iter().zip(held).filter(|&(_, h)| h).map(|(d, _)| d)
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Point,
    /// Position before the latest move; drives the dirty region.
    pub prev_pos: Point,
    /// Pixels per step.
    pub speed: i32,
    pub facing: Facing,
    pub status: Status,
    /// Frames until the next smash is allowed. 0 = ready.
    pub smash_cooldown: u32,
    /// Value the cooldown restarts from after a successful smash.
    pub smash_cooldown_ticks: u32,
}

impl Player {
    pub fn new(start: Point, speed: i32, smash_cooldown_ticks: u32) -> Self {
        Player {
            pos: start,
            prev_pos: start,
            speed,
            facing: Facing::Right,
            status: Status::Ok,
            smash_cooldown: 0,
            smash_cooldown_ticks,
        }
    }

    /// Put the player back on a start cell, alive and ready to smash.
    pub fn reset_to(&mut self, start: Point) {
        self.pos = start;
        self.prev_pos = start;
        self.status = Status::Ok;
        self.smash_cooldown = 0;
    }

    pub fn has_moved(&self) -> bool {
        self.pos != self.prev_pos
    }

    /// Forget the previous position once it has been repainted.
    pub fn settle(&mut self) {
        self.prev_pos = self.pos;
    }

    pub fn can_smash(&self) -> bool {
        self.smash_cooldown == 0
    }

    /// Step one `speed` in `dir` if the collision rules allow it.
    /// Horizontal requests turn the player even when the step is blocked.
    pub fn request_move(&mut self, dir: MoveDir, grid: &TileGrid) -> bool {
        match dir {
            MoveDir::Left => self.facing = Facing::Left,
            MoveDir::Right => self.facing = Facing::Right,
            MoveDir::Up | MoveDir::Down => {}
        }

        if !rules::can_move(grid, self.pos.x, self.pos.y, dir) {
            return false;
        }

        let (dx, dy) = dir.delta();
        self.prev_pos = self.pos;
        self.pos.x += dx * self.speed;
        self.pos.y += dy * self.speed;
        true
    }

    /// Turn breakable walls orthogonally adjacent to the occupied tile into
    /// broken walls. Returns the converted cells; the cooldown restarts only
    /// when at least one wall broke.
    pub fn smash_adjacent_walls(&mut self, grid: &mut TileGrid) -> Vec<(i32, i32)> {
        let (cx, cy) = grid.arena().occupied_tile(self.pos);
        let mut smashed = vec![];

        for dir in MoveDir::ALL {
            let (dx, dy) = dir.delta();
            let (nx, ny) = (cx + dx, cy + dy);
            if !grid.contains(nx, ny) {
                continue;
            }
            if grid.get(nx, ny).is_ok_and(Tile::is_breakable)
                && grid.set(nx, ny, Tile::BrokenWall).is_ok()
            {
                smashed.push((nx, ny));
            }
        }

        if !smashed.is_empty() {
            debug!("smashed {} wall(s) around ({cx}, {cy})", smashed.len());
            self.smash_cooldown = self.smash_cooldown_ticks;
        }
        smashed
    }

    /// Advance the cooldown by one frame.
    pub fn tick(&mut self) {
        self.smash_cooldown = self.smash_cooldown.saturating_sub(1);
    }

    /// Re-evaluate status from the tile the player mostly covers.
    pub fn update_status(&mut self, grid: &TileGrid) -> Status {
        if self.status != Status::Ok {
            return self.status;
        }
        let (tx, ty) = grid.arena().occupied_tile(self.pos);
        match grid.get(tx, ty) {
            Ok(t) if t.is_lethal() => self.status = Status::Dead,
            Ok(t) if t.is_exit() => self.status = Status::Escaped,
            Ok(_) => {}
            Err(e) => debug_assert!(false, "player outside grid: {e}"),
        }
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::tests::grid_from;

    fn player_at(x: i32, y: i32) -> Player {
        Player::new(Point::new(x, y), 4, 100)
    }

    // ── Movement ──

    #[test]
    fn move_records_prior_position() {
        let g = grid_from(&[
            ".....",
            ".....",
            ".....",
        ]);
        let mut p = player_at(16, 16);
        assert!(!p.has_moved());
        assert!(p.request_move(MoveDir::Right, &g));
        assert_eq!(p.pos, Point::new(20, 16));
        assert_eq!(p.prev_pos, Point::new(16, 16));
        assert!(p.has_moved());

        p.settle();
        assert!(!p.has_moved());
        assert!(p.request_move(MoveDir::Up, &g));
        assert_eq!(p.pos, Point::new(20, 20));
        assert_eq!(p.prev_pos, Point::new(20, 16));
    }

    #[test]
    fn blocked_move_is_a_noop_but_turns() {
        let g = grid_from(&[
            ".....",
            "#.#..",
            ".....",
        ]);
        let mut p = player_at(16, 16);
        assert!(!p.request_move(MoveDir::Left, &g));
        assert_eq!(p.pos, Point::new(16, 16));
        assert_eq!(p.facing, Facing::Left);
        assert!(!p.has_moved());

        assert!(!p.request_move(MoveDir::Right, &g));
        assert_eq!(p.facing, Facing::Right);
    }

    #[test]
    fn frame_input_direction_order() {
        let input = FrameInput { up: true, left: true, right: true, ..FrameInput::default() };
        let dirs: Vec<MoveDir> = input.directions().collect();
        assert_eq!(dirs, vec![MoveDir::Up, MoveDir::Left, MoveDir::Right]);
        assert_eq!(FrameInput::default().directions().count(), 0);
    }

    // ── Smashing ──

    #[test]
    fn smash_converts_only_orthogonal_neighbours() {
        let mut g = grid_from(&[
            "%%%..",
            "%.%..",
            "%%%..",
        ]);
        let mut p = player_at(16, 16);
        let mut smashed = p.smash_adjacent_walls(&mut g);
        smashed.sort();
        assert_eq!(smashed, vec![(0, 1), (1, 0), (1, 2), (2, 1)]);

        for (x, y) in [(0, 1), (2, 1), (1, 0), (1, 2)] {
            assert_eq!(g.get(x, y), Ok(Tile::BrokenWall));
        }
        for (x, y) in [(0, 0), (2, 0), (0, 2), (2, 2)] {
            assert_eq!(g.get(x, y), Ok(Tile::BreakableWall));
        }
        assert_eq!(p.smash_cooldown, 100);
        assert!(!p.can_smash());
    }

    #[test]
    fn smash_without_breakable_neighbour_keeps_cooldown() {
        let mut g = grid_from(&[
            "%.%..",
            "###..",
            "%.%..",
        ]);
        let mut p = player_at(16, 16);
        p.smash_cooldown = 7;
        assert!(p.smash_adjacent_walls(&mut g).is_empty());
        assert_eq!(p.smash_cooldown, 7);
        assert_eq!(g.get(0, 0), Ok(Tile::BreakableWall));
    }

    #[test]
    fn smash_uses_the_mostly_covered_tile() {
        let mut g = grid_from(&[
            ".....",
            "..%%.",
            ".....",
        ]);
        // x = 25 is 9px into tile 1: the player mostly covers tile 2,
        // whose right neighbour (3, 1) is breakable. (2, 1) is under the player.
        let mut p = player_at(25, 16);
        assert_eq!(p.smash_adjacent_walls(&mut g), vec![(3, 1)]);
        assert_eq!(g.get(2, 1), Ok(Tile::BreakableWall));
    }

    #[test]
    fn smash_skips_cells_outside_grid() {
        let mut g = grid_from(&[
            ".%",
            "..",
        ]);
        let mut p = player_at(0, 0);
        assert_eq!(p.smash_adjacent_walls(&mut g), vec![(1, 0)]);
    }

    #[test]
    fn tick_counts_down_to_zero() {
        let mut p = player_at(16, 16);
        p.smash_cooldown = 2;
        p.tick();
        assert_eq!(p.smash_cooldown, 1);
        p.tick();
        p.tick();
        assert_eq!(p.smash_cooldown, 0);
        assert!(p.can_smash());
    }

    // ── Status ──

    #[test]
    fn status_follows_occupied_tile() {
        let g = grid_from(&[
            ".....",
            ". xb.",
            ".%#..",
        ]);
        let cases = [
            ((0, 16), Status::Ok),       // floor
            ((16, 16), Status::Dead),    // void
            ((32, 16), Status::Escaped), // exit
            ((48, 16), Status::Ok),      // broken wall
            ((16, 32), Status::Ok),      // breakable wall
            ((32, 32), Status::Ok),      // wall
        ];
        for ((x, y), want) in cases {
            let mut p = player_at(x, y);
            assert_eq!(p.update_status(&g), want, "at ({x}, {y})");
        }
    }

    #[test]
    fn animated_void_is_lethal_too() {
        let mut g = grid_from(&[
            ".....",
            ".*...",
        ]);
        g.set(1, 1, Tile::AnimatedEmpty).unwrap();
        let mut p = player_at(16, 16);
        assert_eq!(p.update_status(&g), Status::Dead);
    }

    #[test]
    fn status_is_sticky_until_reset() {
        let g = grid_from(&[
            ". x..",
        ]);
        let mut p = player_at(16, 0);
        assert_eq!(p.update_status(&g), Status::Dead);
        p.pos = Point::new(32, 0);
        assert_eq!(p.update_status(&g), Status::Dead);

        p.reset_to(Point::new(0, 0));
        assert_eq!(p.status, Status::Ok);
        p.pos = Point::new(32, 0);
        assert_eq!(p.update_status(&g), Status::Escaped);
    }

    #[test]
    fn status_uses_rounding_toward_larger_share() {
        let g = grid_from(&[
            ". ...",
        ]);
        // 7px into tile 0 → still tile 0
        let mut p = player_at(7, 0);
        assert_eq!(p.update_status(&g), Status::Ok);
        // 9px into tile 0 → mostly tile 1 (void)
        let mut p = player_at(9, 0);
        assert_eq!(p.update_status(&g), Status::Dead);
    }
}
