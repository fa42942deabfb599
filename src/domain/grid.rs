/// TileGrid: the level's tile symbols and their load/reset lifecycle.
///
/// ## Tile layers
///
/// Two layers:
///   - `base_tiles`: the level as loaded. **Never mutated** after `load`.
///   - `tiles`: the effective terrain (base + smashed walls + void animation).
///
/// `restore()` resets `tiles = base_tiles.clone()` (level retry).
/// `reset()` drops both layers, leaving the grid unloaded.
///
/// ## Coordinates
///
/// Tile `(x, y)` covers pixels `[x * tile, (x + 1) * tile)` horizontally and
/// `[y * tile, (y + 1) * tile)` vertically. Both axes grow away from the
/// bottom-left corner, so row 0 of a level source is the bottom row.

use std::path::Path;

use crate::error::{GridError, LoadError};
use super::tile::Tile;

/// Marks the player's start cell in a level source. Loaded as floor.
pub const START_MARKER: char = '@';

/// A pixel position.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

/// Pixel dimensions of the play field.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Arena {
    pub tile_size: i32,
    pub width_px: i32,
    pub height_px: i32,
    /// No part of the player may come closer than this to the window edge.
    pub border_margin: i32,
}

impl Arena {
    pub fn cols(&self) -> i32 {
        self.width_px / self.tile_size
    }

    pub fn rows(&self) -> i32 {
        self.height_px / self.tile_size
    }

    /// Tile covering the larger share of a tile-sized box at `p`.
    pub fn occupied_tile(&self, p: Point) -> (i32, i32) {
        let ts = self.tile_size;
        let round = |v: i32| v / ts + i32::from(v % ts > ts / 2);
        (round(p.x), round(p.y))
    }

    /// Pixel origin of tile `(x, y)`.
    pub fn tile_origin(&self, x: i32, y: i32) -> Point {
        Point::new(x * self.tile_size, y * self.tile_size)
    }
}

pub struct TileGrid {
    arena: Arena,
    /// Level as loaded. Empty when unloaded.
    base_tiles: Vec<Vec<Tile>>,
    /// Effective terrain, `tiles[y][x]`.
    tiles: Vec<Vec<Tile>>,
    anim_period: u32,
    anim_counter: u32,
}

// ── Query / mutation ──

impl TileGrid {
    pub fn new(arena: Arena, anim_period: u32) -> Self {
        TileGrid {
            arena,
            base_tiles: vec![],
            tiles: vec![],
            anim_period,
            anim_counter: 0,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn cols(&self) -> i32 {
        self.arena.cols()
    }

    pub fn rows(&self) -> i32 {
        self.arena.rows()
    }

    pub fn is_loaded(&self) -> bool {
        !self.tiles.is_empty()
    }

    /// Is `(x, y)` a cell of the loaded grid?
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.is_loaded() && x >= 0 && y >= 0 && x < self.cols() && y < self.rows()
    }

    pub fn get(&self, x: i32, y: i32) -> Result<Tile, GridError> {
        if !self.contains(x, y) {
            return Err(self.out_of_bounds(x, y));
        }
        Ok(self.tiles[y as usize][x as usize])
    }

    pub fn set(&mut self, x: i32, y: i32, tile: Tile) -> Result<(), GridError> {
        if !self.contains(x, y) {
            return Err(self.out_of_bounds(x, y));
        }
        self.tiles[y as usize][x as usize] = tile;
        Ok(())
    }

    /// Write a tile by its level-file symbol. Unknown symbols leave the grid untouched.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn set_symbol(&mut self, x: i32, y: i32, symbol: char) -> Result<(), GridError> {
        let tile = Tile::from_symbol(symbol).ok_or(GridError::InvalidTile(symbol))?;
        self.set(x, y, tile)
    }

    /// Every cell with its tile, bottom row first.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, Tile)> + '_ {
        self.tiles.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().map(move |(x, &t)| (x as i32, y as i32, t))
        })
    }

    fn out_of_bounds(&self, x: i32, y: i32) -> GridError {
        let (width, height) = if self.is_loaded() { (self.cols(), self.rows()) } else { (0, 0) };
        GridError::OutOfBounds { x, y, width, height }
    }
}

// ── Lifecycle ──

impl TileGrid {
    /// Parse a level source and return the start position in pixels.
    ///
    /// Newlines are skipped, so a level may be wrapped at any line length.
    /// The source must contain exactly `cols * rows` symbols and exactly one
    /// start marker. On any failure the grid is left unloaded.
    pub fn load(&mut self, source: &str) -> Result<Point, LoadError> {
        self.reset();

        let cols = self.cols() as usize;
        let expected = cols * self.rows() as usize;
        let mut cells = Vec::with_capacity(expected);
        let mut start = None;

        for c in source.chars().filter(|&c| c != '\n' && c != '\r') {
            let index = cells.len();
            let tile = if c == START_MARKER {
                if start.is_some() {
                    return Err(LoadError::DuplicateStart { index });
                }
                start = Some(self.arena.tile_origin((index % cols) as i32, (index / cols) as i32));
                Tile::Floor
            } else {
                Tile::from_symbol(c).ok_or(LoadError::UnknownSymbol { symbol: c, index })?
            };
            cells.push(tile);
        }

        if cells.len() != expected {
            return Err(LoadError::WrongLength { expected, found: cells.len() });
        }
        let start = start.ok_or(LoadError::MissingStart)?;

        self.tiles = cells.chunks(cols).map(|row| row.to_vec()).collect();
        self.base_tiles = self.tiles.clone();
        self.anim_counter = 0;
        Ok(start)
    }

    /// Read and parse a level file.
    pub fn load_file(&mut self, path: &Path) -> Result<Point, LoadError> {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(source) => {
                self.reset();
                return Err(LoadError::Unreadable { path: path.to_path_buf(), source });
            }
        };
        self.load(&text)
    }

    /// Drop all tile state. The grid is unloaded until the next `load`.
    pub fn reset(&mut self) {
        self.tiles.clear();
        self.base_tiles.clear();
        self.anim_counter = 0;
    }

    /// Put every tile back to its as-loaded value (smashed walls return).
    pub fn restore(&mut self) {
        self.tiles = self.base_tiles.clone();
    }

    /// Advance the void animation by one frame.
    ///
    /// Every `anim_period` calls, each `Empty` cell becomes `AnimatedEmpty`
    /// and vice versa. Returns true on the frames where cells toggled.
    pub fn animate_tick(&mut self) -> bool {
        if !self.is_loaded() || self.anim_period == 0 {
            return false;
        }
        self.anim_counter = (self.anim_counter + 1) % self.anim_period;
        if self.anim_counter != 0 {
            return false;
        }
        for row in &mut self.tiles {
            for tile in row.iter_mut() {
                if let Some(next) = tile.animation_partner() {
                    *tile = next;
                }
            }
        }
        true
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn arena(cols: i32, rows: i32) -> Arena {
        Arena { tile_size: 16, width_px: cols * 16, height_px: rows * 16, border_margin: 4 }
    }

    /// Build a loaded grid from rows listed bottom row first.
    /// A start marker is not required: the first `.` doubles as start.
    pub(crate) fn grid_from(rows: &[&str]) -> TileGrid {
        let cols = rows[0].len() as i32;
        let mut grid = TileGrid::new(arena(cols, rows.len() as i32), 50);
        let mut src: String = rows.concat();
        if !src.contains(START_MARKER) {
            let i = src.find('.').expect("diagram needs a floor cell");
            src.replace_range(i..i + 1, "@");
        }
        grid.load(&src).expect("diagram loads");
        grid
    }

    #[test]
    fn load_returns_marker_position_and_floors_it() {
        let mut g = TileGrid::new(arena(4, 4), 50);
        let start = g.load("#..#.@.#.x..####").unwrap();
        // index 5 → column 1, row 1
        assert_eq!(start, Point::new(16, 16));
        assert_eq!(g.get(1, 1), Ok(Tile::Floor));
        assert_eq!(g.get(1, 2), Ok(Tile::Exit));
        assert_eq!(g.get(0, 3), Ok(Tile::Wall));
    }

    #[test]
    fn load_skips_newlines_anywhere() {
        let mut g = TileGrid::new(arena(4, 4), 50);
        let start = g.load("#..\n#.@.#\r\n.x..\n####\n").unwrap();
        assert_eq!(start, Point::new(16, 16));
        assert_eq!(g.get(3, 3), Ok(Tile::Wall));
    }

    #[test]
    fn load_rejects_wrong_length_and_stays_reset() {
        let mut g = TileGrid::new(arena(4, 4), 50);
        g.load("#..#.@.#.x..####").unwrap();
        let err = g.load("#..#.@.#.x..###").unwrap_err();
        assert!(matches!(err, LoadError::WrongLength { expected: 16, found: 15 }));
        assert!(!g.is_loaded());
        assert!(g.get(0, 0).is_err());
    }

    #[test]
    fn load_rejects_source_without_start() {
        let mut g = TileGrid::new(arena(4, 4), 50);
        let err = g.load("################").unwrap_err();
        assert!(matches!(err, LoadError::MissingStart));
        assert!(!g.is_loaded());
    }

    #[test]
    fn load_rejects_second_start_marker() {
        let mut g = TileGrid::new(arena(4, 4), 50);
        let err = g.load("#..#.@.#.x@.####").unwrap_err();
        assert!(matches!(err, LoadError::DuplicateStart { index: 10 }));
        assert!(!g.is_loaded());
    }

    #[test]
    fn load_rejects_unknown_symbol() {
        let mut g = TileGrid::new(arena(4, 4), 50);
        let err = g.load("#..#.@.#.x..##?#").unwrap_err();
        assert!(matches!(err, LoadError::UnknownSymbol { symbol: '?', index: 14 }));
        assert!(!g.is_loaded());
    }

    #[test]
    fn load_file_missing_is_unreadable() {
        let mut g = TileGrid::new(arena(4, 4), 50);
        let err = g.load_file(Path::new("/nonexistent/tilemaze/level.txt")).unwrap_err();
        assert!(matches!(err, LoadError::Unreadable { .. }));
        assert!(!g.is_loaded());
    }

    #[test]
    fn get_out_of_bounds() {
        let g = grid_from(&["....", "...."]);
        assert_eq!(
            g.get(4, 0),
            Err(GridError::OutOfBounds { x: 4, y: 0, width: 4, height: 2 })
        );
        assert!(g.get(-1, 0).is_err());
        assert!(g.get(0, 2).is_err());
    }

    #[test]
    fn set_then_get_and_invalid_symbol_leaves_grid() {
        let mut g = grid_from(&["....", "...."]);
        g.set(2, 1, Tile::BreakableWall).unwrap();
        assert_eq!(g.get(2, 1), Ok(Tile::BreakableWall));

        assert_eq!(g.set_symbol(2, 1, 'Q'), Err(GridError::InvalidTile('Q')));
        assert_eq!(g.get(2, 1), Ok(Tile::BreakableWall));

        g.set_symbol(2, 1, 'b').unwrap();
        assert_eq!(g.get(2, 1), Ok(Tile::BrokenWall));
        assert!(g.set(9, 9, Tile::Floor).is_err());
    }

    #[test]
    fn animate_toggles_void_on_period_boundaries_only() {
        let mut g = TileGrid::new(arena(4, 1), 3);
        g.load("@ x%").unwrap();

        assert!(!g.animate_tick());
        assert!(!g.animate_tick());
        assert_eq!(g.get(1, 0), Ok(Tile::Empty));

        assert!(g.animate_tick()); // 3rd call
        assert_eq!(g.get(1, 0), Ok(Tile::AnimatedEmpty));
        assert_eq!(g.get(0, 0), Ok(Tile::Floor));
        assert_eq!(g.get(2, 0), Ok(Tile::Exit));
        assert_eq!(g.get(3, 0), Ok(Tile::BreakableWall));

        assert!(!g.animate_tick());
        assert!(!g.animate_tick());
        assert!(g.animate_tick()); // 6th call
        assert_eq!(g.get(1, 0), Ok(Tile::Empty));
    }

    #[test]
    fn restore_brings_back_smashed_walls() {
        let mut g = grid_from(&[".%..", "...."]);
        g.set(1, 0, Tile::BrokenWall).unwrap();
        g.restore();
        assert_eq!(g.get(1, 0), Ok(Tile::BreakableWall));
    }

    #[test]
    fn reset_unloads() {
        let mut g = grid_from(&["...."]);
        g.reset();
        assert!(!g.is_loaded());
        assert_eq!(g.cells().count(), 0);
        assert!(!g.animate_tick());
    }

    #[test]
    fn occupied_tile_rounds_to_larger_share() {
        let a = arena(8, 8);
        assert_eq!(a.occupied_tile(Point::new(32, 32)), (2, 2));
        assert_eq!(a.occupied_tile(Point::new(40, 32)), (2, 2)); // exactly half stays
        assert_eq!(a.occupied_tile(Point::new(41, 36)), (3, 2));
        assert_eq!(a.occupied_tile(Point::new(20, 60)), (1, 4));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn any_tile() -> impl Strategy<Value = Tile> {
            prop::sample::select(Tile::ALL.to_vec())
        }

        proptest! {
            #[test]
            fn set_then_get_returns_written_tile(x in 0i32..6, y in 0i32..4, t in any_tile()) {
                let mut g = grid_from(&["......", "......", "......", "......"]);
                g.set(x, y, t).unwrap();
                prop_assert_eq!(g.get(x, y), Ok(t));
            }

            #[test]
            fn invalid_symbol_never_changes_grid(
                x in 0i32..6, y in 0i32..4,
                c in any::<char>().prop_filter("not a tile symbol", |c| Tile::from_symbol(*c).is_none()),
            ) {
                let mut g = grid_from(&["......", "......", "......", "......"]);
                let before: Vec<_> = g.cells().collect();
                prop_assert_eq!(g.set_symbol(x, y, c), Err(GridError::InvalidTile(c)));
                let after: Vec<_> = g.cells().collect();
                prop_assert_eq!(before, after);
            }
        }
    }
}
