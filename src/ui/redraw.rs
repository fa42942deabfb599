/// Incremental repaint of the pixel frame.
///
/// After a frame in which the player moved or broke walls, only the tiles
/// around the player are blitted again, then the player on top. Full
/// repaints happen on level load and retry; the void animation repaints
/// just the void cells.

use crate::domain::entity::Player;
use crate::domain::grid::TileGrid;
use super::surface::Surface;
use super::tileset::Tileset;

/// Inclusive rectangle of tile coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DirtyRegion {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl DirtyRegion {
    #[cfg(test)]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.x0..=self.x1).contains(&x) && (self.y0..=self.y1).contains(&y)
    }

    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let (x0, x1) = (self.x0, self.x1);
        (self.y0..=self.y1).flat_map(move |y| (x0..=x1).map(move |x| (x, y)))
    }
}

/// Tiles centred on the player's tile, reaching `speed` tiles each way,
/// clamped to the grid.
pub fn dirty_region(player: &Player, grid: &TileGrid) -> DirtyRegion {
    let ts = grid.arena().tile_size;
    let (cx, cy) = (player.pos.x / ts, player.pos.y / ts);
    let r = player.speed;
    DirtyRegion {
        x0: (cx - r).max(0),
        y0: (cy - r).max(0),
        x1: (cx + r).min(grid.cols() - 1),
        y1: (cy + r).min(grid.rows() - 1),
    }
}

fn draw_tile<S: Surface>(surface: &mut S, tileset: &Tileset, grid: &TileGrid, x: i32, y: i32) {
    if let Ok(t) = grid.get(x, y) {
        surface.blit(tileset.tile(t), grid.arena().tile_origin(x, y));
    }
}

pub fn draw_actor<S: Surface>(surface: &mut S, tileset: &Tileset, player: &Player) {
    surface.blit(tileset.player(player.facing), player.pos);
}

/// Repaint the dirty region, then the player.
pub fn redraw<S: Surface>(surface: &mut S, tileset: &Tileset, player: &Player, grid: &TileGrid) {
    for (x, y) in dirty_region(player, grid).cells() {
        draw_tile(surface, tileset, grid, x, y);
    }
    draw_actor(surface, tileset, player);
}

/// Repaint the given cells, then the player.
pub fn redraw_cells<S: Surface>(surface: &mut S, tileset: &Tileset, player: &Player, grid: &TileGrid, cells: &[(i32, i32)]) {
    for &(x, y) in cells {
        draw_tile(surface, tileset, grid, x, y);
    }
    draw_actor(surface, tileset, player);
}

/// Repaint every tile, then the player.
pub fn draw_full<S: Surface>(surface: &mut S, tileset: &Tileset, player: &Player, grid: &TileGrid) {
    for (x, y, t) in grid.cells() {
        surface.blit(tileset.tile(t), grid.arena().tile_origin(x, y));
    }
    draw_actor(surface, tileset, player);
}

/// Repaint the void cells after an animation toggle.
pub fn redraw_animated<S: Surface>(surface: &mut S, tileset: &Tileset, grid: &TileGrid) {
    for (x, y, t) in grid.cells() {
        if t.is_lethal() {
            surface.blit(tileset.tile(t), grid.arena().tile_origin(x, y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Point;
    use crate::domain::grid::tests::grid_from;
    use crate::ui::surface::Sprite;

    /// Surface that only records where blits land.
    #[derive(Default)]
    struct Recorder {
        blits: Vec<Point>,
    }

    impl Surface for Recorder {
        fn blit(&mut self, _sprite: &Sprite, at: Point) {
            self.blits.push(at);
        }
    }

    fn open(cols: usize, rows: usize) -> TileGrid {
        let row = ".".repeat(cols);
        let rows: Vec<&str> = (0..rows).map(|_| row.as_str()).collect();
        grid_from(&rows)
    }

    fn player(x: i32, y: i32, speed: i32) -> Player {
        Player::new(Point::new(x, y), speed, 100)
    }

    #[test]
    fn region_is_centred_and_clamped() {
        let g = open(20, 12);
        let p = player(10 * 16, 6 * 16, 2);
        assert_eq!(dirty_region(&p, &g), DirtyRegion { x0: 8, y0: 4, x1: 12, y1: 8 });

        let p = player(16, 16, 4);
        assert_eq!(dirty_region(&p, &g), DirtyRegion { x0: 0, y0: 0, x1: 5, y1: 5 });

        let p = player(19 * 16, 11 * 16, 4);
        assert_eq!(dirty_region(&p, &g), DirtyRegion { x0: 15, y0: 7, x1: 19, y1: 11 });
    }

    #[test]
    fn region_uses_truncating_tile_of_player() {
        let g = open(20, 12);
        // 15px into tile 4: centre stays on 4 even though the player mostly covers 5.
        let p = player(4 * 16 + 15, 32, 1);
        let r = dirty_region(&p, &g);
        assert_eq!((r.x0, r.x1), (3, 5));
    }

    #[test]
    fn redraw_blits_region_then_player() {
        let g = open(20, 12);
        let ts = Tileset::generate(16);
        let p = player(10 * 16 + 4, 6 * 16, 1);
        let mut rec = Recorder::default();
        redraw(&mut rec, &ts, &p, &g);

        assert_eq!(rec.blits.len(), 9 + 1);
        assert_eq!(rec.blits.last(), Some(&p.pos));
        let region = dirty_region(&p, &g);
        for at in &rec.blits[..9] {
            assert_eq!(at.x % 16, 0);
            assert!(region.contains(at.x / 16, at.y / 16));
        }
    }

    #[test]
    fn redraw_covers_a_full_step_in_any_direction() {
        let g = open(20, 12);
        let ts = Tileset::generate(16);
        let mut p = player(10 * 16, 6 * 16, 4);
        for dir in crate::domain::entity::MoveDir::ALL {
            p.settle();
            assert!(p.request_move(dir, &g));
            let region = dirty_region(&p, &g);
            let (px, py) = (p.prev_pos.x / 16, p.prev_pos.y / 16);
            // Old sprite footprint (up to 2×2 tiles) is inside the region.
            for (x, y) in [(px, py), (px + 1, py), (px, py + 1), (px + 1, py + 1)] {
                assert!(region.contains(x, y), "{dir:?}: ({x}, {y})");
            }
            let mut rec = Recorder::default();
            redraw(&mut rec, &ts, &p, &g);
            assert_eq!(rec.blits.len() as i32, (region.x1 - region.x0 + 1) * (region.y1 - region.y0 + 1) + 1);
        }
    }

    #[test]
    fn redraw_cells_skips_out_of_grid() {
        let g = open(6, 4);
        let ts = Tileset::generate(16);
        let p = player(16, 16, 4);
        let mut rec = Recorder::default();
        redraw_cells(&mut rec, &ts, &p, &g, &[(2, 1), (9, 9)]);
        assert_eq!(rec.blits, vec![Point::new(32, 16), p.pos]);
    }

    #[test]
    fn draw_full_blits_every_cell_once() {
        let g = open(6, 4);
        let ts = Tileset::generate(16);
        let mut rec = Recorder::default();
        draw_full(&mut rec, &ts, &player(16, 16, 4), &g);
        assert_eq!(rec.blits.len(), 6 * 4 + 1);
    }

    #[test]
    fn redraw_animated_touches_only_void() {
        let mut g = grid_from(&[
            ". .%",
            "x  .",
        ]);
        g.set(1, 1, crate::domain::tile::Tile::AnimatedEmpty).unwrap();
        let ts = Tileset::generate(16);
        let mut rec = Recorder::default();
        redraw_animated(&mut rec, &ts, &g);
        let mut got = rec.blits.clone();
        got.sort_by_key(|p| (p.y, p.x));
        assert_eq!(got, vec![Point::new(16, 0), Point::new(16, 16), Point::new(32, 16)]);
    }
}
