/// Movement rules, truth-table driven.
///
/// Pure functions over the grid, no side effects.
/// These encode "what is legal" without performing the move.
///
/// The player is a tile-sized box at pixel `(x, y)` (its lower-left corner).
/// Speed need not divide the tile size, so the box may straddle two
/// columns (`x % tile != 0`) or two rows (`y % tile != 0`).
///
/// Notation: `xt = x / tile`, `yt = y / tile`, `x_off = x % tile != 0`,
/// `y_off = y % tile != 0`, `H`/`W` = arena height/width in pixels,
/// `m` = border margin. "wall" = `Wall` or `BreakableWall`.
///
/// ## Movement Truth Table
///
/// Rows are evaluated top to bottom; the first matching row decides.
///
/// ### Up (+y)
/// ┌──────────────────────────────┬────────┐
/// │ Condition                     │ Result │
/// ├──────────────────────────────┼────────┤
/// │ y + tile >= H - m             │ DENY   │
/// │ (xt, yt+1) is wall            │ DENY   │
/// │ x_off && (xt+1, yt+1) is wall │ DENY   │
/// │ Otherwise                     │ ALLOW  │
/// └──────────────────────────────┴────────┘
///
/// ### Down (-y)
/// ┌──────────────────────────────┬────────┐
/// │ y <= m                        │ DENY   │
/// │ y_off                         │ ALLOW  │
/// │ (xt, yt-1) is wall            │ DENY   │
/// │ x_off && (xt+1, yt-1) is wall │ DENY   │
/// │ Otherwise                     │ ALLOW  │
/// └──────────────────────────────┴────────┘
///
/// ### Left (-x)
/// ┌──────────────────────────────┬────────┐
/// │ x <= m                        │ DENY   │
/// │ x_off                         │ ALLOW  │
/// │ (xt-1, yt) is wall            │ DENY   │
/// │ y_off && (xt-1, yt+1) is wall │ DENY   │
/// │ Otherwise                     │ ALLOW  │
/// └──────────────────────────────┴────────┘
///
/// ### Right (+x)
/// ┌──────────────────────────────┬────────┐
/// │ x + tile >= W - m             │ DENY   │
/// │ (xt+1, yt) is wall            │ DENY   │
/// │ y_off && (xt+1, yt+1) is wall │ DENY   │
/// │ Otherwise                     │ ALLOW  │
/// └──────────────────────────────┴────────┘
///
/// Down and Left allow any step while the box is still inside its current
/// row/column on the primary axis; Up and Right always look ahead. The two
/// halves are deliberately not unified.

use super::entity::MoveDir;
use super::grid::TileGrid;

/// Can the player take one step in `dir` from pixel `(x, y)`? See table above.
pub fn can_move(grid: &TileGrid, x: i32, y: i32, dir: MoveDir) -> bool {
    let arena = grid.arena();
    let ts = arena.tile_size;
    let m = arena.border_margin;

    let x_off = x % ts != 0;
    let y_off = y % ts != 0;
    let xt = x / ts;
    let yt = y / ts;

    match dir {
        MoveDir::Up => {
            if y + ts >= arena.height_px - m { return false; }
            if is_wall(grid, xt, yt + 1) { return false; }
            if x_off && is_wall(grid, xt + 1, yt + 1) { return false; }
        }
        MoveDir::Down => {
            if y <= m { return false; }
            if y_off { return true; }
            if is_wall(grid, xt, yt - 1) { return false; }
            if x_off && is_wall(grid, xt + 1, yt - 1) { return false; }
        }
        MoveDir::Left => {
            if x <= m { return false; }
            if x_off { return true; }
            if is_wall(grid, xt - 1, yt) { return false; }
            if y_off && is_wall(grid, xt - 1, yt + 1) { return false; }
        }
        MoveDir::Right => {
            if x + ts >= arena.width_px - m { return false; }
            if is_wall(grid, xt + 1, yt) { return false; }
            if y_off && is_wall(grid, xt + 1, yt + 1) { return false; }
        }
    }
    true
}

/// Wall check for a tile the border test has already proven to be in range.
/// A miss here means the margin checks above are wrong.
#[inline]
fn is_wall(grid: &TileGrid, x: i32, y: i32) -> bool {
    match grid.get(x, y) {
        Ok(t) => t.blocks_movement(),
        Err(e) => {
            debug_assert!(false, "collision probe left the grid: {e}");
            true
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
