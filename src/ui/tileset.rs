/// Procedurally generated tile and player sprites.
///
/// Every decorated tile (walls, rubble, exit) is drawn with transparency and
/// composited over the floor sprite, so gaps in the decoration show floor.
/// The two void frames and the floor itself are opaque.

use crate::domain::entity::Facing;
use crate::domain::tile::Tile;
use super::surface::{Pixel, Sprite};

pub struct Tileset {
    tiles: Vec<Sprite>, // indexed like Tile::ALL
    player_left: Sprite,
    player_right: Sprite,
}

fn tile_index(t: Tile) -> usize {
    Tile::ALL.iter().position(|&x| x == t).unwrap_or(0)
}

/// Deterministic per-pixel hash for texture noise.
fn noise(x: i32, y: i32, seed: u32) -> u32 {
    let mut h = (x as u32).wrapping_mul(0x27d4_eb2d) ^ (y as u32).wrapping_mul(0x1656_67b1) ^ seed;
    h ^= h >> 15;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h
}

fn shade(p: Pixel, delta: i32) -> Pixel {
    let f = |c: u8| (c as i32 + delta).clamp(0, 255) as u8;
    Pixel::rgba(f(p.r), f(p.g), f(p.b), p.a)
}

impl Tileset {
    pub fn generate(size: i32) -> Self {
        let floor = gen_floor(size);
        let over_floor = |s: Sprite| s.composite_over(&floor);

        let tiles = Tile::ALL
            .iter()
            .map(|&t| match t {
                Tile::Empty => gen_void(size, 0),
                Tile::AnimatedEmpty => gen_void(size, 1),
                Tile::Floor => floor.clone(),
                Tile::Wall => over_floor(gen_bricks(size, Pixel::rgb(110, 110, 120), false)),
                Tile::BreakableWall => over_floor(gen_bricks(size, Pixel::rgb(150, 90, 50), true)),
                Tile::BrokenWall => over_floor(gen_rubble(size)),
                Tile::Exit => over_floor(gen_exit(size)),
            })
            .collect();

        let player_right = gen_player(size, Facing::Right);
        let player_left = gen_player(size, Facing::Left);
        Tileset { tiles, player_left, player_right }
    }

    pub fn tile(&self, t: Tile) -> &Sprite {
        &self.tiles[tile_index(t)]
    }

    pub fn player(&self, facing: Facing) -> &Sprite {
        match facing {
            Facing::Left => &self.player_left,
            Facing::Right => &self.player_right,
        }
    }
}

// ── Generators ──

fn gen_floor(size: i32) -> Sprite {
    let base = Pixel::rgb(176, 160, 128);
    let mut s = Sprite::new(size, base);
    for y in 0..size {
        for x in 0..size {
            let d = (noise(x, y, 7) % 17) as i32 - 8;
            let seam = x == 0 || y == 0;
            s.set(x, y, shade(base, if seam { d - 24 } else { d }));
        }
    }
    s
}

/// Dark void with a sparse star field; `frame` shifts the stars.
fn gen_void(size: i32, frame: u32) -> Sprite {
    let mut s = Sprite::new(size, Pixel::rgb(8, 8, 20));
    for y in 0..size {
        for x in 0..size {
            if noise(x, y, 101 + frame) % 23 == 0 {
                let glow = 120 + (noise(x, y, 55) % 100) as u8;
                s.set(x, y, Pixel::rgb(glow, glow, glow.saturating_add(30)));
            }
        }
    }
    s
}

/// Running-bond bricks with mortar left transparent.
fn gen_bricks(size: i32, brick: Pixel, cracked: bool) -> Sprite {
    let mut s = Sprite::new(size, Pixel::TRANSPARENT);
    let course = (size / 4).max(1);
    let length = (size / 2).max(1);
    for y in 0..size {
        let row = y / course;
        let offset = if row % 2 == 0 { 0 } else { length / 2 };
        for x in 0..size {
            let mortar = y % course == course - 1 || (x + offset) % length == length - 1;
            if mortar {
                continue;
            }
            let d = (noise(x, y, 13) % 21) as i32 - 10;
            s.set(x, y, shade(brick, d));
        }
    }
    if cracked {
        // A zig-zag crack down the middle, see-through to the floor.
        let mid = size / 2;
        for y in 0..size {
            let x = mid + if (y / 2) % 2 == 0 { 0 } else { 1 };
            s.set(x, y, Pixel::rgba(30, 20, 10, 160));
        }
    }
    s
}

fn gen_rubble(size: i32) -> Sprite {
    let mut s = Sprite::new(size, Pixel::TRANSPARENT);
    for y in 0..size / 3 {
        for x in 0..size {
            if noise(x, y, 29) % 3 == 0 {
                s.set(x, y, shade(Pixel::rgb(150, 90, 50), (noise(x, y, 31) % 30) as i32 - 15));
            }
        }
    }
    s
}

/// A glowing ring.
fn gen_exit(size: i32) -> Sprite {
    let mut s = Sprite::new(size, Pixel::TRANSPARENT);
    let c = (size as f32 - 1.0) / 2.0;
    let outer = size as f32 * 0.45;
    let inner = size as f32 * 0.25;
    for y in 0..size {
        for x in 0..size {
            let d = ((x as f32 - c).powi(2) + (y as f32 - c).powi(2)).sqrt();
            if d <= outer && d >= inner {
                s.set(x, y, Pixel::rgb(60, 220, 90));
            } else if d < inner {
                s.set(x, y, Pixel::rgba(160, 255, 180, 110));
            }
        }
    }
    s
}

/// A round-bodied figure; the eye sits on the facing side.
fn gen_player(size: i32, facing: Facing) -> Sprite {
    let mut s = Sprite::new(size, Pixel::TRANSPARENT);
    let body = Pixel::rgb(230, 70, 60);
    let c = (size as f32 - 1.0) / 2.0;
    let r = size as f32 * 0.38;
    let cy = c - size as f32 * 0.05;
    for y in 0..size {
        for x in 0..size {
            let d = ((x as f32 - c).powi(2) + (y as f32 - cy).powi(2)).sqrt();
            if d <= r {
                s.set(x, y, shade(body, ((cy - y as f32) * 3.0) as i32));
            }
        }
    }
    let eye_x = match facing {
        Facing::Left => (c - r * 0.5).round() as i32,
        Facing::Right => (c + r * 0.5).round() as i32,
    };
    let eye_y = (cy + r * 0.35).round() as i32;
    s.set(eye_x, eye_y, Pixel::rgb(255, 255, 255));
    s.set(eye_x, eye_y - 1, Pixel::rgb(20, 20, 20));
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tile_sprite_is_opaque_and_tile_sized() {
        let ts = Tileset::generate(16);
        for t in Tile::ALL {
            let s = ts.tile(t);
            assert_eq!(s.size(), 16, "{t:?}");
            for y in 0..16 {
                for x in 0..16 {
                    assert_eq!(s.get(x, y).a, 255, "{t:?} at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn decorated_tiles_show_floor_through_gaps() {
        let ts = Tileset::generate(16);
        let floor = ts.tile(Tile::Floor);
        let wall = ts.tile(Tile::Wall);
        // Top mortar line of the first course is transparent in the bricks.
        assert_eq!(wall.get(5, 3), floor.get(5, 3));
        assert_ne!(wall.get(2, 1), floor.get(2, 1));
    }

    #[test]
    fn void_frames_differ_and_players_mirror() {
        let ts = Tileset::generate(16);
        assert_ne!(ts.tile(Tile::Empty), ts.tile(Tile::AnimatedEmpty));
        assert_ne!(ts.player(Facing::Left), ts.player(Facing::Right));
        // Corners stay see-through so the tile underneath shows.
        assert_eq!(ts.player(Facing::Left).get(0, 0).a, 0);
    }
}
