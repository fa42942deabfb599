/// Pixel surfaces: RGBA pixels, tile-sized sprites, and the blit target.
///
/// All pixel coordinates are y-up: `(0, 0)` is the bottom-left pixel, the
/// same convention as the arena. Only the terminal renderer flips rows.

use crate::domain::grid::Point;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub const TRANSPARENT: Pixel = Pixel { r: 0, g: 0, b: 0, a: 0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Pixel { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Pixel { r, g, b, a }
    }

    /// Source-over compositing of `self` onto an opaque `dst`.
    pub fn over(self, dst: Pixel) -> Pixel {
        let a = self.a as u32;
        let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8;
        Pixel {
            r: mix(self.r, dst.r),
            g: mix(self.g, dst.g),
            b: mix(self.b, dst.b),
            a: 255,
        }
    }
}

/// A square image, one tile in size.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    size: i32,
    pixels: Vec<Pixel>,
}

impl Sprite {
    pub fn new(size: i32, fill: Pixel) -> Self {
        let n = (size.max(0) * size.max(0)) as usize;
        Sprite { size, pixels: vec![fill; n] }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.size && y < self.size)
            .then(|| (y * self.size + x) as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Pixel {
        self.index(x, y).map_or(Pixel::TRANSPARENT, |i| self.pixels[i])
    }

    pub fn set(&mut self, x: i32, y: i32, p: Pixel) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = p;
        }
    }

    /// This sprite drawn over `base`; the result is opaque wherever `base` is.
    pub fn composite_over(&self, base: &Sprite) -> Sprite {
        let mut out = base.clone();
        for (o, &s) in out.pixels.iter_mut().zip(&self.pixels) {
            *o = s.over(*o);
        }
        out
    }
}

/// Anything a sprite can be blitted onto.
pub trait Surface {
    /// Alpha-composite `sprite` with its lower-left corner at `at`.
    /// Pixels falling outside the surface are clipped.
    fn blit(&mut self, sprite: &Sprite, at: Point);
}

/// In-memory RGBA frame, opaque black when created.
pub struct PixelBuffer {
    width: i32,
    height: i32,
    pixels: Vec<Pixel>,
}

impl PixelBuffer {
    pub fn new(width: i32, height: i32) -> Self {
        let n = (width.max(0) * height.max(0)) as usize;
        PixelBuffer { width, height, pixels: vec![Pixel::rgb(0, 0, 0); n] }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Pixel> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Mean colour of the pixels in `[x0, x1) × [y0, y1)`, clipped.
    pub fn average(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> Pixel {
        let (x0, x1) = (x0.max(0), x1.min(self.width));
        let (y0, y1) = (y0.max(0), y1.min(self.height));
        let (mut r, mut g, mut b, mut n) = (0u32, 0u32, 0u32, 0u32);
        for y in y0..y1 {
            let row = (y * self.width) as usize;
            for p in &self.pixels[row + x0 as usize..row + x1.max(x0) as usize] {
                r += p.r as u32;
                g += p.g as u32;
                b += p.b as u32;
                n += 1;
            }
        }
        if n == 0 {
            return Pixel::rgb(0, 0, 0);
        }
        Pixel::rgb((r / n) as u8, (g / n) as u8, (b / n) as u8)
    }
}

impl Surface for PixelBuffer {
    fn blit(&mut self, sprite: &Sprite, at: Point) {
        let size = sprite.size();
        for sy in 0..size {
            let y = at.y + sy;
            if y < 0 || y >= self.height {
                continue;
            }
            for sx in 0..size {
                let x = at.x + sx;
                if x < 0 || x >= self.width {
                    continue;
                }
                let i = (y * self.width + x) as usize;
                self.pixels[i] = sprite.get(sx, sy).over(self.pixels[i]);
            }
        }
    }
}
