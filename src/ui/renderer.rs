/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The arena is presented from the pixel frame: each tile becomes two
/// terminal columns by one row, and each terminal cell shows the average
/// colour of the top half of its pixels as foreground of `▀` and the bottom
/// half as background. Pixel rows are y-up, terminal rows grow downward.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::sim::world::{Phase, WorldState};
use super::surface::{Pixel, PixelBuffer};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every blank cell, so inter-row gaps match.
    const BASE_BG: Color = Color::Rgb { r: 12, g: 12, b: 24 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Differs from any real cell; forces a repaint of every position.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

fn to_color(p: Pixel) -> Color {
    Color::Rgb { r: p.r, g: p.g, b: p.b }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell { ch, fg, bg });
        }
    }
}

// ── Layout ──

/// Terminal columns per tile.
const CELL_W: usize = 2;
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 1;

const HELP: &str = "WASD/arrows move  Space smash  R retry  P next level  Esc quit";

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    key_release: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(32768, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            key_release: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        self.fit_terminal(true)
    }

    /// Ask the terminal for key release events. Returns whether it
    /// will send them.
    pub fn enable_key_release(&mut self) -> bool {
        if !terminal::supports_keyboard_enhancement().unwrap_or(false) {
            return false;
        }
        let flags = KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
        self.key_release = execute!(self.writer, PushKeyboardEnhancementFlags(flags)).is_ok();
        self.key_release
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.key_release {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn fit_terminal(&mut self, force: bool) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 30));
        if force || tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        Ok(())
    }

    /// Present the pixel frame plus HUD and any overlay for the current phase.
    pub fn render(&mut self, world: &WorldState, frame: &PixelBuffer) -> io::Result<()> {
        self.fit_terminal(false)?;

        self.front.clear();
        compose(&mut self.front, world, frame);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

// ── Compose: build front buffer content ──

fn compose(buf: &mut FrameBuffer, w: &WorldState, frame: &PixelBuffer) {
    let arena = w.grid.arena();
    let map_cols = arena.cols() as usize * CELL_W;
    let map_rows = arena.rows() as usize;
    let left = buf.width.saturating_sub(map_cols) / 2;

    compose_hud(buf, w, left);
    compose_map(buf, frame, arena.tile_size, left);
    buf.put_str(left, MAP_ROW + map_rows, HELP, Color::DarkGrey, Cell::BASE_BG);

    let lines: &[&str] = match w.phase {
        Phase::Playing => &[],
        Phase::Escaped => &["LEVEL CLEARED", "", "Press P for the next level"],
        Phase::Dead => &["GAME OVER", "", "Press R to try again"],
        Phase::Victory => &["ALL LEVELS CLEARED!", "", "Press R to play again"],
    };
    if !lines.is_empty() {
        let accent = match w.phase {
            Phase::Dead => Color::Rgb { r: 255, g: 70, b: 70 },
            _ => Color::Rgb { r: 90, g: 240, b: 120 },
        };
        compose_overlay(buf, lines, accent, left, map_cols, map_rows);
    }
}

fn compose_hud(buf: &mut FrameBuffer, w: &WorldState, left: usize) {
    let smash = if w.player.can_smash() {
        "ready".to_string()
    } else {
        format!("{:>3}", w.player.smash_cooldown)
    };
    let hud = format!(
        " Level {}/{}   Smash: {}",
        w.level_number(),
        w.total_levels(),
        smash,
    );
    buf.put_str(left, HUD_ROW, &hud, Color::Rgb { r: 255, g: 220, b: 90 }, Cell::BASE_BG);
}

/// Downsample the pixel frame into half-block cells.
fn compose_map(buf: &mut FrameBuffer, frame: &PixelBuffer, ts: i32, left: usize) {
    let cols = (frame.width() / ts) as usize * CELL_W;
    let rows = (frame.height() / ts) as usize;
    let col_w = ts / CELL_W as i32;
    let half = ts / 2;

    for row in 0..rows {
        // Terminal row 0 is the top tile row.
        let y0 = (rows - 1 - row) as i32 * ts;
        for col in 0..cols {
            let tx = (col / CELL_W) as i32 * ts;
            let sub = (col % CELL_W) as i32;
            let x0 = tx + sub * col_w;
            let x1 = if sub + 1 == CELL_W as i32 { tx + ts } else { x0 + col_w };

            let top = frame.average(x0, y0 + half, x1, y0 + ts);
            let bottom = frame.average(x0, y0, x1, y0 + half);
            buf.set(
                left + col,
                MAP_ROW + row,
                Cell { ch: '▀', fg: to_color(top), bg: to_color(bottom) },
            );
        }
    }
}

fn compose_overlay(buf: &mut FrameBuffer, lines: &[&str], accent: Color, left: usize, map_cols: usize, map_rows: usize) {
    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
    let box_w = inner + 2;
    let box_h = lines.len() + 4;
    let x0 = left + map_cols.saturating_sub(box_w) / 2;
    let y0 = MAP_ROW + map_rows.saturating_sub(box_h) / 2;
    let bg = Color::Rgb { r: 20, g: 20, b: 30 };

    let horizontal = "─".repeat(inner);
    buf.put_str(x0, y0, &format!("┌{horizontal}┐"), accent, bg);
    for i in 1..box_h - 1 {
        buf.put_str(x0, y0 + i, &format!("│{}│", " ".repeat(inner)), accent, bg);
    }
    buf.put_str(x0, y0 + box_h - 1, &format!("└{horizontal}┘"), accent, bg);

    for (i, line) in lines.iter().enumerate() {
        let pad = (inner - line.chars().count()) / 2;
        let fg = if i == 0 { accent } else { Color::White };
        buf.put_str(x0 + 1 + pad, y0 + 2 + i, line, fg, bg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpeedConfig;
    use crate::domain::grid::{Arena, Point};
    use crate::sim::level::{load_level, LevelSource};
    use crate::ui::surface::{Sprite, Surface};

    fn world() -> WorldState {
        let arena = Arena { tile_size: 4, width_px: 16, height_px: 12, border_margin: 1 };
        let speed = SpeedConfig { frame_ms: 16, move_speed: 1, smash_cooldown: 10, animation_period: 50 };
        let levels = vec![
            LevelSource::Embedded { name: "a", text: "#@.x########" },
            LevelSource::Embedded { name: "b", text: "#@.x########" },
        ];
        let mut w = WorldState::new(arena, speed, levels);
        load_level(&mut w, 0).unwrap();
        w
    }

    fn row_text(buf: &FrameBuffer, y: usize) -> String {
        (0..buf.width).map(|x| buf.get(x, y).ch).collect()
    }

    #[test]
    fn map_rows_are_flipped_and_halves_split() {
        let mut frame = PixelBuffer::new(16, 12);
        // Bottom tile row red; the top half of tile (0, 2) green.
        frame.blit(&Sprite::new(4, Pixel::rgb(255, 0, 0)), Point::new(0, 0));
        let mut green_top = Sprite::new(4, Pixel::TRANSPARENT);
        for y in 2..4 {
            for x in 0..4 {
                green_top.set(x, y, Pixel::rgb(0, 255, 0));
            }
        }
        frame.blit(&green_top, Point::new(0, 8));

        let mut buf = FrameBuffer::new(8, 6);
        compose_map(&mut buf, &frame, 4, 0);

        let top_left = buf.get(0, MAP_ROW);
        assert_eq!(top_left.ch, '▀');
        assert_eq!(top_left.fg, Color::Rgb { r: 0, g: 255, b: 0 });
        assert_eq!(top_left.bg, Color::Rgb { r: 0, g: 0, b: 0 });

        let bottom_left = buf.get(1, MAP_ROW + 2);
        assert_eq!(bottom_left.fg, Color::Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(bottom_left.bg, Color::Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(buf.get(2, MAP_ROW + 2).bg, Color::Rgb { r: 0, g: 0, b: 0 });
    }

    #[test]
    fn hud_shows_level_and_cooldown() {
        let mut w = world();
        let frame = PixelBuffer::new(16, 12);
        let mut buf = FrameBuffer::new(70, 6);
        compose(&mut buf, &w, &frame);
        assert!(row_text(&buf, HUD_ROW).contains("Level 1/2   Smash: ready"));

        w.player.smash_cooldown = 7;
        buf.clear();
        compose(&mut buf, &w, &frame);
        assert!(row_text(&buf, HUD_ROW).contains("Smash:   7"));
    }

    #[test]
    fn overlay_only_outside_play() {
        let mut w = world();
        let frame = PixelBuffer::new(16, 12);
        let mut buf = FrameBuffer::new(70, 20);
        let has = |buf: &FrameBuffer, s: &str| (0..buf.height).any(|y| row_text(buf, y).contains(s));

        compose(&mut buf, &w, &frame);
        assert!(!has(&buf, "GAME OVER"));

        w.phase = Phase::Dead;
        buf.clear();
        compose(&mut buf, &w, &frame);
        assert!(has(&buf, "GAME OVER"));
        assert!(has(&buf, "Press R"));

        w.phase = Phase::Escaped;
        buf.clear();
        compose(&mut buf, &w, &frame);
        assert!(has(&buf, "Press P"));
    }
}
