/// Keyboard state tracker.
///
/// Keeps the held state of every key, so that:
///   - movement continues while a direction key is held
///   - smash, retry and next-level fire once per press
///   - moving and smashing can happen in the same frame
///
/// Release events are honored only when the terminal reports them
/// (keyboard enhancement). Otherwise a key counts as released once no
/// Press/Repeat has arrived for `HOLD_TIMEOUT`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::FrameInput;

const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key table ──

const KEYS_UP: &[KeyCode] = &[KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Up];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Char('s'), KeyCode::Char('S'), KeyCode::Down];
const KEYS_LEFT: &[KeyCode] = &[KeyCode::Char('a'), KeyCode::Char('A'), KeyCode::Left];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Char('d'), KeyCode::Char('D'), KeyCode::Right];
const KEYS_SMASH: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_RETRY: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_ADVANCE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc];

pub struct InputState {
    /// Last Press/Repeat per key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,
    /// Raw key events from the last drain, for modifier checks.
    raw_events: Vec<KeyEvent>,
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Read every pending terminal event without blocking. Call once per
    /// frame before sampling.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            let Ok(Event::Key(key)) = event::read() else {
                continue;
            };
            self.raw_events.push(key);
            match key.kind {
                KeyEventKind::Release if self.honor_release => {
                    self.last_active.remove(&key.code);
                }
                KeyEventKind::Release => {}
                _ => self.press(key.code),
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn press(&mut self, code: KeyCode) {
        if !self.is_held(code) {
            self.fresh_presses.push(code);
        }
        self.last_active.insert(code, Instant::now());
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .is_some_and(|t| t.elapsed() < HOLD_TIMEOUT)
    }

    fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|&c| self.is_held(c))
    }

    fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    /// Snapshot of the key table for one frame.
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            up: self.any_held(KEYS_UP),
            down: self.any_held(KEYS_DOWN),
            left: self.any_held(KEYS_LEFT),
            right: self.any_held(KEYS_RIGHT),
            smash: self.any_pressed(KEYS_SMASH),
            retry: self.any_pressed(KEYS_RETRY),
            advance: self.any_pressed(KEYS_ADVANCE),
        }
    }

    /// Esc, or Ctrl+C (raw mode delivers it as a key).
    pub fn quit_requested(&self) -> bool {
        self.any_pressed(KEYS_QUIT)
            || self.raw_events.iter().any(|k| {
                k.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
            })
    }
}
