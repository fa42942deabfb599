/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use log::warn;
use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::grid::Arena;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub arena: Arena,
    pub speed: SpeedConfig,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeedConfig {
    pub frame_ms: u64,
    pub move_speed: i32,       // pixels per step
    pub smash_cooldown: u32,   // frames between successful smashes
    pub animation_period: u32, // frames between void animation toggles
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub smash: Vec<String>,
    pub retry: Vec<String>,
    pub advance: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    arena: TomlArena,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlArena {
    #[serde(default = "default_tile_size")]
    tile_size: i32,
    #[serde(default = "default_width_px")]
    width_px: i32,
    #[serde(default = "default_height_px")]
    height_px: i32,
    #[serde(default = "default_border_margin")]
    border_margin: i32,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_move_speed")]
    move_speed: i32,
    #[serde(default = "default_smash_cooldown")]
    smash_cooldown: u32,
    #[serde(default = "default_animation_period")]
    animation_period: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_smash")]
    smash: Vec<String>,
    #[serde(default = "default_retry")]
    retry: Vec<String>,
    #[serde(default = "default_advance")]
    advance: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

// ── Defaults ──

fn default_tile_size() -> i32 { 16 }
fn default_width_px() -> i32 { 512 }   // 32 columns
fn default_height_px() -> i32 { 384 }  // 24 rows
fn default_border_margin() -> i32 { 4 }

fn default_frame_ms() -> u64 { 16 }
fn default_move_speed() -> i32 { 4 }
fn default_smash_cooldown() -> u32 { 100 }
fn default_animation_period() -> u32 { 50 }

fn default_smash() -> Vec<String> { vec!["A".into(), "X".into(), "R1".into()] }
fn default_retry() -> Vec<String> { vec!["Start".into(), "Y".into()] }
fn default_advance() -> Vec<String> { vec!["Start".into(), "B".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_levels_dir() -> String { "levels".into() }

impl Default for TomlArena {
    fn default() -> Self {
        TomlArena {
            tile_size: default_tile_size(),
            width_px: default_width_px(),
            height_px: default_height_px(),
            border_margin: default_border_margin(),
        }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            frame_ms: default_frame_ms(),
            move_speed: default_move_speed(),
            smash_cooldown: default_smash_cooldown(),
            animation_period: default_animation_period(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            smash: default_smash(),
            retry: default_retry(),
            advance: default_advance(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
        }
    }
}

// ── Validation ──

impl TomlArena {
    /// The arena must hold at least 3×3 tiles and leave the player room to
    /// move inside the margin.
    fn validated(self) -> Arena {
        let ts = self.tile_size;
        let ok = ts >= 2
            && self.width_px / ts.max(1) >= 3
            && self.height_px / ts.max(1) >= 3
            && (0..ts).contains(&self.border_margin);
        if ok {
            Arena {
                tile_size: ts,
                width_px: self.width_px,
                height_px: self.height_px,
                border_margin: self.border_margin,
            }
        } else {
            warn!(
                "config: invalid [arena] (tile {ts}, {}x{} px, margin {}); using defaults",
                self.width_px, self.height_px, self.border_margin
            );
            TomlArena::default().validated()
        }
    }
}

impl TomlSpeed {
    /// A step may not exceed the border margin (at least 1) nor reach a
    /// full tile; collision only probes the tile directly ahead.
    fn validated(mut self, arena: &Arena) -> SpeedConfig {
        if self.frame_ms == 0 {
            warn!("config: frame_ms must be positive; using {}", default_frame_ms());
            self.frame_ms = default_frame_ms();
        }
        let max_speed = arena.border_margin.max(1).min(arena.tile_size - 1);
        if !(1..=max_speed).contains(&self.move_speed) {
            let fallback = default_move_speed().min(max_speed);
            warn!(
                "config: move_speed {} must be in 1..={max_speed}; using {fallback}",
                self.move_speed
            );
            self.move_speed = fallback;
        }
        if self.animation_period == 0 {
            warn!("config: animation_period must be positive; using {}", default_animation_period());
            self.animation_period = default_animation_period();
        }
        SpeedConfig {
            frame_ms: self.frame_ms,
            move_speed: self.move_speed,
            smash_cooldown: self.smash_cooldown,
            animation_period: self.animation_period,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG data home, (4) system data directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    /// Parse config text directly. A parse error yields the defaults.
    pub fn from_toml_str(text: &str) -> Self {
        Self::resolve(parse_toml(text), &[])
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve levels directory
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        let arena = toml_cfg.arena.validated();
        GameConfig {
            arena,
            speed: toml_cfg.speed.validated(&arena),
            gamepad: GamepadConfig {
                smash: toml_cfg.gamepad.smash,
                retry: toml_cfg.gamepad.retry,
                advance: toml_cfg.gamepad.advance,
                quit: toml_cfg.gamepad.quit,
            },
            levels_dir,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Follow symlinks to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/tilemaze)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/tilemaze");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/tilemaze");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    log::info!("config: using {}", path.display());
                    return parse_toml(&text);
                }
                Err(e) => warn!("config: could not read {}: {e}", path.display()),
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str) -> TomlConfig {
    toml::from_str::<TomlConfig>(text).unwrap_or_else(|e| {
        warn!("config: parse error, using default settings: {e}");
        TomlConfig::default()
    })
}
