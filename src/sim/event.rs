/// Events emitted during a simulation step.
/// The presentation layer consumes these for redraw and sound.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// A level was loaded fresh (1-based number).
    LevelLoaded { level: usize },
    /// The current level was restored after a death.
    LevelRestarted,
    PlayerMoved,
    WallsSmashed { cells: Vec<(i32, i32)> },
    PlayerDied,
    LevelEscaped { level: usize },
    AllLevelsCleared,
    BackgroundAnimated,
}
