/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Tile {
    Empty,         // Void: lethal
    AnimatedEmpty, // Second frame of the void animation, equally lethal
    Floor,
    Wall,          // Unbreakable
    BreakableWall, // Blocks until smashed
    BrokenWall,    // Smashed breakable wall, passable
    Exit,
}

impl Tile {
    pub const ALL: [Tile; 7] = [
        Tile::Empty,
        Tile::AnimatedEmpty,
        Tile::Floor,
        Tile::Wall,
        Tile::BreakableWall,
        Tile::BrokenWall,
        Tile::Exit,
    ];

    /// Parse a level-file symbol. The start marker `@` is not a tile.
    pub fn from_symbol(c: char) -> Option<Tile> {
        match c {
            ' ' => Some(Tile::Empty),
            '*' => Some(Tile::AnimatedEmpty),
            '.' => Some(Tile::Floor),
            '#' => Some(Tile::Wall),
            '%' => Some(Tile::BreakableWall),
            'b' => Some(Tile::BrokenWall),
            'x' => Some(Tile::Exit),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::AnimatedEmpty => '*',
            Tile::Floor => '.',
            Tile::Wall => '#',
            Tile::BreakableWall => '%',
            Tile::BrokenWall => 'b',
            Tile::Exit => 'x',
        }
    }

    /// Does this tile stop the player? Breakable walls block until smashed.
    pub fn blocks_movement(self) -> bool {
        matches!(self, Tile::Wall | Tile::BreakableWall)
    }

    /// Standing on this tile kills the player.
    pub fn is_lethal(self) -> bool {
        matches!(self, Tile::Empty | Tile::AnimatedEmpty)
    }

    pub fn is_exit(self) -> bool {
        matches!(self, Tile::Exit)
    }

    pub fn is_breakable(self) -> bool {
        matches!(self, Tile::BreakableWall)
    }

    /// The other frame of the void animation; `None` for every other tile.
    pub fn animation_partner(self) -> Option<Tile> {
        match self {
            Tile::Empty => Some(Tile::AnimatedEmpty),
            Tile::AnimatedEmpty => Some(Tile::Empty),
            _ => None,
        }
    }
}
