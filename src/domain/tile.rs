/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.
///
/// The set is closed: every per-kind rule (who falls, who chases,
/// who blocks the player) is a `match` on this enum.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum TileType {
    #[default]
    Empty,
    Dirt,
    Wall,
    Boulder,
    Diamond,
    Exit,
    Player,           // start marker in layouts, live player cell at runtime
    Butterfly,
    Amoeba,
    Firefly,
    MagicWall,
    DestructibleWall,
}

impl TileType {
    /// Does this kind have a dynamic occupant in the entity registry?
    pub fn is_entity(self) -> bool {
        matches!(
            self,
            TileType::Boulder
                | TileType::Diamond
                | TileType::Butterfly
                | TileType::Firefly
                | TileType::Amoeba
                | TileType::MagicWall
        )
    }

    /// Does gravity pull this kind down into empty space?
    pub fn is_fallable(self) -> bool {
        matches!(self, TileType::Boulder | TileType::Diamond)
    }

    /// Is this one of the pursuing enemies?
    pub fn is_enemy(self) -> bool {
        matches!(self, TileType::Butterfly | TileType::Firefly)
    }

    /// Walls of every flavour stop the player outright.
    pub fn is_wall(self) -> bool {
        matches!(
            self,
            TileType::Wall | TileType::DestructibleWall | TileType::MagicWall
        )
    }

    /// Cells the player can never step into, whatever the quota.
    pub fn blocks_player(self) -> bool {
        self.is_wall() || matches!(self, TileType::Amoeba | TileType::Player)
    }

    /// Level-file glyph for this tile.
    pub fn glyph(self) -> char {
        match self {
            TileType::Empty => ' ',
            TileType::Dirt => '.',
            TileType::Wall => '#',
            TileType::Boulder => 'O',
            TileType::Diamond => '*',
            TileType::Exit => 'X',
            TileType::Player => 'P',
            TileType::Butterfly => 'B',
            TileType::Amoeba => 'A',
            TileType::Firefly => 'F',
            TileType::MagicWall => 'M',
            TileType::DestructibleWall => '%',
        }
    }

    /// Inverse of [`TileType::glyph`].
    pub fn from_glyph(ch: char) -> Option<TileType> {
        let tile = match ch {
            ' ' => TileType::Empty,
            '.' => TileType::Dirt,
            '#' => TileType::Wall,
            'O' => TileType::Boulder,
            '*' => TileType::Diamond,
            'X' => TileType::Exit,
            'P' => TileType::Player,
            'B' => TileType::Butterfly,
            'A' => TileType::Amoeba,
            'F' => TileType::Firefly,
            'M' => TileType::MagicWall,
            '%' => TileType::DestructibleWall,
            _ => return None,
        };
        Some(tile)
    }
}
