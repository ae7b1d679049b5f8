/// Entities: Player, and the dynamic cell occupants (Boulder, Diamond,
/// Butterfly, Firefly, Amoeba, MagicWall).
///
/// Occupants are a closed tagged enum; each variant carries only the
/// state its rule needs. The per-kind update rule lives in `sim::step`.

use super::tile::TileType;

/// Movement direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
    Up,
    Down,
}

impl MoveDir {
    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveDir::Left => (-1, 0),
            MoveDir::Right => (1, 0),
            MoveDir::Up => (0, -1),
            MoveDir::Down => (0, 1),
        }
    }
}

/// Directions held by the input collaborator during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldDirections {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl HeldDirections {
    /// Collapse to a single intent. Precedence: left > right > up > down.
    pub fn intent(self) -> Option<MoveDir> {
        if self.left {
            Some(MoveDir::Left)
        } else if self.right {
            Some(MoveDir::Right)
        } else if self.up {
            Some(MoveDir::Up)
        } else if self.down {
            Some(MoveDir::Down)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub x: i32,
    pub y: i32,
    pub alive: bool,
    /// Ticks until the current move transition completes.
    /// Input is ignored while this is non-zero.
    pub move_cooldown: u32,
}

impl Player {
    pub fn new(x: i32, y: i32) -> Self {
        Player { x, y, alive: true, move_cooldown: 0 }
    }

    pub fn in_transit(&self) -> bool {
        self.move_cooldown > 0
    }
}

/// Gravity state for boulders and diamonds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FallState {
    /// Moved down during the most recent update.
    pub falling: bool,
}

/// Pacing and patrol state shared by both enemy kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyState {
    /// Index into the kind's patrol table (0..4).
    pub facing: u8,
    /// Ticks since the last move attempt.
    pub idle_ticks: u32,
}

impl EnemyState {
    pub fn new() -> Self {
        // A fresh enemy acts on its first tick.
        EnemyState { facing: 0, idle_ticks: u32::MAX }
    }
}

impl Default for EnemyState {
    fn default() -> Self {
        EnemyState::new()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    Boulder(FallState),
    Diamond(FallState),
    Butterfly(EnemyState),
    Firefly(EnemyState),
    Amoeba,
    MagicWall { active: bool },
}

impl Entity {
    /// Fresh occupant for a tile kind, or `None` for static terrain.
    pub fn spawn(kind: TileType) -> Option<Entity> {
        let entity = match kind {
            TileType::Boulder => Entity::Boulder(FallState::default()),
            TileType::Diamond => Entity::Diamond(FallState::default()),
            TileType::Butterfly => Entity::Butterfly(EnemyState::new()),
            TileType::Firefly => Entity::Firefly(EnemyState::new()),
            TileType::Amoeba => Entity::Amoeba,
            TileType::MagicWall => Entity::MagicWall { active: false },
            _ => return None,
        };
        Some(entity)
    }

    pub fn kind(&self) -> TileType {
        match self {
            Entity::Boulder(_) => TileType::Boulder,
            Entity::Diamond(_) => TileType::Diamond,
            Entity::Butterfly(_) => TileType::Butterfly,
            Entity::Firefly(_) => TileType::Firefly,
            Entity::Amoeba => TileType::Amoeba,
            Entity::MagicWall { .. } => TileType::MagicWall,
        }
    }

    pub fn fall_state_mut(&mut self) -> Option<&mut FallState> {
        match self {
            Entity::Boulder(s) | Entity::Diamond(s) => Some(s),
            _ => None,
        }
    }

    pub fn enemy_state(&self) -> Option<&EnemyState> {
        match self {
            Entity::Butterfly(s) | Entity::Firefly(s) => Some(s),
            _ => None,
        }
    }

    pub fn enemy_state_mut(&mut self) -> Option<&mut EnemyState> {
        match self {
            Entity::Butterfly(s) | Entity::Firefly(s) => Some(s),
            _ => None,
        }
    }

    /// A boulder that dropped a cell on its last update.
    pub fn is_falling_boulder(&self) -> bool {
        matches!(self, Entity::Boulder(FallState { falling: true }))
    }

    pub fn set_magic_active(&mut self, on: bool) {
        if let Entity::MagicWall { active } = self {
            *active = on;
        }
    }

    pub fn is_magic_active(&self) -> bool {
        matches!(self, Entity::MagicWall { active: true })
    }
}
