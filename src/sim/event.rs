/// Events emitted during a simulation step.
/// The presentation layer consumes these for animation; the simulation
/// has already committed every change they describe.

use crate::domain::tile::TileType;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeathCause {
    /// An enemy reached the player, or the player walked into one.
    Enemy,
    /// A falling boulder landed on the player.
    Crushed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    EntityMoved { kind: TileType, from: (i32, i32), to: (i32, i32) },
    PlayerMoved { from: (i32, i32), to: (i32, i32) },
    DirtDug { x: i32, y: i32 },
    BoulderPushed { from: (i32, i32), to: (i32, i32) },
    DiamondCollected { total: u32 },
    /// Quota met. `placed` is false when the fallback cell was occupied.
    ExitRevealed { placed: bool },
    EnemiesCollided { at: (i32, i32), diamonds: usize },
    PlayerKilled { cause: DeathCause },
    LevelCompleted,
    LevelRestarted,
    ReturnToMenu,
}
