/// Player movement rules: truth-table driven.
///
/// Pure functions over the grid, no side effects. They decide what a
/// single step by the player means; `sim::step` performs it.
///
/// ## Destination Table
///
/// ┌──────────────────────────────┬──────────────┬───────────────────────┐
/// │ Destination                   │ Action       │ Notes                 │
/// ├──────────────────────────────┼──────────────┼───────────────────────┤
/// │ out of bounds                 │ Blocked      │ map edge              │
/// │ Wall / DestructibleWall       │ Blocked      │                       │
/// │ MagicWall / Amoeba            │ Blocked      │                       │
/// │ Boulder, push legal           │ Push         │ sideways only         │
/// │ Boulder, push illegal         │ Blocked      │                       │
/// │ Diamond                       │ Collect      │ then walk in          │
/// │ Dirt                          │ Dig          │ cleared, then walk in │
/// │ Empty                         │ Walk         │                       │
/// │ Exit, quota met               │ Enter        │ level complete        │
/// │ Exit, quota not met           │ Blocked      │                       │
/// │ Butterfly / Firefly           │ TouchEnemy   │ player dies in place  │
/// └──────────────────────────────┴──────────────┴───────────────────────┘

use super::entity::MoveDir;
use super::grid::Grid;
use super::physics;
use super::tile::TileType;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayerAction {
    Blocked,
    Walk,
    Dig,
    Collect,
    /// Boulder moves to `to`, player takes its cell.
    Push { to: (i32, i32) },
    Enter,
    TouchEnemy,
}

impl PlayerAction {
    /// Does the player end up on the destination cell?
    pub fn moves_player(self) -> bool {
        !matches!(self, PlayerAction::Blocked | PlayerAction::TouchEnemy)
    }
}

/// Resolve one step from `from` in `dir`.
pub fn resolve_move(grid: &Grid, from: (i32, i32), dir: MoveDir, quota_met: bool) -> PlayerAction {
    let (dx, dy) = dir.delta();
    let (tx, ty) = (from.0 + dx, from.1 + dy);
    if !grid.in_bounds(tx, ty) {
        return PlayerAction::Blocked;
    }

    let dest = grid.get(tx, ty);
    if dest.blocks_player() {
        return PlayerAction::Blocked;
    }

    match dest {
        TileType::Boulder => match physics::push_target(grid, tx, ty, dx, dy) {
            Some(to) => PlayerAction::Push { to },
            None => PlayerAction::Blocked,
        },
        TileType::Diamond => PlayerAction::Collect,
        TileType::Dirt => PlayerAction::Dig,
        TileType::Empty => PlayerAction::Walk,
        TileType::Exit if quota_met => PlayerAction::Enter,
        TileType::Exit => PlayerAction::Blocked,
        TileType::Butterfly | TileType::Firefly => PlayerAction::TouchEnemy,
        _ => PlayerAction::Blocked,
    }
}
