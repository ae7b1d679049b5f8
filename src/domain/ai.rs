/// Enemy AI: chase when the player is close, patrol otherwise.
///
/// Two kinds share the same shape and differ in their tables:
///
/// ┌───────────┬──────────────────────────────────────────┬──────────────┐
/// │ Kind       │ Chase order (first open cell wins)        │ Patrol turn  │
/// ├───────────┼──────────────────────────────────────────┼──────────────┤
/// │ Butterfly  │ toward-x, toward-y, away-x, away-y        │ index + 1    │
/// │ Firefly    │ diagonal, toward-x, toward-y,             │ index - 1    │
/// │            │ flank(-x,+y), flank(+x,-y)                │              │
/// └───────────┴──────────────────────────────────────────┴──────────────┘
///
/// Patrol: try the current facing; if blocked, turn once and retry; if
/// still blocked, stay put this tick.
///
/// Whether a cell is open is decided by the caller (the step pipeline
/// knows about the player and about enemies that moved this tick). The
/// AI never pushes or digs.

use crate::config::EnemyTuning;

use super::entity::EnemyState;
use super::tile::TileType;

/// Butterfly patrol table: right, up, left, down.
const BUTTERFLY_PATROL: [(i32, i32); 4] = [(1, 0), (0, -1), (-1, 0), (0, 1)];
/// Firefly patrol table: left, down, right, up.
const FIREFLY_PATROL: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EnemyKind {
    Butterfly,
    Firefly,
}

impl EnemyKind {
    pub fn from_tile(tile: TileType) -> Option<EnemyKind> {
        match tile {
            TileType::Butterfly => Some(EnemyKind::Butterfly),
            TileType::Firefly => Some(EnemyKind::Firefly),
            _ => None,
        }
    }

    fn patrol_table(self) -> &'static [(i32, i32); 4] {
        match self {
            EnemyKind::Butterfly => &BUTTERFLY_PATROL,
            EnemyKind::Firefly => &FIREFLY_PATROL,
        }
    }

    /// Next facing index after a blocked patrol step.
    fn turn(self, facing: u8) -> u8 {
        match self {
            EnemyKind::Butterfly => (facing + 1) % 4,
            EnemyKind::Firefly => (facing + 3) % 4,
        }
    }

    /// Chase candidates in priority order for a player at offset (dx, dy).
    pub fn chase_order(self, dx: i32, dy: i32) -> Vec<(i32, i32)> {
        let sx = dx.signum();
        let sy = dy.signum();
        match self {
            EnemyKind::Butterfly => vec![(sx, 0), (0, sy), (-sx, 0), (0, -sy)],
            EnemyKind::Firefly => vec![(sx, sy), (sx, 0), (0, sy), (-sx, sy), (sx, -sy)],
        }
    }
}

/// Manhattan distance between two cells.
pub fn manhattan(a: (i32, i32), b: (i32, i32)) -> i32 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}

pub fn is_player_nearby(pos: (i32, i32), player: (i32, i32), tuning: &EnemyTuning) -> bool {
    manhattan(pos, player) <= tuning.detection_range
}

/// Ticks between moves: shorter while chasing.
pub fn move_interval(tuning: &EnemyTuning, chasing: bool) -> u32 {
    if chasing { tuning.chase_interval } else { tuning.base_interval }
}

/// Advance the pacing counter by one tick. Returns true if the enemy acts
/// this tick (and resets the counter).
pub fn tick_pacing(state: &mut EnemyState, interval: u32) -> bool {
    state.idle_ticks = state.idle_ticks.saturating_add(1);
    if state.idle_ticks >= interval {
        state.idle_ticks = 0;
        true
    } else {
        false
    }
}

/// Pick this tick's step for an enemy at `pos`, or `None` to stay put.
///
/// `open(x, y)` answers whether the enemy may enter that cell. Patrol
/// facing is updated in `state` when the enemy turns.
pub fn choose_move(
    kind: EnemyKind,
    state: &mut EnemyState,
    pos: (i32, i32),
    player: (i32, i32),
    chasing: bool,
    open: impl Fn(i32, i32) -> bool,
) -> Option<(i32, i32)> {
    let (x, y) = pos;

    if chasing {
        let (dx, dy) = (player.0 - x, player.1 - y);
        for (mx, my) in kind.chase_order(dx, dy) {
            if (mx, my) == (0, 0) { continue; }
            if open(x + mx, y + my) {
                return Some((mx, my));
            }
        }
    }

    patrol(kind, state, pos, open)
}

fn patrol(
    kind: EnemyKind,
    state: &mut EnemyState,
    pos: (i32, i32),
    open: impl Fn(i32, i32) -> bool,
) -> Option<(i32, i32)> {
    let table = kind.patrol_table();
    let (x, y) = pos;

    let (dx, dy) = table[(state.facing % 4) as usize];
    if open(x + dx, y + dy) {
        return Some((dx, dy));
    }

    state.facing = kind.turn(state.facing % 4);
    let (dx, dy) = table[state.facing as usize];
    if open(x + dx, y + dy) {
        Some((dx, dy))
    } else {
        None
    }
}
