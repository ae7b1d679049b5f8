/// Amoeba growth.
///
/// Each tick the amoeba rolls against its growth chance. On success it
/// picks one orthogonal direction uniformly and, if that neighbour is
/// Empty, the whole organism relocates there. It does not duplicate.

use rand::Rng;

use super::grid::Grid;

/// Candidate directions, indexed by a uniform roll in 0..4.
const GROWTH_DIRS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Where the amoeba at `pos` moves this tick, if anywhere.
///
/// Consumes one `random_bool` draw every call and one direction draw
/// only when that succeeds, so a seeded generator replays exactly.
pub fn growth_target<R: Rng + ?Sized>(
    grid: &Grid,
    rng: &mut R,
    pos: (i32, i32),
    chance: f64,
) -> Option<(i32, i32)> {
    if !rng.random_bool(chance.clamp(0.0, 1.0)) {
        return None;
    }
    let (dx, dy) = GROWTH_DIRS[rng.random_range(0..GROWTH_DIRS.len())];
    let (tx, ty) = (pos.0 + dx, pos.1 + dy);
    if grid.is_empty_at(tx, ty) {
        Some((tx, ty))
    } else {
        None
    }
}
