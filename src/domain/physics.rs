/// Gravity and push rules for boulders and diamonds.
///
/// ## Fall
///
/// A fallable entity drops one cell when the cell directly below is an
/// in-bounds Empty tile. Nothing else (player, enemy, wall, edge) lets it
/// through. Falling is strictly vertical: there is no rolling off rounded
/// edges.
///
/// ## Push
///
/// Only the player pushes, and only boulders, and only sideways:
///
/// ┌────────────────────────────┬────────┐
/// │ Condition                   │ Push?  │
/// ├────────────────────────────┼────────┤
/// │ dy != 0                     │ DENY   │
/// │ dx == 0                     │ DENY   │
/// │ beyond cell not Empty       │ DENY   │
/// │ beyond cell out of bounds   │ DENY   │
/// │ otherwise                   │ ALLOW  │
/// └────────────────────────────┴────────┘
///
/// These are queries; the actual relocation always goes through
/// `WorldState::move_tile`.

use super::grid::Grid;
use super::tile::TileType;

/// Where a fallable entity at (x, y) drops to this tick, if anywhere.
pub fn fall_target(grid: &Grid, x: i32, y: i32) -> Option<(i32, i32)> {
    if !grid.get(x, y).is_fallable() {
        return None;
    }
    if grid.is_empty_at(x, y + 1) {
        Some((x, y + 1))
    } else {
        None
    }
}

/// Can the boulder at (x, y) be pushed by (dx, dy)?
pub fn can_be_pushed(grid: &Grid, x: i32, y: i32, dx: i32, dy: i32) -> bool {
    if grid.get(x, y) != TileType::Boulder {
        return false;
    }
    if dy != 0 || dx == 0 {
        return false;
    }
    grid.is_empty_at(x + dx, y)
}

/// Destination of a legal push, `None` otherwise.
pub fn push_target(grid: &Grid, x: i32, y: i32, dx: i32, dy: i32) -> Option<(i32, i32)> {
    if can_be_pushed(grid, x, y, dx, dy) {
        Some((x + dx, y))
    } else {
        None
    }
}

#[cfg(test)]
pub(crate) fn grid_from(rows: &[&str]) -> Grid {
    let height = rows.len();
    let width = rows[0].chars().count();
    let mut g = Grid::new(width, height, TileType::Empty);
    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            g.set(x as i32, y as i32, TileType::from_glyph(ch).unwrap_or(TileType::Empty));
        }
    }
    g
}
