/// The static tile matrix.
///
/// Stored dense and row-major. Coordinates are signed so that probes one
/// step past an edge (`x - 1` at column 0) need no special casing:
///   - out-of-range reads return `Empty`
///   - out-of-range writes are dropped

use super::tile::TileType;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<TileType>,
}

impl Grid {
    /// A grid filled with `fill`.
    pub fn new(width: usize, height: usize, fill: TileType) -> Self {
        Grid { width, height, cells: vec![fill; width * height] }
    }

    /// A grid filled with `fill` inside a one-cell Wall border.
    pub fn bordered(width: usize, height: usize, fill: TileType) -> Self {
        let mut grid = Grid::new(width, height, fill);
        for x in 0..width as i32 {
            grid.set(x, 0, TileType::Wall);
            grid.set(x, height as i32 - 1, TileType::Wall);
        }
        for y in 0..height as i32 {
            grid.set(0, y, TileType::Wall);
            grid.set(width as i32 - 1, y, TileType::Wall);
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Row-major offset of an in-bounds cell.
    #[inline]
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> TileType {
        match self.index(x, y) {
            Some(i) => self.cells[i],
            None => TileType::Empty,
        }
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, tile: TileType) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = tile;
        }
    }

    pub fn is_empty_at(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.get(x, y) == TileType::Empty
    }

    /// Every cell with its coordinates, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, TileType)> + '_ {
        let w = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &t)| ((i % w) as i32, (i / w) as i32, t))
    }

    pub fn count(&self, tile: TileType) -> usize {
        self.cells.iter().filter(|&&t| t == tile).count()
    }

    /// Is every border cell a Wall?
    pub fn has_wall_border(&self) -> bool {
        self.iter().all(|(x, y, t)| {
            let edge = x == 0
                || y == 0
                || x as usize == self.width - 1
                || y as usize == self.height - 1;
            !edge || t == TileType::Wall
        })
    }
}
