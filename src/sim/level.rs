/// Level loader.
///
/// ## Sources (priority order):
///   1. `general.level_file` from config
///   2. The built-in embedded layout
///
/// ## Level format (`.txt`):
///   ```text
///   # Level Name
///   @ diamonds=12
///   ########
///   #P.*O X#
///   ########
///   ```
///
/// Header lines (`# ` name, `@ ` metadata) may only precede the map.
/// Every map row must have the same width and the border must be solid
/// `#`.
///
/// ## Tile legend:
///   '#' = Wall              '%' = Destructible wall
///   '.' = Dirt              'M' = Magic wall
///   'O' = Boulder           '*' = Diamond
///   'B' = Butterfly         'F' = Firefly
///   'A' = Amoeba            'X' = Exit
///   'P' = Player start      ' ' = Empty

use std::path::Path;

use log::info;

use crate::domain::grid::Grid;
use crate::domain::tile::TileType;
use crate::error::LevelError;
use crate::sim::world::WorldState;

/// A validated level: the base layout every (re)start is rebuilt from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub name: String,
    /// Tiles as authored, player start included.
    pub grid: Grid,
    pub player_start: (i32, i32),
    pub required_diamonds: u32,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

impl Layout {
    /// Parse and validate level text. `default_required` applies when the
    /// text has no `@ diamonds=` line.
    pub fn parse(text: &str, default_required: u32) -> Result<Layout, LevelError> {
        let mut name = None;
        let mut required = None;
        let mut lines = text.lines().map(|l| l.trim_end_matches('\r')).peekable();

        // ── Header ──
        while let Some(line) = lines.peek() {
            if line.trim().is_empty() {
                lines.next();
            } else if let Some(rest) = line.strip_prefix("# ") {
                name = Some(rest.trim().to_string());
                lines.next();
            } else if let Some(rest) = line.strip_prefix("@ ") {
                required = Some(parse_metadata(rest, line)?);
                lines.next();
            } else {
                break;
            }
        }

        // ── Map ──
        let mut rows: Vec<&str> = lines.collect();
        while rows.last().map_or(false, |r| r.trim().is_empty()) {
            rows.pop();
        }
        let grid = parse_rows(&rows)?;
        let player_start = find_player(&grid)?;

        if let Some((x, y, _)) = grid.iter().find(|&(x, y, t)| is_border(&grid, x, y) && t != TileType::Wall) {
            return Err(LevelError::OpenBorder { x: x as usize, y: y as usize });
        }

        Ok(Layout {
            name: name.unwrap_or_else(|| "Unnamed Cave".to_string()),
            grid,
            player_start,
            required_diamonds: required.unwrap_or(default_required),
        })
    }

    pub fn from_file(path: &Path, default_required: u32) -> Result<Layout, LevelError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| LevelError::Io { path: path.to_path_buf(), source })?;
        Layout::parse(&text, default_required)
    }

    /// The built-in 40x22 cave.
    pub fn embedded() -> Layout {
        match Layout::parse(&EMBEDDED_LEVEL.join("\n"), 12) {
            Ok(layout) => layout,
            // Guarded by `embedded_level_is_valid`
            Err(_) => Layout::fallback(),
        }
    }

    /// Walled empty room with the player in the corner.
    fn fallback() -> Layout {
        let mut grid = Grid::bordered(40, 22, TileType::Dirt);
        grid.set(1, 1, TileType::Player);
        Layout { name: "Empty Cave".to_string(), grid, player_start: (1, 1), required_diamonds: 0 }
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }
}

/// Install a layout into the world and build its first state.
pub fn load_level(world: &mut WorldState, layout: Layout) {
    info!(
        "loading level {:?} ({}x{}, {} diamonds required)",
        layout.name,
        layout.width(),
        layout.height(),
        layout.required_diamonds
    );
    world.install(layout);
}

// ══════════════════════════════════════════════════════════════
// Parsing helpers
// ══════════════════════════════════════════════════════════════

fn parse_metadata(rest: &str, line: &str) -> Result<u32, LevelError> {
    let bad = || LevelError::BadMetadata { line: line.to_string() };
    let mut required = None;
    for pair in rest.split_whitespace() {
        let (key, value) = pair.split_once('=').ok_or_else(bad)?;
        match key {
            "diamonds" => required = Some(value.parse::<u32>().map_err(|_| bad())?),
            _ => return Err(bad()),
        }
    }
    required.ok_or_else(bad)
}

fn parse_rows(rows: &[&str]) -> Result<Grid, LevelError> {
    let first = rows.first().ok_or(LevelError::Empty)?;
    let width = first.chars().count();
    if width == 0 {
        return Err(LevelError::Empty);
    }

    let mut grid = Grid::new(width, rows.len(), TileType::Empty);
    for (y, row) in rows.iter().enumerate() {
        let found = row.chars().count();
        if found != width {
            return Err(LevelError::Ragged { row: y, expected: width, found });
        }
        for (x, glyph) in row.chars().enumerate() {
            let tile = TileType::from_glyph(glyph).ok_or(LevelError::UnknownGlyph { glyph, x, y })?;
            grid.set(x as i32, y as i32, tile);
        }
    }
    Ok(grid)
}

fn find_player(grid: &Grid) -> Result<(i32, i32), LevelError> {
    let starts: Vec<(i32, i32)> = grid
        .iter()
        .filter(|&(_, _, t)| t == TileType::Player)
        .map(|(x, y, _)| (x, y))
        .collect();
    match starts.as_slice() {
        [] => Err(LevelError::MissingPlayer),
        [one] => Ok(*one),
        many => Err(LevelError::MultiplePlayers(many.len())),
    }
}

fn is_border(grid: &Grid, x: i32, y: i32) -> bool {
    x == 0 || y == 0 || x as usize == grid.width() - 1 || y as usize == grid.height() - 1
}

// ══════════════════════════════════════════════════════════════
// Embedded level
// ══════════════════════════════════════════════════════════════

const EMBEDDED_LEVEL: &[&str] = &[
    "# Cave A - First Dig",
    "@ diamonds=12",
    "########################################",
    "#P....O.....*.....O......   ....O.....*#",
    "#.....O..........OO.....  B  ..........#",
    "#..*.....%%%%%..........     ...O..*...#",
    "#.......   ...........O......O.........#",
    "#...O...   ...*...O.........%%%%%%%....#",
    "#.......   .........O..*...............#",
    "#..O...........MMMMMMMM.......O....O...#",
    "#......*.......   .....   ........*....#",
    "#...........O..   ..F..   ...O.........#",
    "#.%%%%%%.......   .....   .............#",
    "#..........O.....O.....O.......*...O...#",
    "#.....*..........................   ...#",
    "#...O.......O..*.....%%%%%..O....   ...#",
    "#...............O.........  ......A....#",
    "#..O.....*....O...........  ......O....#",
    "#.........................  ..*........#",
    "#....   .....O.....*...........O.....O.#",
    "#..*.   ..........O....O........*......#",
    "#....   .....B.....O........O.....O....#",
    "#.....O......   ........*..........O.X.#",
    "########################################",
];
