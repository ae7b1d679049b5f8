/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Each grid cell is drawn `tile_size` terminal columns wide.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use gemfall::domain::tile::TileType;
use gemfall::sim::world::{Phase, WorldState};

/// Which top-level view the frame shows.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Title,
    Game,
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every "empty" terminal cell, so the
    /// terminal's own default never shows through between rows.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column; overflow is clipped.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Layout constants ──

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_view: Option<(Screen, Phase)>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_view: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // First frame repaints everything.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Draw one frame. `message` is a transient status line ("" for none).
    pub fn render(&mut self, world: &WorldState, screen: Screen, message: &str) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Clean transition between views.
        let view = (screen, world.phase);
        if self.last_view != Some(view) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_view = Some(view);
        }

        self.compose(world, screen, message);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    fn compose(&mut self, world: &WorldState, screen: Screen, message: &str) {
        self.front.clear();
        match screen {
            Screen::Title => self.compose_title(world, message),
            Screen::Game => {
                self.compose_game(world, message);
                match world.phase {
                    Phase::Playing => {}
                    Phase::PlayerDead => self.compose_banner(world, " YOU DIED ", Color::Red),
                    Phase::LevelComplete => self.compose_banner(world, " CAVE CLEARED ", GREEN),
                }
            }
        }
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors, never ResetColor: the terminal default may
        // differ from BASE_BG.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState, message: &str) {
        let s = &w.session;
        let exit = if s.exit_revealed { "EXIT OPEN" } else { "" };
        let hud = format!(
            " {}   Diamonds {:>3}/{:<3}  Score {:<7} {}",
            w.level_name(),
            s.diamonds_collected,
            s.required_diamonds,
            s.score,
            exit,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        let cell_w = w.tile_size() as usize;
        let magic_on = w.magic_walls_active();
        for gy in 0..w.height() {
            let row = MAP_ROW + gy;
            if row >= self.front.height {
                break;
            }
            for gx in 0..w.width() {
                let tile = w.tile_at(gx as i32, gy as i32);
                let (ch, fg, bg) = tile_look(tile, w.tick, magic_on);
                for dx in 0..cell_w {
                    self.front.set(gx * cell_w + dx, row, Cell::new(ch, fg, bg));
                }
            }
        }

        let msg_row = MAP_ROW + w.height() + 1;
        if !message.is_empty() && msg_row < self.front.height {
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(1, msg_row, message, Color::Black, MSG_BG);
        }

        let help_row = MAP_ROW + w.height() + 3;
        let help = " Arrows/WASD Move   F2/R Restart   ESC Menu   Ctrl+C Quit";
        self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
    }

    /// Centered banner over the map.
    fn compose_banner(&mut self, w: &WorldState, text: &str, bg: Color) {
        let map_cols = w.width() * w.tile_size() as usize;
        let row = MAP_ROW + w.height() / 2;
        let col = map_cols.saturating_sub(text.chars().count()) / 2;
        self.front.put_str(col, row, text, Color::Black, bg);
    }

    fn compose_title(&mut self, w: &WorldState, message: &str) {
        let title = [
            r"   ____                 __       _ _ ",
            r"  / ___| ___ _ __ ___  / _| __ _| | |",
            r" | |  _ / _ \ '_ ` _ \| |_ / _` | | |",
            r" | |_| |  __/ | | | | |  _| (_| | | |",
            r"  \____|\___|_| |_| |_|_|  \__,_|_|_|",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, GOLD, Color::Reset);
        }

        let menu_base = 9;
        let cave = format!("Cave: {}", w.level_name());
        self.front.put_str(8, menu_base, &cave, Color::White, Color::Reset);
        let quota = format!("Diamonds needed: {}", w.session.required_diamonds);
        self.front.put_str(8, menu_base + 1, &quota, Color::White, Color::Reset);

        self.front.put_str(8, menu_base + 3, "ENTER   Start", GREEN, Color::Reset);
        self.front.put_str(8, menu_base + 4, "  Q     Quit", Color::White, Color::Reset);

        let help = [
            "Controls",
            "  Arrows / WASD   Move, dig, push",
            "  F2 / R          Restart cave",
            "  ESC             Back to this menu",
        ];
        let help_base = menu_base + 7;
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { GOLD } else { Color::White };
            self.front.put_str(8, help_base + i, line, color, Color::Reset);
        }

        let seed = format!("seed {}", w.seed());
        self.front.put_str(8, help_base + help.len() + 1, &seed, Color::DarkGrey, Color::Reset);

        if !message.is_empty() {
            let msg_row = self.front.height.saturating_sub(1);
            if msg_row > help_base + help.len() + 1 {
                self.front.fill_row(msg_row, MSG_BG);
                self.front.put_str(1, msg_row, message, Color::Black, MSG_BG);
            }
        }
    }
}

/// Glyph and colors for one tile. Magic walls shimmer while active.
fn tile_look(tile: TileType, tick: u64, magic_on: bool) -> (char, Color, Color) {
    match tile {
        TileType::Empty => (' ', Color::White, Color::Reset),
        TileType::Wall => ('█', Color::Rgb { r: 90, g: 90, b: 110 }, Color::Reset),
        TileType::DestructibleWall => ('▓', Color::Rgb { r: 150, g: 110, b: 80 }, Color::Reset),
        TileType::MagicWall if magic_on && tick % 4 < 2 => ('▒', Color::Magenta, Color::Reset),
        TileType::MagicWall => ('▒', Color::Rgb { r: 120, g: 80, b: 160 }, Color::Reset),
        TileType::Dirt => ('░', Color::Rgb { r: 130, g: 90, b: 50 }, Color::Reset),
        TileType::Boulder => ('●', Color::Rgb { r: 190, g: 170, b: 140 }, Color::Reset),
        TileType::Diamond => ('◆', Color::Cyan, Color::Reset),
        TileType::Butterfly => ('x', Color::Magenta, Color::Reset),
        TileType::Firefly => ('¤', Color::Rgb { r: 255, g: 140, b: 40 }, Color::Reset),
        TileType::Amoeba => ('≈', Color::Green, Color::Rgb { r: 20, g: 60, b: 20 }),
        TileType::Exit => ('▯', Color::Black, GREEN),
        TileType::Player => ('☺', GOLD, Color::Reset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemfall::config::GameConfig;
    use gemfall::sim::level::Layout;

    fn world(tile_size: u32) -> WorldState {
        let layout = Layout::parse("#####\n#P.*#\n#####", 1).unwrap();
        let config = GameConfig { tile_size, ..GameConfig::default() };
        WorldState::new(layout, config, 7)
    }

    fn renderer(w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(w, h);
        r.back.resize(w, h);
        r
    }

    #[test]
    fn cells_span_tile_size_columns() {
        let w = world(3);
        let mut r = renderer(40, 12);
        r.compose(&w, Screen::Game, "");

        let (player, ..) = tile_look(TileType::Player, 0, false);
        let (diamond, ..) = tile_look(TileType::Diamond, 0, false);
        let row = MAP_ROW + 1;
        for col in 3..6 {
            assert_eq!(r.front.get(col, row).ch, player);
        }
        for col in 9..12 {
            assert_eq!(r.front.get(col, row).ch, diamond);
        }
    }

    #[test]
    fn hud_shows_progress() {
        let w = world(2);
        let mut r = renderer(60, 12);
        r.compose(&w, Screen::Game, "");
        let hud: String = (0..60).map(|x| r.front.get(x, HUD_ROW).ch).collect();
        assert!(hud.contains("Diamonds   0/1"), "{hud}");
        assert!(hud.contains("Score 0"), "{hud}");
    }

    #[test]
    fn put_str_clips_at_edge() {
        let mut fb = FrameBuffer::new(4, 1);
        fb.put_str(2, 0, "abc", Color::White, Color::Reset);
        assert_eq!(fb.get(2, 0).ch, 'a');
        assert_eq!(fb.get(3, 0).ch, 'b');
        assert_eq!(fb.get(4, 0), Cell::BLANK);
    }

    #[test]
    fn every_tile_is_visible_except_empty() {
        for tile in [
            TileType::Wall,
            TileType::DestructibleWall,
            TileType::MagicWall,
            TileType::Dirt,
            TileType::Boulder,
            TileType::Diamond,
            TileType::Butterfly,
            TileType::Firefly,
            TileType::Amoeba,
            TileType::Exit,
            TileType::Player,
        ] {
            assert_ne!(tile_look(tile, 0, false).0, ' ', "{tile:?}");
        }
    }
}
