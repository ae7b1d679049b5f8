/// WorldState: the complete snapshot of a running level.
///
/// ## Two layers, one truth
///
///   - `grid`:     what every cell IS (the tile kind)
///   - `entities`: who lives there (dynamic occupants and their state)
///
/// Invariant: a cell holds an entity iff its tile kind is an entity kind,
/// and then the kinds agree. The player is not an entity; its cell reads
/// `TileType::Player`.
///
/// Every relocation goes through `move_tile`, which updates both layers in
/// one call. Spawns and removals have their own paired helpers.
///
/// ## Base layout
///
/// `base` is the level as loaded and is never mutated. Restart rebuilds
/// everything from it and reseeds the RNG, so a restarted level replays
/// identically under identical input.

use log::{debug, trace};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::{EnemyTuning, GameConfig};
use crate::domain::ai::EnemyKind;
use crate::domain::entity::{Entity, Player};
use crate::domain::grid::Grid;
use crate::domain::registry::EntityRegistry;
use crate::domain::tile::TileType;
use crate::sim::level::Layout;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    /// Terminal: restart after the death delay.
    PlayerDead,
    /// Terminal: back to the menu after the completion delay.
    LevelComplete,
}

/// Per-level progress. Reset only by a full restart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    /// Never decreases within a level attempt.
    pub diamonds_collected: u32,
    pub required_diamonds: u32,
    pub score: u32,
    pub exit_revealed: bool,
}

impl Session {
    pub fn quota_met(&self) -> bool {
        self.diamonds_collected >= self.required_diamonds
    }
}

pub struct WorldState {
    // ── Tile layers ──
    pub grid: Grid,
    pub entities: EntityRegistry,
    base: Layout,

    // ── Actors / progress ──
    pub player: Player,
    pub session: Session,

    // ── Meta ──
    pub phase: Phase,
    /// Ticks until the pending terminal transition fires.
    pub terminal_timer: Option<u32>,
    pub tick: u64,
    pub config: GameConfig,

    // ── Randomness ──
    pub rng: SmallRng,
    seed: u64,
}

// ── Construction ──

impl WorldState {
    pub fn new(layout: Layout, config: GameConfig, seed: u64) -> Self {
        let width = layout.width();
        let height = layout.height();
        let mut world = WorldState {
            grid: Grid::new(width, height, TileType::Empty),
            entities: EntityRegistry::new(width, height),
            base: layout,
            player: Player::new(0, 0),
            session: Session::default(),
            phase: Phase::Playing,
            terminal_timer: None,
            tick: 0,
            config,
            rng: SmallRng::seed_from_u64(seed),
            seed,
        };
        world.reset_from_base();
        world
    }

    /// Replace the base layout and start it fresh.
    pub fn install(&mut self, layout: Layout) {
        self.base = layout;
        self.reset_from_base();
    }

    /// Rebuild grid, registry, player and session from the base layout.
    pub fn reset_from_base(&mut self) {
        let base = &self.base;
        let mut entities = EntityRegistry::new(base.width(), base.height());
        for (x, y, tile) in base.grid.iter() {
            if let Some(entity) = Entity::spawn(tile) {
                entities.insert(x, y, entity);
            }
        }

        self.grid = base.grid.clone();
        self.entities = entities;
        let (px, py) = base.player_start;
        self.player = Player::new(px, py);
        self.session = Session { required_diamonds: base.required_diamonds, ..Session::default() };
        self.phase = Phase::Playing;
        self.terminal_timer = None;
        self.tick = 0;
        self.rng = SmallRng::seed_from_u64(self.seed);

        debug!(
            "level {:?} built: {} entities, player at ({px}, {py})",
            self.base.name,
            self.entities.len()
        );
    }

    pub fn level_name(&self) -> &str {
        &self.base.name
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }
}

// ── Collaborator API ──

impl WorldState {
    /// Tile kind at (x, y); Empty out of range.
    #[inline]
    pub fn tile_at(&self, x: i32, y: i32) -> TileType {
        self.grid.get(x, y)
    }

    /// Terminal columns per grid cell. Presentation only.
    pub fn tile_size(&self) -> u32 {
        self.config.tile_size
    }

    pub fn player_position(&self) -> (i32, i32) {
        (self.player.x, self.player.y)
    }

    /// Relocate the entity at `from` to `to`, updating grid and registry
    /// together. Whatever occupied `to` is replaced.
    ///
    /// Returns the moved kind, or `None` (and changes nothing) when `from`
    /// is vacant or `to` is out of range.
    pub fn move_tile(&mut self, fx: i32, fy: i32, tx: i32, ty: i32) -> Option<TileType> {
        let kind = self.entities.kind_at(fx, fy)?;
        if !self.grid.in_bounds(tx, ty) {
            return None;
        }
        if !self.entities.relocate((fx, fy), (tx, ty)) {
            return None;
        }
        self.grid.set(fx, fy, TileType::Empty);
        self.grid.set(tx, ty, kind);
        trace!("{kind:?} ({fx}, {fy}) -> ({tx}, {ty})");
        Some(kind)
    }
}

// ── Entity helpers ──

impl WorldState {
    /// Place a fresh entity of `kind` at (x, y), replacing what was there.
    pub fn spawn_entity(&mut self, x: i32, y: i32, kind: TileType) -> bool {
        if !self.grid.in_bounds(x, y) {
            return false;
        }
        let Some(entity) = Entity::spawn(kind) else {
            return false;
        };
        self.entities.insert(x, y, entity);
        self.grid.set(x, y, kind);
        true
    }

    /// Remove the entity at (x, y); its cell becomes Empty.
    pub fn remove_entity(&mut self, x: i32, y: i32) -> Option<Entity> {
        let entity = self.entities.remove(x, y)?;
        self.grid.set(x, y, TileType::Empty);
        Some(entity)
    }

    /// Move the player marker. The vacated cell becomes Empty.
    pub fn move_player(&mut self, to: (i32, i32)) {
        let from = self.player_position();
        self.grid.set(from.0, from.1, TileType::Empty);
        self.grid.set(to.0, to.1, TileType::Player);
        self.player.x = to.0;
        self.player.y = to.1;
    }

    pub fn tuning(&self, kind: EnemyKind) -> EnemyTuning {
        match kind {
            EnemyKind::Butterfly => self.config.butterfly,
            EnemyKind::Firefly => self.config.firefly,
        }
    }

    /// Fallback exit cell, one in from the bottom-right border corner.
    pub fn exit_fallback(&self) -> (i32, i32) {
        (self.width() as i32 - 2, self.height() as i32 - 2)
    }

    pub fn set_magic_walls_active(&mut self, on: bool) {
        for wall in self.entities.iter_mut() {
            wall.set_magic_active(on);
        }
        debug!("magic walls {}", if on { "activated" } else { "deactivated" });
    }

    /// True when the level has magic walls and all of them are active.
    pub fn magic_walls_active(&self) -> bool {
        let mut walls = self.entities.iter().filter(|e| e.kind() == TileType::MagicWall).peekable();
        walls.peek().is_some() && walls.all(Entity::is_magic_active)
    }

    pub fn is_player_dead(&self) -> bool {
        self.phase == Phase::PlayerDead
    }

    pub fn is_level_complete(&self) -> bool {
        self.phase == Phase::LevelComplete
    }

    /// Grid and registry agree on every cell.
    pub fn is_consistent(&self) -> bool {
        self.grid.iter().all(|(x, y, tile)| match self.entities.kind_at(x, y) {
            Some(kind) => kind == tile,
            None => !tile.is_entity(),
        })
    }
}

#[cfg(test)]
pub(crate) fn world_from(rows: &[&str], required: u32) -> WorldState {
    let layout = match Layout::parse(&rows.join("\n"), required) {
        Ok(layout) => layout,
        Err(e) => panic!("bad test level: {e}"),
    };
    let mut config = GameConfig::default();
    config.speed.player_move_ticks = 0;
    WorldState::new(layout, config, 1)
}
