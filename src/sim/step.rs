/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Terminal timer (only while PlayerDead / LevelComplete)
///   2. Entity phase: gravity, enemy AI, amoeba growth
///   3. Death check (enemy on the player, falling boulder above)
///   4. Player input
///   5. Exit reveal
///
/// The entity phase walks a row-major snapshot of occupied cells taken at
/// the start of the tick. A cell entered during this tick is not updated
/// again, so every entity acts at most once.
///
/// Enemies may step into:
///   - an Empty cell
///   - the player's cell (the player dies)
///   - a cell another enemy entered this tick (both die, diamonds burst)

use log::{debug, info};

use crate::domain::ai::{self, EnemyKind};
use crate::domain::entity::{Entity, HeldDirections, MoveDir};
use crate::domain::growth;
use crate::domain::physics;
use crate::domain::rules::{self, PlayerAction};
use crate::domain::tile::TileType;
use super::event::{DeathCause, GameEvent};
use super::world::{Phase, WorldState};

/// Collision cell first, then its four orthogonal neighbours.
const BURST: [(i32, i32); 5] = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)];

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: HeldDirections) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    if world.phase != Phase::Playing {
        resolve_terminal_timer(world, &mut events);
        return events;
    }

    resolve_entities(world, &mut events);
    if resolve_player_death(world, &mut events) { return events; }
    resolve_player_input(world, input.intent(), &mut events);
    resolve_exit_reveal(world, &mut events);

    events
}

/// Rebuild the level from its base layout. Score and diamonds reset too.
pub fn restart_level(world: &mut WorldState) {
    world.reset_from_base();
    info!("level {:?} restarted", world.level_name());
}

// ══════════════════════════════════════════════════════════════
// Entity phase
// ══════════════════════════════════════════════════════════════

/// Cells entered during the current tick.
struct Entered {
    width: usize,
    cells: Vec<bool>,
}

impl Entered {
    fn new(world: &WorldState) -> Self {
        Entered { width: world.width(), cells: vec![false; world.width() * world.height()] }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width {
            return None;
        }
        let i = y as usize * self.width + x as usize;
        (i < self.cells.len()).then_some(i)
    }

    fn mark(&mut self, (x, y): (i32, i32)) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = true;
        }
    }

    fn contains(&self, (x, y): (i32, i32)) -> bool {
        self.index(x, y).map_or(false, |i| self.cells[i])
    }
}

fn resolve_entities(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let mut entered = Entered::new(world);

    for pos in world.entities.positions() {
        // An enemy reached the player: everything else freezes.
        if world.phase != Phase::Playing { break; }
        if entered.contains(pos) { continue; }
        // Gone if an enemy collision removed it earlier this tick.
        let Some(kind) = world.entities.kind_at(pos.0, pos.1) else { continue };

        match kind {
            TileType::Boulder | TileType::Diamond => update_fallable(world, pos, &mut entered, events),
            TileType::Butterfly => update_enemy(world, EnemyKind::Butterfly, pos, &mut entered, events),
            TileType::Firefly => update_enemy(world, EnemyKind::Firefly, pos, &mut entered, events),
            TileType::Amoeba => update_amoeba(world, pos, &mut entered, events),
            _ => {}
        }
    }
}

// ── Gravity ──

fn update_fallable(world: &mut WorldState, pos: (i32, i32), entered: &mut Entered, events: &mut Vec<GameEvent>) {
    let (x, y) = pos;
    let target = physics::fall_target(&world.grid, x, y);

    let Some(to) = target else {
        set_falling(world, pos, false);
        return;
    };
    if let Some(kind) = world.move_tile(x, y, to.0, to.1) {
        set_falling(world, to, true);
        entered.mark(to);
        events.push(GameEvent::EntityMoved { kind, from: pos, to });
    }
}

fn set_falling(world: &mut WorldState, (x, y): (i32, i32), falling: bool) {
    if let Some(state) = world.entities.get_mut(x, y).and_then(Entity::fall_state_mut) {
        state.falling = falling;
    }
}

// ── Enemies ──

fn update_enemy(
    world: &mut WorldState,
    kind: EnemyKind,
    pos: (i32, i32),
    entered: &mut Entered,
    events: &mut Vec<GameEvent>,
) {
    let (x, y) = pos;
    let player = world.player_position();
    let tuning = world.tuning(kind);
    let chasing = ai::is_player_nearby(pos, player, &tuning);
    let interval = ai::move_interval(&tuning, chasing);

    let Some(state) = world.entities.get_mut(x, y).and_then(Entity::enemy_state_mut) else { return };
    if !ai::tick_pacing(state, interval) { return; }
    let mut next_state = *state;

    let choice = {
        let grid = &world.grid;
        let entities = &world.entities;
        let seen = &*entered;
        let open = |tx: i32, ty: i32| {
            grid.is_empty_at(tx, ty)
                || (tx, ty) == player
                || (seen.contains((tx, ty)) && entities.kind_at(tx, ty).map_or(false, TileType::is_enemy))
        };
        ai::choose_move(kind, &mut next_state, pos, player, chasing, open)
    };

    if let Some(state) = world.entities.get_mut(x, y).and_then(Entity::enemy_state_mut) {
        *state = next_state;
    }

    let Some((dx, dy)) = choice else { return };
    let to = (x + dx, y + dy);

    let occupant = world.entities.kind_at(to.0, to.1);
    if entered.contains(to) && occupant.map_or(false, TileType::is_enemy) {
        collide_enemies(world, pos, to, entered, events);
        return;
    }

    if let Some(moved) = world.move_tile(x, y, to.0, to.1) {
        entered.mark(to);
        events.push(GameEvent::EntityMoved { kind: moved, from: pos, to });
        if to == player {
            player_die(world, DeathCause::Enemy, events);
        }
    }
}

/// The enemy at `from` ran into the enemy that entered `at` this tick.
fn collide_enemies(
    world: &mut WorldState,
    from: (i32, i32),
    at: (i32, i32),
    entered: &mut Entered,
    events: &mut Vec<GameEvent>,
) {
    world.remove_entity(at.0, at.1);

    // Tested while the arriving enemy still holds its source cell.
    let burst: Vec<(i32, i32)> = BURST
        .iter()
        .map(|&(dx, dy)| (at.0 + dx, at.1 + dy))
        .filter(|&(bx, by)| world.grid.is_empty_at(bx, by))
        .collect();

    world.remove_entity(from.0, from.1);

    for &cell in &burst {
        world.spawn_entity(cell.0, cell.1, TileType::Diamond);
        entered.mark(cell);
    }

    info!("enemies collided at ({}, {}), {} diamonds", at.0, at.1, burst.len());
    events.push(GameEvent::EnemiesCollided { at, diamonds: burst.len() });
}

// ── Amoeba ──

fn update_amoeba(world: &mut WorldState, pos: (i32, i32), entered: &mut Entered, events: &mut Vec<GameEvent>) {
    let chance = world.config.rules.amoeba_growth_chance;
    let Some(to) = growth::growth_target(&world.grid, &mut world.rng, pos, chance) else { return };
    if let Some(kind) = world.move_tile(pos.0, pos.1, to.0, to.1) {
        entered.mark(to);
        events.push(GameEvent::EntityMoved { kind, from: pos, to });
    }
}

// ══════════════════════════════════════════════════════════════
// Death check
// ══════════════════════════════════════════════════════════════

fn resolve_player_death(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let (px, py) = world.player_position();

    let cause = if world.entities.kind_at(px, py).map_or(false, TileType::is_enemy) {
        Some(DeathCause::Enemy)
    } else if world.entities.get(px, py - 1).map_or(false, Entity::is_falling_boulder) {
        Some(DeathCause::Crushed)
    } else {
        None
    };

    match cause {
        Some(cause) => {
            player_die(world, cause, events);
            true
        }
        None => false,
    }
}

// ══════════════════════════════════════════════════════════════
// Player input
// ══════════════════════════════════════════════════════════════

fn resolve_player_input(world: &mut WorldState, intent: Option<MoveDir>, events: &mut Vec<GameEvent>) {
    if !world.player.alive { return; }

    if world.player.move_cooldown > 0 {
        world.player.move_cooldown -= 1;
        return;
    }

    let Some(dir) = intent else { return };
    let from = world.player_position();
    let action = rules::resolve_move(&world.grid, from, dir, world.session.quota_met());
    let (dx, dy) = dir.delta();
    let to = (from.0 + dx, from.1 + dy);

    match action {
        PlayerAction::TouchEnemy => player_die(world, DeathCause::Enemy, events),
        PlayerAction::Push { to: rock_to } => {
            if world.move_tile(to.0, to.1, rock_to.0, rock_to.1).is_some() {
                set_falling(world, rock_to, false);
                events.push(GameEvent::BoulderPushed { from: to, to: rock_to });
            }
        }
        PlayerAction::Dig => {
            world.grid.set(to.0, to.1, TileType::Empty);
            events.push(GameEvent::DirtDug { x: to.0, y: to.1 });
        }
        PlayerAction::Collect => {
            world.remove_entity(to.0, to.1);
            world.session.diamonds_collected += 1;
            world.session.score += world.config.rules.diamond_score;
            debug!(
                "diamond {}/{} collected",
                world.session.diamonds_collected, world.session.required_diamonds
            );
            events.push(GameEvent::DiamondCollected { total: world.session.diamonds_collected });
        }
        PlayerAction::Blocked | PlayerAction::Walk | PlayerAction::Enter => {}
    }
    if !action.moves_player() { return; }

    world.move_player(to);
    world.player.move_cooldown = world.config.speed.player_move_ticks;
    events.push(GameEvent::PlayerMoved { from, to });

    if action == PlayerAction::Enter {
        complete_level(world, events);
    }
}

// ══════════════════════════════════════════════════════════════
// Exit / terminal states
// ══════════════════════════════════════════════════════════════

fn resolve_exit_reveal(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.phase != Phase::Playing { return; }
    if world.session.exit_revealed || !world.session.quota_met() { return; }

    world.session.exit_revealed = true;
    let (ex, ey) = world.exit_fallback();
    let placed = matches!(world.grid.get(ex, ey), TileType::Empty | TileType::Dirt);
    if placed {
        world.grid.set(ex, ey, TileType::Exit);
    }

    info!("exit revealed at ({ex}, {ey}), placed: {placed}");
    events.push(GameEvent::ExitRevealed { placed });
}

fn player_die(world: &mut WorldState, cause: DeathCause, events: &mut Vec<GameEvent>) {
    if world.phase != Phase::Playing { return; }
    world.player.alive = false;
    world.phase = Phase::PlayerDead;
    world.terminal_timer = Some(world.config.speed.death_delay_ticks);
    info!("player killed ({cause:?}) at {:?}", world.player_position());
    events.push(GameEvent::PlayerKilled { cause });
}

fn complete_level(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.phase != Phase::Playing { return; }
    world.phase = Phase::LevelComplete;
    world.terminal_timer = Some(world.config.speed.complete_delay_ticks);
    info!(
        "level {:?} complete, score {}",
        world.level_name(),
        world.session.score
    );
    events.push(GameEvent::LevelCompleted);
}

/// Count down the pending terminal transition and fire it once.
fn resolve_terminal_timer(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let Some(remaining) = world.terminal_timer else { return };
    if remaining > 1 {
        world.terminal_timer = Some(remaining - 1);
        return;
    }
    world.terminal_timer = None;

    match world.phase {
        Phase::PlayerDead => {
            restart_level(world);
            events.push(GameEvent::LevelRestarted);
        }
        Phase::LevelComplete => events.push(GameEvent::ReturnToMenu),
        Phase::Playing => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::world_from;

    fn held(dir: MoveDir) -> HeldDirections {
        let mut h = HeldDirections::default();
        match dir {
            MoveDir::Left => h.left = true,
            MoveDir::Right => h.right = true,
            MoveDir::Up => h.up = true,
            MoveDir::Down => h.down = true,
        }
        h
    }

    fn idle() -> HeldDirections {
        HeldDirections::default()
    }

    // ── Push ──

    #[test]
    fn push_boulder_right() {
        let mut w = world_from(
            &[
                "#####",
                "#PO #",
                "#...#",
                "#...#",
                "#####",
            ],
            5,
        );
        let events = step(&mut w, held(MoveDir::Right));
        assert_eq!(w.tile_at(3, 1), TileType::Boulder);
        assert_eq!(w.player_position(), (2, 1));
        assert_eq!(w.tile_at(2, 1), TileType::Player);
        assert_eq!(w.tile_at(1, 1), TileType::Empty);
        assert!(events.contains(&GameEvent::BoulderPushed { from: (2, 1), to: (3, 1) }));
        assert!(w.is_consistent());
    }

    #[test]
    fn boulder_against_wall_does_not_move() {
        let mut w = world_from(
            &[
                "####",
                "#PO#",
                "#..#",
                "####",
            ],
            5,
        );
        step(&mut w, held(MoveDir::Right));
        assert_eq!(w.player_position(), (1, 1));
        assert_eq!(w.tile_at(2, 1), TileType::Boulder);
    }

    // ── Collect / exit ──

    #[test]
    fn collecting_quota_reveals_exit() {
        let mut w = world_from(
            &[
                "#####",
                "#...#",
                "#P*.#",
                "#...#",
                "#####",
            ],
            1,
        );
        let events = step(&mut w, held(MoveDir::Right));
        assert_eq!(w.session.diamonds_collected, 1);
        assert_eq!(w.session.score, 10);
        assert_eq!(w.player_position(), (2, 2));
        assert_eq!(w.tile_at(3, 3), TileType::Exit);
        assert!(events.contains(&GameEvent::DiamondCollected { total: 1 }));
        assert!(events.contains(&GameEvent::ExitRevealed { placed: true }));

        // Revealed exactly once
        for _ in 0..5 {
            let later = step(&mut w, idle());
            assert!(!later.iter().any(|e| matches!(e, GameEvent::ExitRevealed { .. })));
        }
        assert!(w.is_consistent());
    }

    #[test]
    fn occupied_fallback_still_reveals_once() {
        let mut w = world_from(
            &[
                "#####",
                "#P* #",
                "#..%#",
                "#####",
            ],
            1,
        );
        let events = step(&mut w, held(MoveDir::Right));
        assert!(events.contains(&GameEvent::ExitRevealed { placed: false }));
        assert_eq!(w.tile_at(3, 2), TileType::DestructibleWall);
        assert!(w.session.exit_revealed);
    }

    #[test]
    fn zero_quota_reveals_on_first_tick() {
        let mut w = world_from(
            &[
                "####",
                "#P #",
                "#  #",
                "####",
            ],
            0,
        );
        let events = step(&mut w, idle());
        assert_eq!(events, vec![GameEvent::ExitRevealed { placed: true }]);
        assert_eq!(w.tile_at(2, 2), TileType::Exit);
    }

    #[test]
    fn exit_blocks_until_quota_then_completes() {
        let mut w = world_from(
            &[
                "######",
                "#X.P*#",
                "#....#",
                "######",
            ],
            1,
        );
        w.config.speed.complete_delay_ticks = 3;

        step(&mut w, held(MoveDir::Left));
        step(&mut w, held(MoveDir::Left));
        // Exit at (1,1) refuses entry without the diamond
        assert_eq!(w.player_position(), (2, 1));

        step(&mut w, held(MoveDir::Right));
        step(&mut w, held(MoveDir::Right));
        assert_eq!(w.session.diamonds_collected, 1);
        step(&mut w, held(MoveDir::Left));
        step(&mut w, held(MoveDir::Left));
        let events = step(&mut w, held(MoveDir::Left));
        assert!(events.contains(&GameEvent::LevelCompleted));
        assert!(w.is_level_complete());
        assert_eq!(w.player_position(), (1, 1));

        // Frozen, then one ReturnToMenu after the delay
        let mut menus = 0;
        for _ in 0..10 {
            for e in step(&mut w, held(MoveDir::Right)) {
                if e == GameEvent::ReturnToMenu { menus += 1; }
            }
        }
        assert_eq!(menus, 1);
        assert_eq!(w.player_position(), (1, 1));
        assert!(w.is_level_complete());
    }

    #[test]
    fn diamonds_never_decrease() {
        let mut w = world_from(
            &[
                "#######",
                "#P** *#",
                "#.....#",
                "#######",
            ],
            3,
        );
        let mut last = 0;
        for _ in 0..6 {
            step(&mut w, held(MoveDir::Right));
            assert!(w.session.diamonds_collected >= last);
            last = w.session.diamonds_collected;
        }
        assert_eq!(last, 3);
    }

    // ── Gravity ──

    #[test]
    fn boulder_falls_one_cell_per_tick() {
        let mut w = world_from(
            &[
                "#####",
                "#PO #",
                "#   #",
                "#   #",
                "#   #",
                "#####",
            ],
            5,
        );
        for expected_y in [2, 3, 4] {
            let events = step(&mut w, idle());
            assert_eq!(w.tile_at(2, expected_y), TileType::Boulder);
            assert!(events.contains(&GameEvent::EntityMoved {
                kind: TileType::Boulder,
                from: (2, expected_y - 1),
                to: (2, expected_y),
            }));
        }
        step(&mut w, idle());
        assert_eq!(w.tile_at(2, 4), TileType::Boulder);
        assert!(!w.entities.get(2, 4).unwrap().is_falling_boulder());
        assert!(w.is_consistent());
    }

    #[test]
    fn stacked_boulders_fall_together() {
        let mut w = world_from(
            &[
                "####",
                "#PO#",
                "# O#",
                "#  #",
                "#  #",
                "####",
            ],
            5,
        );
        step(&mut w, idle());
        // Row-major: the upper one is blocked when it acts, the lower one drops
        assert_eq!(w.tile_at(2, 1), TileType::Boulder);
        assert_eq!(w.tile_at(2, 3), TileType::Boulder);
        step(&mut w, idle());
        assert_eq!(w.tile_at(2, 2), TileType::Boulder);
        assert_eq!(w.tile_at(2, 4), TileType::Boulder);
    }

    #[test]
    fn falling_boulder_crushes_player() {
        let mut w = world_from(
            &[
                "####",
                "#O #",
                "#  #",
                "#P #",
                "####",
            ],
            5,
        );
        let events = step(&mut w, idle());
        assert!(events.contains(&GameEvent::PlayerKilled { cause: DeathCause::Crushed }));
        assert!(w.is_player_dead());
        assert!(!w.player.alive);
    }

    #[test]
    fn resting_boulder_is_harmless() {
        let mut w = world_from(
            &[
                "####",
                "#O #",
                "#P #",
                "####",
            ],
            5,
        );
        for _ in 0..5 {
            step(&mut w, idle());
        }
        assert_eq!(w.phase, Phase::Playing);
    }

    // ── Enemies ──

    #[test]
    fn butterfly_and_firefly_collide() {
        let mut w = world_from(
            &[
                "##############",
                "#............#",
                "#............#",
                "#... ........#",
                "#..B F.......#",
                "#............#",
                "#............#",
                "#...........P#",
                "##############",
            ],
            5,
        );
        let events = step(&mut w, idle());

        assert!(events.contains(&GameEvent::EnemiesCollided { at: (4, 4), diamonds: 3 }));
        assert_eq!(w.entities.count_kind(TileType::Butterfly), 0);
        assert_eq!(w.entities.count_kind(TileType::Firefly), 0);
        // Collision cell, the butterfly's vacated cell, and the open cell above
        assert_eq!(w.tile_at(4, 4), TileType::Diamond);
        assert_eq!(w.tile_at(3, 4), TileType::Diamond);
        assert_eq!(w.tile_at(4, 3), TileType::Diamond);
        // Dirt below is not overwritten; the firefly's cell was occupied at burst time
        assert_eq!(w.tile_at(4, 5), TileType::Dirt);
        assert_eq!(w.tile_at(5, 4), TileType::Empty);
        assert_eq!(w.entities.count_kind(TileType::Diamond), 3);
        assert!(w.is_consistent());
    }

    #[test]
    fn diagonal_arrival_bursts_full_cross() {
        let mut w = world_from(
            &[
                "##########",
                "#...P....#",
                "#........#",
                "#... ....#",
                "#..B  ...#",
                "#... F...#",
                "#........#",
                "##########",
            ],
            5,
        );
        let events = step(&mut w, idle());

        // Butterfly steps right into (4,4); the firefly arrives diagonally
        assert!(events.contains(&GameEvent::EntityMoved {
            kind: TileType::Butterfly,
            from: (3, 4),
            to: (4, 4),
        }));
        assert!(events.contains(&GameEvent::EnemiesCollided { at: (4, 4), diamonds: 5 }));
        for cell in [(4, 4), (5, 4), (3, 4), (4, 5), (4, 3)] {
            assert_eq!(w.tile_at(cell.0, cell.1), TileType::Diamond, "{cell:?}");
        }
        assert_eq!(w.tile_at(5, 5), TileType::Empty);
        assert_eq!(w.entities.count_kind(TileType::Diamond), 5);
        assert_eq!(w.entities.count_kind(TileType::Firefly), 0);
        assert!(w.is_consistent());
    }

    #[test]
    fn enemy_on_player_cell_preempts_collision() {
        let mut w = world_from(
            &[
                "######",
                "#.B..#",
                "#.PF.#",
                "#....#",
                "######",
            ],
            5,
        );
        w.config.speed.death_delay_ticks = 3;
        let events = step(&mut w, idle());

        assert_eq!(
            events,
            vec![
                GameEvent::EntityMoved { kind: TileType::Butterfly, from: (2, 1), to: (2, 2) },
                GameEvent::PlayerKilled { cause: DeathCause::Enemy },
            ]
        );
        assert!(w.is_player_dead());
        assert_eq!(w.entities.kind_at(2, 2), Some(TileType::Butterfly));
        assert_eq!(w.entities.kind_at(3, 2), Some(TileType::Firefly));
        assert_eq!(w.entities.count_kind(TileType::Diamond), 0);
        assert!(w.is_consistent());

        // Input while dead cannot drag the player off the enemy's cell
        for _ in 0..3 {
            step(&mut w, held(MoveDir::Down));
            assert!(w.is_consistent());
        }
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.player_position(), (2, 2));
        assert_eq!(w.tile_at(2, 2), TileType::Player);
    }

    #[test]
    fn enemies_never_dig_or_push() {
        let mut w = world_from(
            &[
                "#######",
                "#.....#",
                "#.OBO.#",
                "#.....#",
                "#....P#",
                "#######",
            ],
            5,
        );
        for _ in 0..30 {
            step(&mut w, idle());
        }
        assert_eq!(w.entities.kind_at(3, 2), Some(TileType::Butterfly));
        assert_eq!(w.tile_at(2, 2), TileType::Boulder);
        assert_eq!(w.tile_at(4, 2), TileType::Boulder);
    }

    #[test]
    fn enemy_reaching_player_kills() {
        let mut w = world_from(
            &[
                "#####",
                "#PB #",
                "#...#",
                "#####",
            ],
            5,
        );
        let events = step(&mut w, idle());
        assert!(events.contains(&GameEvent::PlayerKilled { cause: DeathCause::Enemy }));
        assert!(w.is_player_dead());
    }

    #[test]
    fn walking_into_enemy_kills_in_place() {
        let mut w = world_from(
            &[
                "#####",
                "#PF.#",
                "#...#",
                "#####",
            ],
            5,
        );
        // Firefly has just moved and is waiting out its chase interval
        if let Some(s) = w.entities.get_mut(2, 1).and_then(Entity::enemy_state_mut) {
            s.idle_ticks = 0;
        }
        let events = step(&mut w, held(MoveDir::Right));
        assert_eq!(events, vec![GameEvent::PlayerKilled { cause: DeathCause::Enemy }]);
        assert_eq!(w.player_position(), (1, 1));
        assert_eq!(w.entities.kind_at(2, 1), Some(TileType::Firefly));
    }

    #[test]
    fn enemies_keep_their_pace() {
        let mut w = world_from(
            &[
                "##############",
                "#B           #",
                "#............#",
                "#...........P#",
                "##############",
            ],
            5,
        );
        // Patrolling butterfly: moves on tick 1, then every base interval (10)
        let mut moves = vec![];
        for tick in 1..=21 {
            let events = step(&mut w, idle());
            if events.iter().any(|e| matches!(e, GameEvent::EntityMoved { kind: TileType::Butterfly, .. })) {
                moves.push(tick);
            }
        }
        assert_eq!(moves, vec![1, 11, 21]);
    }

    // ── Amoeba ──

    #[test]
    fn amoeba_moves_but_never_multiplies() {
        let mut w = world_from(
            &[
                "#######",
                "#     #",
                "#  A  #",
                "#     #",
                "#....P#",
                "#######",
            ],
            5,
        );
        w.config.rules.amoeba_growth_chance = 1.0;
        let mut moved = false;
        for _ in 0..20 {
            let events = step(&mut w, idle());
            moved |= events.iter().any(|e| matches!(e, GameEvent::EntityMoved { kind: TileType::Amoeba, .. }));
            assert_eq!(w.entities.count_kind(TileType::Amoeba), 1);
            assert_eq!(w.grid.count(TileType::Amoeba), 1);
        }
        assert!(moved);
    }

    #[test]
    fn amoeba_rests_at_zero_chance() {
        let mut w = world_from(
            &[
                "#####",
                "# A #",
                "#..P#",
                "#####",
            ],
            5,
        );
        w.config.rules.amoeba_growth_chance = 0.0;
        for _ in 0..50 {
            step(&mut w, idle());
        }
        assert_eq!(w.entities.kind_at(2, 1), Some(TileType::Amoeba));
    }

    // ── Player ──

    #[test]
    fn digging_clears_dirt() {
        let mut w = world_from(
            &[
                "####",
                "#P.#",
                "####",
            ],
            5,
        );
        let events = step(&mut w, held(MoveDir::Right));
        assert!(events.contains(&GameEvent::DirtDug { x: 2, y: 1 }));
        assert_eq!(w.tile_at(1, 1), TileType::Empty);
        assert_eq!(w.tile_at(2, 1), TileType::Player);
    }

    #[test]
    fn move_cooldown_paces_input() {
        let mut w = world_from(
            &[
                "#######",
                "#P    #",
                "#.....#",
                "#######",
            ],
            5,
        );
        w.config.speed.player_move_ticks = 2;
        let mut xs = vec![];
        for _ in 0..7 {
            step(&mut w, held(MoveDir::Right));
            xs.push(w.player.x);
        }
        assert_eq!(xs, vec![2, 2, 2, 3, 3, 3, 4]);
    }

    #[test]
    fn walls_and_amoeba_block() {
        let mut w = world_from(
            &[
                "#####",
                "#%P #",
                "#.AM#",
                "#####",
            ],
            5,
        );
        w.config.rules.amoeba_growth_chance = 0.0;
        for dir in [MoveDir::Left, MoveDir::Down, MoveDir::Up] {
            step(&mut w, held(dir));
            assert_eq!(w.player_position(), (2, 1));
        }
    }

    // ── Terminal states ──

    #[test]
    fn death_restarts_after_delay() {
        let mut w = world_from(
            &[
                "#####",
                "#PB #",
                "#.*.#",
                "#####",
            ],
            5,
        );
        w.config.speed.death_delay_ticks = 3;
        step(&mut w, idle());
        assert!(w.is_player_dead());

        // Frozen while dead
        assert!(step(&mut w, held(MoveDir::Down)).is_empty());
        assert!(step(&mut w, idle()).is_empty());
        let events = step(&mut w, idle());
        assert_eq!(events, vec![GameEvent::LevelRestarted]);

        assert_eq!(w.phase, Phase::Playing);
        assert!(w.player.alive);
        assert_eq!(w.player_position(), (1, 1));
        assert_eq!(w.entities.kind_at(2, 1), Some(TileType::Butterfly));
        assert_eq!(w.session.diamonds_collected, 0);
        assert!(w.is_consistent());
    }

    #[test]
    fn first_terminal_state_wins() {
        let mut w = world_from(
            &[
                "####",
                "#PX#",
                "####",
            ],
            0,
        );
        let mut events = vec![];
        player_die(&mut w, DeathCause::Enemy, &mut events);
        player_die(&mut w, DeathCause::Crushed, &mut events);
        complete_level(&mut w, &mut events);
        assert_eq!(events, vec![GameEvent::PlayerKilled { cause: DeathCause::Enemy }]);
        assert!(w.is_player_dead());
        assert!(!w.is_level_complete());
    }

    #[test]
    fn restart_replays_identically() {
        let rows = [
            "##########",
            "#P.....  #",
            "#..A..O. #",
            "#  ... B #",
            "#........#",
            "##########",
        ];
        let script = [MoveDir::Down, MoveDir::Right, MoveDir::Right, MoveDir::Down];
        let play = |w: &mut WorldState| {
            let mut log = vec![];
            for i in 0..40 {
                log.extend(step(w, held(script[i % script.len()])));
            }
            log
        };

        let mut w = world_from(&rows, 5);
        w.config.rules.amoeba_growth_chance = 0.5;
        let first = play(&mut w);
        let first_grid = w.grid.clone();

        restart_level(&mut w);
        let second = play(&mut w);
        assert_eq!(first, second);
        assert_eq!(first_grid, w.grid);
    }
}
