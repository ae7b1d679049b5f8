/// Entry point and game loop.

mod ui;

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    KeyCode, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use log::{info, warn};

use gemfall::config::GameConfig;
use gemfall::logging;
use gemfall::sim::event::{DeathCause, GameEvent};
use gemfall::sim::level::{load_level, Layout};
use gemfall::sim::step;
use gemfall::sim::world::WorldState;
use ui::input::InputState;
use ui::renderer::{Renderer, Screen};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// How long a status line stays up, in ticks.
const MESSAGE_TICKS: u32 = 60;

fn main() {
    let (config, config_error) = GameConfig::load();
    logging::init(config.log_file.as_deref());
    if let Some(e) = config_error {
        warn!("ignoring config.toml: {e}");
    }

    let seed = config.rules.seed.unwrap_or_else(rand::random::<u64>);
    info!("rng seed {seed}");

    let mut status = StatusLine::default();
    let layout = match &config.level_file {
        Some(path) => match Layout::from_file(path, config.rules.default_required) {
            Ok(layout) => layout,
            Err(e) => {
                warn!("{}: {e}; using the built-in cave", path.display());
                status.show(format!("Could not load {}: {e}", path.display()));
                Layout::embedded()
            }
        },
        None => Layout::embedded(),
    };

    let mut world = WorldState::new(layout.clone(), config, seed);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut input = InputState::new();
    input.honor_release = enable_key_release();

    let result = game_loop(&mut world, &mut renderer, &mut input, &layout, status);

    if input.honor_release {
        let mut out = io::stdout();
        let _ = execute!(out, PopKeyboardEnhancementFlags);
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Gemfall!");
    println!("Final Score: {}", world.session.score);
}

/// Ask the terminal for Release events. Returns whether they will arrive.
fn enable_key_release() -> bool {
    if !terminal::supports_keyboard_enhancement().unwrap_or(false) {
        return false;
    }
    let flags = KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
    let mut out = io::stdout();
    execute!(out, PushKeyboardEnhancementFlags(flags)).is_ok()
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    input: &mut InputState,
    layout: &Layout,
    mut status: StatusLine,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(world.config.speed.tick_rate_ms);
    let mut last_tick = Instant::now();
    let mut screen = Screen::Title;

    loop {
        input.drain_events();
        if input.ctrl_c_pressed() {
            break;
        }

        match screen {
            Screen::Title => {
                if input.any_pressed(&[KeyCode::Char('q'), KeyCode::Char('Q')]) {
                    break;
                }
                if input.was_pressed(KeyCode::Enter) {
                    load_level(world, layout.clone());
                    status.clear();
                    screen = Screen::Game;
                    last_tick = Instant::now();
                }
            }
            Screen::Game => {
                if input.was_pressed(KeyCode::Esc) {
                    info!("back to menu");
                    screen = Screen::Title;
                } else if input.any_pressed(&[KeyCode::F(2), KeyCode::Char('r'), KeyCode::Char('R')]) {
                    step::restart_level(world);
                    status.show("Cave restarted".to_string());
                } else if last_tick.elapsed() >= tick_rate {
                    let events = step::step(world, input.held_directions());
                    for event in &events {
                        if let Some(text) = describe(event, world) {
                            status.show(text);
                        }
                        if *event == GameEvent::ReturnToMenu {
                            screen = Screen::Title;
                        }
                    }
                    status.tick();
                    last_tick = Instant::now();
                }
            }
        }

        renderer.render(world, screen, status.text())?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Status line text for the events worth announcing.
fn describe(event: &GameEvent, world: &WorldState) -> Option<String> {
    let text = match event {
        GameEvent::ExitRevealed { placed: true } => "The exit is open!".to_string(),
        GameEvent::ExitRevealed { placed: false } => "Quota met, but the exit is buried".to_string(),
        GameEvent::EnemiesCollided { diamonds, .. } => format!("Enemies collided: {diamonds} diamonds"),
        GameEvent::PlayerKilled { cause: DeathCause::Crushed } => "Crushed by a boulder".to_string(),
        GameEvent::PlayerKilled { cause: DeathCause::Enemy } => "Caught by an enemy".to_string(),
        GameEvent::LevelCompleted => format!("Cave cleared! Score {}", world.session.score),
        GameEvent::LevelRestarted => "Try again".to_string(),
        _ => return None,
    };
    Some(text)
}

/// Transient message shown under the map.
#[derive(Default)]
struct StatusLine {
    text: String,
    ticks_left: u32,
}

impl StatusLine {
    fn show(&mut self, text: String) {
        self.text = text;
        self.ticks_left = MESSAGE_TICKS;
    }

    fn clear(&mut self) {
        self.text.clear();
        self.ticks_left = 0;
    }

    fn tick(&mut self) {
        if self.ticks_left > 0 {
            self.ticks_left -= 1;
            if self.ticks_left == 0 {
                self.text.clear();
            }
        }
    }

    fn text(&self) -> &str {
        &self.text
    }
}
