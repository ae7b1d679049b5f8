/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// All durations are in simulation ticks unless the key says otherwise.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub butterfly: EnemyTuning,
    pub firefly: EnemyTuning,
    pub rules: RulesConfig,
    /// Level layout to play instead of the embedded one.
    pub level_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    /// Terminal columns per grid cell.
    pub tile_size: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub player_move_ticks: u32,
    pub death_delay_ticks: u32,
    pub complete_delay_ticks: u32,
}

/// Pacing and sight for one enemy kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyTuning {
    pub base_interval: u32,
    pub chase_interval: u32,
    pub detection_range: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RulesConfig {
    pub amoeba_growth_chance: f64,
    pub diamond_score: u32,
    /// Quota for levels that do not declare one.
    pub default_required: u32,
    /// Fixed RNG seed; drawn at startup when absent.
    pub seed: Option<u64>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    butterfly: TomlEnemy,
    #[serde(default)]
    firefly: TomlEnemy,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_player_move")]
    player_move_ticks: u32,
    #[serde(default = "default_death_delay")]
    death_delay_ticks: u32,
    #[serde(default = "default_complete_delay")]
    complete_delay_ticks: u32,
}

/// Partial enemy section; missing keys fall back per kind.
#[derive(Deserialize, Debug, Default)]
struct TomlEnemy {
    base_interval: Option<u32>,
    chase_interval: Option<u32>,
    detection_range: Option<i32>,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_growth_chance")]
    amoeba_growth_chance: f64,
    #[serde(default = "default_diamond_score")]
    diamond_score: u32,
    #[serde(default = "default_required")]
    default_required: u32,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    level_file: Option<String>,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_tile_size")]
    tile_size: u32,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 50 }
fn default_player_move() -> u32 { 3 }      // 150ms per step
fn default_death_delay() -> u32 { 40 }     // 2s before restart
fn default_complete_delay() -> u32 { 40 }
fn default_growth_chance() -> f64 { 0.10 }
fn default_diamond_score() -> u32 { 10 }
fn default_required() -> u32 { 10 }
fn default_log_file() -> String { "gemfall.log".into() }
fn default_tile_size() -> u32 { 2 }

const BUTTERFLY: EnemyTuning = EnemyTuning { base_interval: 10, chase_interval: 6, detection_range: 5 };
const FIREFLY: EnemyTuning = EnemyTuning { base_interval: 10, chase_interval: 5, detection_range: 6 };

impl TomlEnemy {
    fn resolve(&self, fallback: EnemyTuning) -> EnemyTuning {
        EnemyTuning {
            base_interval: self.base_interval.unwrap_or(fallback.base_interval),
            chase_interval: self.chase_interval.unwrap_or(fallback.chase_interval),
            detection_range: self.detection_range.unwrap_or(fallback.detection_range),
        }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            player_move_ticks: default_player_move(),
            death_delay_ticks: default_death_delay(),
            complete_delay_ticks: default_complete_delay(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            amoeba_growth_chance: default_growth_chance(),
            diamond_score: default_diamond_score(),
            default_required: default_required(),
            seed: None,
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            level_file: None,
            log_file: default_log_file(),
            tile_size: default_tile_size(),
        }
    }
}

// ── Conversion ──

impl TomlConfig {
    fn into_config(self) -> Result<GameConfig, ConfigError> {
        let chance = self.rules.amoeba_growth_chance;
        if !(0.0..=1.0).contains(&chance) {
            return Err(ConfigError::Invalid {
                key: "rules.amoeba_growth_chance",
                expected: "between 0.0 and 1.0",
            });
        }
        if self.general.tile_size == 0 {
            return Err(ConfigError::Invalid { key: "general.tile_size", expected: "at least 1" });
        }
        if self.speed.tick_rate_ms == 0 {
            return Err(ConfigError::Invalid { key: "speed.tick_rate_ms", expected: "at least 1" });
        }

        let log_file = match self.general.log_file.as_str() {
            "" => None,
            path => Some(PathBuf::from(path)),
        };

        Ok(GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: self.speed.tick_rate_ms,
                player_move_ticks: self.speed.player_move_ticks,
                death_delay_ticks: self.speed.death_delay_ticks,
                complete_delay_ticks: self.speed.complete_delay_ticks,
            },
            butterfly: self.butterfly.resolve(BUTTERFLY),
            firefly: self.firefly.resolve(FIREFLY),
            rules: RulesConfig {
                amoeba_growth_chance: chance,
                diamond_score: self.rules.diamond_score,
                default_required: self.rules.default_required,
                seed: self.rules.seed,
            },
            level_file: self.general.level_file.map(PathBuf::from),
            log_file,
            tile_size: self.general.tile_size,
        })
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: default_tick_rate(),
                player_move_ticks: default_player_move(),
                death_delay_ticks: default_death_delay(),
                complete_delay_ticks: default_complete_delay(),
            },
            butterfly: BUTTERFLY,
            firefly: FIREFLY,
            rules: RulesConfig {
                amoeba_growth_chance: default_growth_chance(),
                diamond_score: default_diamond_score(),
                default_required: default_required(),
                seed: None,
            },
            level_file: None,
            log_file: Some(PathBuf::from(default_log_file())),
            tile_size: default_tile_size(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Parse a config document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str::<TomlConfig>(text)?.into_config()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let mut cfg = Self::from_toml_str(&text)?;
        // A relative level path is relative to the config file.
        if let (Some(level), Some(dir)) = (&cfg.level_file, path.parent()) {
            if level.is_relative() {
                cfg.level_file = Some(dir.join(level));
            }
        }
        Ok(cfg)
    }

    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    ///
    /// Returns the config to use plus the error, if any, that forced a
    /// fall back to defaults. Logging is not up yet when this runs, so
    /// reporting is left to the caller.
    pub fn load() -> (Self, Option<ConfigError>) {
        match find_config(&candidate_dirs()) {
            Some(path) => match Self::from_file(&path) {
                Ok(cfg) => (cfg, None),
                Err(e) => (Self::default(), Some(e)),
            },
            None => (Self::default(), None),
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn find_config(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs
        .iter()
        .map(|dir| dir.join("config.toml"))
        .find(|path| path.is_file())
}
