//! Default configuration values loaded from config.defaults.toml.
//!
//! The shared TOML file is embedded at compile time so the binary and any
//! tooling reading the same file agree on every default.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    mcts: MctsDefaults,
    store: StoreDefaults,
    tournament: TournamentDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    exploration: f64,
    time_budget_ms: u64,
    expansion: String,
    rollout: String,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct StoreDefaults {
    enabled: bool,
    path: String,
}

#[derive(Debug, Deserialize)]
struct TournamentDefaults {
    games: u32,
    opponent: String,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// MCTS
pub fn exploration() -> f64 {
    DEFAULTS.mcts.exploration
}
pub fn time_budget_ms() -> u64 {
    DEFAULTS.mcts.time_budget_ms
}
pub fn expansion() -> &'static str {
    &DEFAULTS.mcts.expansion
}
pub fn rollout() -> &'static str {
    &DEFAULTS.mcts.rollout
}
pub fn seed() -> u64 {
    DEFAULTS.mcts.seed
}

// Store
pub fn store_enabled() -> bool {
    DEFAULTS.store.enabled
}
pub fn store_path() -> &'static str {
    &DEFAULTS.store.path
}

// Tournament
pub fn games() -> u32 {
    DEFAULTS.tournament.games
}
pub fn opponent() -> &'static str {
    &DEFAULTS.tournament.opponent
}
