//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_exploration() -> f64 {
    defaults::exploration()
}
fn d_time_budget_ms() -> u64 {
    defaults::time_budget_ms()
}
fn d_expansion() -> String {
    defaults::expansion().into()
}
fn d_rollout() -> String {
    defaults::rollout().into()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_store_enabled() -> bool {
    defaults::store_enabled()
}
fn d_store_path() -> String {
    defaults::store_path().into()
}
fn d_games() -> u32 {
    defaults::games()
}
fn d_opponent() -> String {
    defaults::opponent().into()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub tournament: TournamentConfig,
}

/// Common configuration shared by all commands
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            log_level: defaults::log_level().into(),
        }
    }
}

/// MCTS (Monte Carlo Tree Search) configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    /// UCB1 exploration constant
    #[serde(default = "d_exploration")]
    pub exploration: f64,
    /// Search time per move in milliseconds
    #[serde(default = "d_time_budget_ms")]
    pub time_budget_ms: u64,
    /// "random" or "ascending"
    #[serde(default = "d_expansion")]
    pub expansion: String,
    /// "heuristic" or "random"
    #[serde(default = "d_rollout")]
    pub rollout: String,
    /// RNG seed, 0 = from entropy
    #[serde(default = "d_seed")]
    pub seed: u64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration: defaults::exploration(),
            time_budget_ms: defaults::time_budget_ms(),
            expansion: defaults::expansion().into(),
            rollout: defaults::rollout().into(),
            seed: defaults::seed(),
        }
    }
}

/// Statistics Store persistence
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    #[serde(default = "d_store_enabled")]
    pub enabled: bool,
    /// JSON file the store is loaded from and flushed to
    #[serde(default = "d_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::store_enabled(),
            path: defaults::store_path().into(),
        }
    }
}

/// Tournament driver configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TournamentConfig {
    #[serde(default = "d_games")]
    pub games: u32,
    /// "random", "greedy" or "mcts"
    #[serde(default = "d_opponent")]
    pub opponent: String,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            games: defaults::games(),
            opponent: defaults::opponent().into(),
        }
    }
}
