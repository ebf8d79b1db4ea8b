//! Configuration for the arena binary
//!
//! Defaults come from the central config (config.toml plus `FOURPLAY_*`
//! environment overrides). CLI arguments take highest priority.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use engine_config::{load_config, CentralConfig};
use mcts::{ExpansionOrder, MctsConfig, RolloutPolicy};
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::time::Duration;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

fn default_exploration() -> f64 {
    CENTRAL_CONFIG.mcts.exploration
}

fn default_time_budget_ms() -> u64 {
    CENTRAL_CONFIG.mcts.time_budget_ms
}

fn default_expansion() -> String {
    CENTRAL_CONFIG.mcts.expansion.clone()
}

fn default_rollout() -> String {
    CENTRAL_CONFIG.mcts.rollout.clone()
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.mcts.seed
}

fn default_store_enabled() -> bool {
    CENTRAL_CONFIG.store.enabled
}

fn default_store_path() -> String {
    CENTRAL_CONFIG.store.path.clone()
}

fn default_games() -> u32 {
    CENTRAL_CONFIG.tournament.games
}

fn default_opponent() -> String {
    CENTRAL_CONFIG.tournament.opponent.clone()
}

/// Which side the human takes in console play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Side {
    /// Red, moves first
    X,
    /// Yellow, moves second
    O,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Play against the engine in the terminal
    Play {
        /// Side to play as
        #[arg(long, value_enum, default_value_t = Side::X)]
        side: Side,
    },
    /// Pit the engine against another policy
    Tournament {
        /// Number of games; colours alternate every game
        #[arg(long, default_value_t = default_games())]
        games: u32,

        /// Opponent policy (random, greedy, mcts)
        #[arg(long, default_value_t = default_opponent())]
        opponent: String,

        /// Write the final tally as JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Parser, Debug, Clone)]
#[command(name = "arena")]
#[command(about = "fourplay arena - play Connect 4 against the MCTS engine")]
#[command(
    long_about = "Console play and tournaments for the Connect 4 MCTS engine.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value_t = default_log_level())]
    pub log_level: String,

    /// Data directory for persisted files
    #[arg(long, global = true, default_value_t = default_data_dir())]
    pub data_dir: String,

    /// UCB1 exploration constant
    #[arg(long, global = true, default_value_t = default_exploration())]
    pub exploration: f64,

    /// Wall-clock search budget per move in milliseconds
    #[arg(long, global = true, default_value_t = default_time_budget_ms())]
    pub time_budget_ms: u64,

    /// Expansion order of untried columns (random, ascending)
    #[arg(long, global = true, default_value_t = default_expansion())]
    pub expansion: String,

    /// Rollout policy (heuristic, random)
    #[arg(long, global = true, default_value_t = default_rollout())]
    pub rollout: String,

    /// RNG seed (0 seeds from entropy)
    #[arg(long, global = true, default_value_t = default_seed())]
    pub seed: u64,

    /// Persist edge statistics between runs
    #[arg(long, global = true, action = clap::ArgAction::Set, default_value_t = default_store_enabled())]
    pub store_enabled: bool,

    /// Path of the JSON statistics store
    #[arg(long, global = true, default_value_t = default_store_path())]
    pub store_path: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(anyhow!(
                "exploration must be a non-negative number, got {}",
                self.exploration
            ));
        }

        if self.time_budget_ms == 0 {
            return Err(anyhow!("time_budget_ms must be greater than 0"));
        }

        self.expansion.parse::<ExpansionOrder>()?;
        self.rollout.parse::<RolloutPolicy>()?;

        if self.store_enabled && self.store_path.is_empty() {
            return Err(anyhow!("store_path cannot be empty when the store is enabled"));
        }

        if let Command::Tournament {
            games, opponent, ..
        } = &self.command
        {
            if *games == 0 {
                return Err(anyhow!("games must be greater than 0"));
            }
            opponent.parse::<OpponentKind>()?;
        }

        Ok(())
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    /// Search configuration for the engine. A seed of 0 means entropy.
    pub fn mcts_config(&self) -> Result<MctsConfig> {
        Ok(MctsConfig::for_play()
            .with_exploration(self.exploration)
            .with_time_budget(self.time_budget())
            .with_expansion(self.expansion.parse()?)
            .with_rollout(self.rollout.parse()?)
            .with_seed((self.seed != 0).then_some(self.seed)))
    }

    /// Store file when persistence is enabled.
    pub fn store_file(&self) -> Option<PathBuf> {
        self.store_enabled.then(|| PathBuf::from(&self.store_path))
    }
}

/// Opponent policies selectable for a tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentKind {
    Random,
    Greedy,
    Mcts,
}

impl std::str::FromStr for OpponentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(OpponentKind::Random),
            "greedy" => Ok(OpponentKind::Greedy),
            "mcts" => Ok(OpponentKind::Mcts),
            _ => Err(anyhow!(
                "unknown opponent '{}', expected one of random, greedy, mcts",
                s
            )),
        }
    }
}
