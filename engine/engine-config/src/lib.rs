//! Centralized configuration loading from config.toml.
//!
//! This crate provides the configuration structs and loading logic used by
//! the arena binary.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`FOURPLAY_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! FOURPLAY_<SECTION>_<KEY>=value
//!
//! Examples:
//!     FOURPLAY_COMMON_LOG_LEVEL=debug
//!     FOURPLAY_MCTS_TIME_BUDGET_MS=250
//!     FOURPLAY_MCTS_ROLLOUT=random
//!     FOURPLAY_STORE_ENABLED=true
//!     FOURPLAY_TOURNAMENT_GAMES=100
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, CONFIG_ENV_VAR, CONFIG_SEARCH_PATHS,
};
pub use structs::*;
