//! Arena - console play and tournaments for the fourplay Connect 4 engine
//!
//! Two commands:
//! 1. `play` - a human plays the MCTS engine in the terminal
//! 2. `tournament` - the MCTS engine plays a series of games against another
//!    policy, alternating colours, and reports the tally

use anyhow::Result;
use clap::Parser;
use games_connect4::Player;
use tracing::{error, info, warn};

mod config;
mod console;
mod mcts_policy;
mod persist;
mod policy;
mod tournament;

use crate::config::{Command, Config, OpponentKind, Side};
use crate::mcts_policy::MctsPolicy;
use crate::policy::{GreedyPolicy, Policy, RandomPolicy};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn engine_policy(config: &Config) -> Result<MctsPolicy> {
    let mut policy = MctsPolicy::new(config.mcts_config()?);
    if let Some(path) = config.store_file() {
        policy = policy.with_store_path(path);
    }
    Ok(policy)
}

fn opponent_policy(config: &Config, kind: OpponentKind) -> Result<Box<dyn Policy>> {
    Ok(match kind {
        OpponentKind::Random => match config.seed {
            0 => Box::new(RandomPolicy::new()),
            seed => Box::new(RandomPolicy::with_seed(seed.wrapping_add(1))),
        },
        OpponentKind::Greedy => Box::new(GreedyPolicy),
        OpponentKind::Mcts => {
            // Same search settings, separate tree and no shared store file
            let mcts = config.mcts_config()?;
            let seed = mcts.seed.map(|s| s.wrapping_add(1));
            Box::new(MctsPolicy::new(mcts.with_seed(seed)).with_name("mcts-b"))
        }
    })
}

fn run(config: Config) -> Result<()> {
    match &config.command {
        Command::Play { side } => {
            let human = match side {
                Side::X => Player::Red,
                Side::O => Player::Yellow,
            };
            let mut engine = engine_policy(&config)?;
            engine.mount()?;

            let stdin = std::io::stdin();
            let outcome = console::play_console(&mut engine, human, stdin.lock(), std::io::stdout())?;
            info!(?outcome, "Console game finished");

            engine.finalize()?;
        }
        Command::Tournament {
            games,
            opponent,
            output,
        } => {
            let mut engine = engine_policy(&config)?;
            let mut other = opponent_policy(&config, opponent.parse()?)?;

            let results = tournament::tournament(&mut engine, other.as_mut(), *games)?;
            info!(searched_moves = engine.searched_moves(), "Engine search summary");

            println!(
                "{} vs {}: {} wins / {} losses / {} draws over {} games (score {:.3}, {} forfeits, {:.1} moves/game, {:.1}s)",
                results.policy_a,
                results.policy_b,
                results.a_wins,
                results.b_wins,
                results.draws,
                results.games,
                results.a_score(),
                results.forfeits,
                results.avg_game_length,
                results.elapsed_seconds,
            );

            if let Some(path) = output {
                results.write_json(path)?;
                info!(path = %path.display(), "Wrote tournament results");
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Validate configuration
    config.validate()?;

    // Initialize tracing
    init_tracing(&config.log_level)?;
    info!(
        log_level = %config.log_level,
        time_budget_ms = config.time_budget_ms,
        rollout = %config.rollout,
        store = config.store_enabled,
        "Arena starting"
    );

    if config.store_enabled {
        if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
            warn!(data_dir = %config.data_dir, "Failed to create data directory: {}", e);
        }
    }

    match run(config) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Arena failed: {:#}", e);
            Err(e)
        }
    }
}
