//! Move-selection policies that can sit at the board

use anyhow::{anyhow, Result};
use games_connect4::Board;
use rand::prelude::*;
use rand_chacha::ChaCha20Rng;

/// A player in a game or tournament.
///
/// `mount` runs before every game and `finalize` once after the last one;
/// both default to no-ops.
pub trait Policy {
    fn name(&self) -> &str;

    fn mount(&mut self) -> Result<()> {
        Ok(())
    }

    /// Column to play for whoever is to move on `board`.
    fn act(&mut self, board: &Board) -> Result<u8>;

    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Uniformly random legal column.
#[derive(Debug)]
pub struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    pub fn new() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn act(&mut self, board: &Board) -> Result<u8> {
        board
            .legal_actions()
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| anyhow!("no legal columns on a full board"))
    }
}

/// Column preference when nothing is forced: center outwards, left first.
pub const GREEDY_PREFERENCE: [u8; 7] = [3, 2, 4, 1, 5, 0, 6];

/// Deterministic one-ply player: win now, else block, else the first legal
/// column in [`GREEDY_PREFERENCE`].
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyPolicy;

impl Policy for GreedyPolicy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn act(&mut self, board: &Board) -> Result<u8> {
        let mover = board.to_move();
        if let Some(col) = board.winning_column(mover) {
            return Ok(col);
        }
        if let Some(col) = board.winning_column(mover.opponent()) {
            return Ok(col);
        }
        GREEDY_PREFERENCE
            .into_iter()
            .find(|&col| board.is_legal(col))
            .ok_or_else(|| anyhow!("no legal columns on a full board"))
    }
}
