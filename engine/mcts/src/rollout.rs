//! Rollout (playout) policies used by the simulate phase.

use std::fmt;
use std::str::FromStr;

use games_connect4::{Board, Outcome, Player, CENTER_COLUMN};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::ParseOptionError;
use crate::search::SearchError;

/// How moves are chosen during a playout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RolloutPolicy {
    /// Win now, else block, else center, else uniform random.
    #[default]
    Heuristic,
    /// Uniform random legal column at every ply.
    UniformRandom,
}

impl RolloutPolicy {
    /// Pick a column for `player` on `board`. `None` only if no column is legal.
    pub fn choose<R: Rng + ?Sized>(self, board: &Board, player: Player, rng: &mut R) -> Option<u8> {
        if self == RolloutPolicy::Heuristic {
            if let Some(col) = board.winning_column(player) {
                return Some(col);
            }
            if let Some(col) = board.winning_column(player.opponent()) {
                return Some(col);
            }
            if board.is_legal(CENTER_COLUMN) {
                return Some(CENTER_COLUMN);
            }
        }

        board.legal_actions().choose(rng).copied()
    }
}

impl fmt::Display for RolloutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RolloutPolicy::Heuristic => write!(f, "heuristic"),
            RolloutPolicy::UniformRandom => write!(f, "random"),
        }
    }
}

impl FromStr for RolloutPolicy {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heuristic" => Ok(RolloutPolicy::Heuristic),
            "random" | "uniform" => Ok(RolloutPolicy::UniformRandom),
            _ => Err(ParseOptionError {
                option: "rollout",
                value: s.to_string(),
            }),
        }
    }
}

/// Play from `board` with `player` to move until the game ends.
///
/// The board is copied; nothing is written back. Returns the terminal outcome.
pub fn playout<R: Rng + ?Sized>(
    board: &Board,
    player: Player,
    policy: RolloutPolicy,
    rng: &mut R,
) -> Result<Outcome, SearchError> {
    let mut board = *board;
    let mut player = player;

    loop {
        debug_assert!(!board.is_draw(), "playout started from a full board");
        let col = policy
            .choose(&board, player, rng)
            .ok_or(SearchError::NoLegalMoves)?;
        let row = board.apply_move(col, player)?;

        if board.detect_win(row, col as usize, player) {
            return Ok(Outcome::Win(player));
        }
        if board.is_draw() {
            return Ok(Outcome::Draw);
        }
        player = player.opponent();
    }
}
