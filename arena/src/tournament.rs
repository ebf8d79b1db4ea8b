//! Game and tournament driver.

use anyhow::{Context, Result};
use games_connect4::{Board, Outcome, Player};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::persist;
use crate::policy::Policy;

/// A finished game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub outcome: Outcome,
    /// Columns played, in order, Red first.
    pub moves: Vec<u8>,
    /// The loser returned an illegal column.
    pub forfeit: bool,
}

/// Play one game from the empty board. Red moves first.
///
/// An illegal column is an immediate loss for the policy that returned it.
pub fn play_game(red: &mut dyn Policy, yellow: &mut dyn Policy) -> Result<GameRecord> {
    let mut board = Board::new();
    let mut mover = Player::Red;
    let mut moves = Vec::new();

    loop {
        let policy: &mut dyn Policy = match mover {
            Player::Red => &mut *red,
            Player::Yellow => &mut *yellow,
        };
        let column = policy.act(&board)?;

        let row = match board.apply_move(column, mover) {
            Ok(row) => row,
            Err(e) => {
                warn!(policy = policy.name(), player = %mover, column, error = %e, "Illegal move forfeits the game");
                return Ok(GameRecord {
                    outcome: Outcome::Win(mover.opponent()),
                    moves,
                    forfeit: true,
                });
            }
        };
        moves.push(column);

        if board.detect_win(row, column as usize, mover) {
            return Ok(GameRecord {
                outcome: Outcome::Win(mover),
                moves,
                forfeit: false,
            });
        }
        if board.is_draw() {
            return Ok(GameRecord {
                outcome: Outcome::Draw,
                moves,
                forfeit: false,
            });
        }
        mover = mover.opponent();
    }
}

/// Tally of a tournament from the first policy's point of view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentResults {
    pub policy_a: String,
    pub policy_b: String,
    pub games: u32,
    pub a_wins: u32,
    pub b_wins: u32,
    pub draws: u32,
    pub forfeits: u32,
    pub avg_game_length: f64,
    pub elapsed_seconds: f64,
}

impl TournamentResults {
    /// Share of points for A, counting a draw as half a win.
    pub fn a_score(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        (self.a_wins as f64 + 0.5 * self.draws as f64) / self.games as f64
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize results")?;
        persist::write_atomic(path, json.as_bytes())
    }
}

/// Play `games` games between `a` and `b`, alternating who is Red (A starts).
///
/// Both policies are mounted before every game and finalized after the last
/// one.
pub fn tournament(a: &mut dyn Policy, b: &mut dyn Policy, games: u32) -> Result<TournamentResults> {
    info!(policy_a = a.name(), policy_b = b.name(), games, "Starting tournament");

    // Progress bar only when stderr is a TTY
    let progress = if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        let pb = ProgressBar::new(games as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} games ({eta}) {msg}")
                .context("invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let mut results = TournamentResults {
        policy_a: a.name().to_string(),
        policy_b: b.name().to_string(),
        games,
        a_wins: 0,
        b_wins: 0,
        draws: 0,
        forfeits: 0,
        avg_game_length: 0.0,
        elapsed_seconds: 0.0,
    };
    let mut total_moves = 0usize;

    for game in 0..games {
        a.mount()?;
        b.mount()?;

        let a_is_red = game % 2 == 0;
        let record = if a_is_red {
            play_game(&mut *a, &mut *b)?
        } else {
            play_game(&mut *b, &mut *a)?
        };

        match record.outcome {
            Outcome::Draw => results.draws += 1,
            Outcome::Win(winner) if (winner == Player::Red) == a_is_red => results.a_wins += 1,
            Outcome::Win(_) => results.b_wins += 1,
        }
        if record.forfeit {
            results.forfeits += 1;
        }
        total_moves += record.moves.len();

        debug!(
            game,
            a_is_red,
            outcome = ?record.outcome,
            moves = record.moves.len(),
            "Game finished"
        );

        if let Some(pb) = &progress {
            pb.set_message(format!(
                "A {} / B {} / draw {}",
                results.a_wins, results.b_wins, results.draws
            ));
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message("done");
    }

    results.elapsed_seconds = start.elapsed().as_secs_f64();
    if games > 0 {
        results.avg_game_length = total_moves as f64 / games as f64;
    }

    a.finalize()?;
    b.finalize()?;

    info!(
        a_wins = results.a_wins,
        b_wins = results.b_wins,
        draws = results.draws,
        forfeits = results.forfeits,
        "Tournament complete"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{GreedyPolicy, RandomPolicy};
    use tempfile::tempdir;

    /// Always plays the same column, whether or not it is legal.
    struct Fixed(u8);

    impl Policy for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn act(&mut self, _board: &Board) -> Result<u8> {
            Ok(self.0)
        }
    }

    /// Greedy play that counts lifecycle calls.
    #[derive(Default)]
    struct Counting {
        mounts: u32,
        finalizes: u32,
        moves: u32,
    }

    impl Policy for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn mount(&mut self) -> Result<()> {
            self.mounts += 1;
            Ok(())
        }

        fn act(&mut self, board: &Board) -> Result<u8> {
            self.moves += 1;
            GreedyPolicy.act(board)
        }

        fn finalize(&mut self) -> Result<()> {
            self.finalizes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_illegal_column_forfeits() {
        // Both stack column 0; Red's seventh drop overflows it
        let record = play_game(&mut Fixed(0), &mut Fixed(0)).unwrap();
        assert_eq!(record.outcome, Outcome::Win(Player::Yellow));
        assert!(record.forfeit);
        assert_eq!(record.moves, vec![0; 6]);
    }

    #[test]
    fn test_out_of_range_column_forfeits_immediately() {
        let record = play_game(&mut Fixed(7), &mut GreedyPolicy).unwrap();
        assert_eq!(record.outcome, Outcome::Win(Player::Yellow));
        assert!(record.forfeit);
        assert!(record.moves.is_empty());
    }

    #[test]
    fn test_vertical_win_ends_game() {
        // Red stacks column 0, Yellow stacks column 1: Red completes four first
        let record = play_game(&mut Fixed(0), &mut Fixed(1)).unwrap();
        assert_eq!(record.outcome, Outcome::Win(Player::Red));
        assert!(!record.forfeit);
        assert_eq!(record.moves, vec![0, 1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_greedy_beats_fixed() {
        let record = play_game(&mut GreedyPolicy, &mut Fixed(0)).unwrap();
        assert_eq!(record.outcome, Outcome::Win(Player::Red));
    }

    #[test]
    fn test_random_game_is_consistent() {
        let mut red = RandomPolicy::with_seed(1);
        let mut yellow = RandomPolicy::with_seed(2);
        let record = play_game(&mut red, &mut yellow).unwrap();

        assert!(!record.forfeit);
        let mut board = Board::new();
        let mut player = Player::Red;
        for &col in &record.moves {
            board.apply_move(col, player).unwrap();
            player = player.opponent();
        }
        assert_eq!(board.outcome(), Some(record.outcome));
    }

    #[test]
    fn test_tournament_tally_and_lifecycle() {
        let mut a = Counting::default();
        let mut b = RandomPolicy::with_seed(7);

        let results = tournament(&mut a, &mut b, 6).unwrap();
        assert_eq!(results.games, 6);
        assert_eq!(results.a_wins + results.b_wins + results.draws, 6);
        assert_eq!(results.policy_a, "counting");
        assert_eq!(results.policy_b, "random");
        assert!(results.avg_game_length >= 7.0);
        assert_eq!(a.mounts, 6);
        assert_eq!(a.finalizes, 1);
        assert!(a.moves > 0);
    }

    #[test]
    fn test_tournament_alternates_colours() {
        // Fixed(7) always forfeits, so whoever plays it loses every game
        let mut a = GreedyPolicy;
        let mut b = Fixed(7);

        let results = tournament(&mut a, &mut b, 4).unwrap();
        assert_eq!(results.a_wins, 4);
        assert_eq!(results.b_wins, 0);
        assert_eq!(results.forfeits, 4);
        assert!((results.a_score() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_results_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.json");
        let mut a = GreedyPolicy;
        let mut b = Fixed(7);

        let results = tournament(&mut a, &mut b, 2).unwrap();
        results.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["games"], 2);
        assert_eq!(value["a_wins"], 2);
        assert_eq!(value["policy_b"], "fixed");
    }

    #[test]
    fn test_zero_games() {
        let results = tournament(&mut GreedyPolicy, &mut GreedyPolicy, 0).unwrap();
        assert_eq!(results.games, 0);
        assert_eq!(results.a_score(), 0.0);
        assert_eq!(results.avg_game_length, 0.0);
    }
}
