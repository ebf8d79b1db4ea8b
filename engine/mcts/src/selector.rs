//! Move selection: cheap shortcuts first, tree search otherwise.

use games_connect4::{Board, Player, CENTER_COLUMN};
use tracing::{debug, warn};

use crate::config::MctsConfig;
use crate::search::{MctsSearch, SearchError};
use crate::stats::{StatsStore, StatsTable};

/// Why a column was chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecisionReason {
    /// The mover completes four in a row.
    ImmediateWin,
    /// The opponent would complete four in a row there next turn.
    Block,
    /// Empty board, center column.
    Opening,
    /// Most visited root child after searching.
    Search {
        cycles: u32,
        visits: u32,
        reused: bool,
    },
    /// The search produced no children in time.
    Fallback,
}

/// A chosen column and the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub column: u8,
    pub reason: DecisionReason,
}

/// Picks a legal column for whoever is to move on a board.
///
/// Keeps one search tree alive between calls so that the subtree under the
/// opponent's reply can be reused on the next turn.
pub struct MoveSelector<S: StatsStore = StatsTable> {
    search: MctsSearch<S>,
}

impl<S: StatsStore> MoveSelector<S> {
    pub fn new(config: MctsConfig) -> Self {
        Self {
            search: MctsSearch::new(config, Board::new(), Player::Red),
        }
    }

    /// Attach a statistics store to the underlying search.
    pub fn with_store(mut self, store: S) -> Self {
        self.search = self.search.with_store(store);
        self
    }

    pub fn search(&self) -> &MctsSearch<S> {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut MctsSearch<S> {
        &mut self.search
    }

    /// Column to play on `board`.
    pub fn select_move(&mut self, board: &Board) -> Result<u8, SearchError> {
        self.act(board).map(|decision| decision.column)
    }

    /// Decide a move for the player to move on `board`.
    ///
    /// The returned column is always legal on `board`. Fails with
    /// [`SearchError::GameOver`] if the board is already won or full.
    pub fn act(&mut self, board: &Board) -> Result<Decision, SearchError> {
        if board.outcome().is_some() {
            return Err(SearchError::GameOver);
        }

        let mover = board.to_move();

        if let Some(column) = board.winning_column(mover) {
            debug!(column, player = %mover, "Immediate win");
            return Ok(Decision {
                column,
                reason: DecisionReason::ImmediateWin,
            });
        }

        if let Some(column) = board.winning_column(mover.opponent()) {
            debug!(column, player = %mover, "Blocking opponent threat");
            return Ok(Decision {
                column,
                reason: DecisionReason::Block,
            });
        }

        if board.is_empty() && board.is_legal(CENTER_COLUMN) {
            debug!(column = CENTER_COLUMN, "Opening move");
            return Ok(Decision {
                column: CENTER_COLUMN,
                reason: DecisionReason::Opening,
            });
        }

        let reused = self.search.transplant(board, mover);
        let budget = self.search.config().time_budget;
        let stats = self.search.run(budget)?;

        match self.search.tree().best_action() {
            Some((column, visits)) => {
                if let Some(edge) = self.search.store().and_then(|s| s.get(board, column)) {
                    debug!(
                        column,
                        stored_visits = edge.visits,
                        stored_mean = edge.mean_reward,
                        "Stored statistics for chosen move"
                    );
                }
                debug!(column, visits, cycles = stats.cycles, reused, "Search decision");
                self.search.advance(column);
                Ok(Decision {
                    column,
                    reason: DecisionReason::Search {
                        cycles: stats.cycles,
                        visits,
                        reused,
                    },
                })
            }
            None => {
                let column = self
                    .search
                    .random_action(board)
                    .ok_or(SearchError::NoLegalMoves)?;
                warn!(column, ?budget, "Search produced no children, playing random column");
                Ok(Decision {
                    column,
                    reason: DecisionReason::Fallback,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn play(columns: &[u8]) -> Board {
        let mut board = Board::new();
        let mut player = Player::Red;
        for &col in columns {
            board.apply_move(col, player).unwrap();
            player = player.opponent();
        }
        board
    }

    fn selector(budget_ms: u64) -> MoveSelector {
        MoveSelector::new(MctsConfig::for_testing().with_time_budget(Duration::from_millis(budget_ms)))
    }

    #[test]
    fn test_opening_skips_search() {
        let mut sel = selector(50);
        let decision = sel.act(&Board::new()).unwrap();
        assert_eq!(decision.column, 3);
        assert_eq!(decision.reason, DecisionReason::Opening);
        assert_eq!(sel.search().tree().len(), 1);
    }

    #[test]
    fn test_win_beats_block() {
        // Red to move: Red wins at 3, Yellow threatens 6
        let board = play(&[0, 6, 1, 6, 2, 6]);
        let decision = selector(0).act(&board).unwrap();
        assert_eq!(decision.column, 3);
        assert_eq!(decision.reason, DecisionReason::ImmediateWin);
    }

    #[test]
    fn test_block() {
        // Yellow to move, Red threatens 3
        let board = play(&[0, 6, 1, 6, 2]);
        let decision = selector(0).act(&board).unwrap();
        assert_eq!(decision.column, 3);
        assert_eq!(decision.reason, DecisionReason::Block);
    }

    #[test]
    fn test_zero_budget_falls_back_to_random_legal() {
        let board = play(&[3]);
        let mut sel = selector(0);
        for _ in 0..10 {
            let decision = sel.act(&board).unwrap();
            assert_eq!(decision.reason, DecisionReason::Fallback);
            assert!(board.is_legal(decision.column));
        }
    }

    #[test]
    fn test_search_decision_is_legal_and_advances_root() {
        let board = play(&[3, 3]);
        let mut sel = selector(30);
        let decision = sel.act(&board).unwrap();

        assert!(board.is_legal(decision.column));
        match decision.reason {
            DecisionReason::Search { cycles, visits, reused } => {
                assert!(cycles > 0);
                assert!(visits > 0);
                assert!(!reused);
            }
            other => panic!("expected a search decision, got {:?}", other),
        }

        // Root now sits on the board after our move, opponent to move
        let mut expected = board;
        expected.apply_move(decision.column, Player::Red).unwrap();
        let root = sel.search().tree().get(sel.search().tree().root());
        assert_eq!(root.board, expected);
        assert_eq!(root.player, Player::Yellow);
    }

    #[test]
    fn test_game_over_is_an_error() {
        let board = play(&[0, 6, 1, 6, 2, 6, 3]);
        assert!(matches!(selector(10).act(&board), Err(SearchError::GameOver)));
    }
}
