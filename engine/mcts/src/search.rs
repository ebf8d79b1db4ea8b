//! MCTS search implementation.
//!
//! Implements the core MCTS loop under a wall-clock budget:
//! 1. Selection: descend from the root with UCB1 until a node has something
//!    left to expand (or nothing to descend into)
//! 2. Expansion: add one child for an untried action
//! 3. Simulation: play the new child out to the end of the game
//! 4. Backpropagation: fold the result into every node on the path and, if a
//!    store is attached, into the (board, action) edge statistics
//!
//! Rewards are relative to one fixed searching player: +1 if that player won
//! the playout, -1 if the opponent did, 0 for a draw.

use std::time::{Duration, Instant};

use games_connect4::{Board, BoardError, Outcome, Player};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::{ExpansionOrder, MctsConfig};
use crate::node::NodeId;
use crate::rollout::playout;
use crate::stats::{StatsStore, StatsTable};
use crate::tree::MctsTree;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Board error: {0}")]
    Board(#[from] BoardError),

    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("Game is already over")]
    GameOver,
}

/// Summary of one call to [`MctsSearch::run`] or [`MctsSearch::run_cycles`].
#[derive(Debug, Clone, Copy)]
pub struct SearchStats {
    /// Completed select/expand/simulate/backpropagate cycles
    pub cycles: u32,

    /// Wall-clock time spent
    pub elapsed: Duration,

    /// Nodes in the tree afterwards
    pub tree_size: usize,

    /// Root visit count afterwards (includes visits kept from a transplant)
    pub root_visits: u32,
}

/// MCTS search state.
///
/// Owns the tree, the RNG and (optionally) a statistics store. The tree is
/// single-writer: only this struct mutates it.
pub struct MctsSearch<S: StatsStore = StatsTable> {
    tree: MctsTree,
    config: MctsConfig,
    searching_player: Player,
    store: Option<S>,
    rng: ChaCha20Rng,
}

impl<S: StatsStore> MctsSearch<S> {
    /// Create a new search rooted at `board`, searching on behalf of `player`.
    pub fn new(config: MctsConfig, board: Board, player: Player) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };

        Self {
            tree: MctsTree::new(board, player),
            config,
            searching_player: player,
            store: None,
            rng,
        }
    }

    /// Attach a statistics store.
    pub fn with_store(mut self, store: S) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the attached store, returning the previous one.
    pub fn set_store(&mut self, store: Option<S>) -> Option<S> {
        std::mem::replace(&mut self.store, store)
    }

    pub fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }

    /// Detach the store, e.g. to persist it.
    pub fn take_store(&mut self) -> Option<S> {
        self.store.take()
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree {
        &self.tree
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn searching_player(&self) -> Player {
        self.searching_player
    }

    /// Discard the tree and search `board` on behalf of `player`.
    pub fn reset(&mut self, board: &Board, player: Player) {
        self.tree.reset(*board, player);
        self.searching_player = player;
    }

    /// Point the root at (`board`, `player`), reusing a matching subtree.
    ///
    /// The tree is reset when `player` is not the player this search has been
    /// accumulating rewards for. Returns true if statistics were kept.
    pub fn transplant(&mut self, board: &Board, player: Player) -> bool {
        if player != self.searching_player {
            debug!(
                from = %self.searching_player,
                to = %player,
                "Searching player changed, resetting tree"
            );
            self.reset(board, player);
            return false;
        }
        self.tree.transplant(board, player)
    }

    /// Promote the root's child for `action` to root (after playing it).
    pub fn advance(&mut self, action: u8) -> bool {
        self.tree.advance(action)
    }

    /// Run cycles until `budget` has elapsed.
    ///
    /// The deadline is checked after every completed cycle, never during one,
    /// so the last cycle may overrun slightly. It is also checked once before
    /// the first cycle: a zero budget runs nothing and leaves the root without
    /// children, which is what lets [`MoveSelector`](crate::MoveSelector) take
    /// its random fallback.
    pub fn run(&mut self, budget: Duration) -> Result<SearchStats, SearchError> {
        let start = Instant::now();
        let mut cycles = 0u32;

        while start.elapsed() < budget {
            self.cycle()?;
            cycles += 1;
        }

        Ok(self.summarize(cycles, start.elapsed()))
    }

    /// Run exactly `n` cycles regardless of time.
    pub fn run_cycles(&mut self, n: u32) -> Result<SearchStats, SearchError> {
        let start = Instant::now();
        for _ in 0..n {
            self.cycle()?;
        }
        Ok(self.summarize(n, start.elapsed()))
    }

    fn summarize(&self, cycles: u32, elapsed: Duration) -> SearchStats {
        let stats = SearchStats {
            cycles,
            elapsed,
            tree_size: self.tree.len(),
            root_visits: self.tree.get(self.tree.root()).visit_count,
        };
        debug!(
            cycles = stats.cycles,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            tree_size = stats.tree_size,
            root_visits = stats.root_visits,
            "MCTS search finished"
        );
        stats
    }

    /// One select -> expand -> simulate -> backpropagate cycle.
    fn cycle(&mut self) -> Result<(), SearchError> {
        let selected = self.select();
        let leaf = self.expand(selected)?;
        let outcome = self.simulate(leaf)?;
        self.backpropagate(leaf, outcome);

        trace!(
            selected = selected.0,
            leaf = leaf.0,
            outcome = ?outcome,
            "MCTS cycle complete"
        );
        Ok(())
    }

    /// Descend from the root to the node the next expansion starts from.
    pub fn select(&self) -> NodeId {
        let mut current = self.tree.root();

        loop {
            let node = self.tree.get(current);
            if node.is_leaf() {
                return current;
            }

            match self.tree.select_child(current, self.config.exploration) {
                Some(child_id) => current = child_id,
                None => return current,
            }
        }
    }

    /// Add one child to `node_id` for an untried action and return it.
    ///
    /// A node with nothing left to try (terminal) is returned unchanged.
    pub fn expand(&mut self, node_id: NodeId) -> Result<NodeId, SearchError> {
        let node = self.tree.get(node_id);
        if node.untried.is_empty() {
            return Ok(node_id);
        }

        let index = match self.config.expansion {
            ExpansionOrder::Random => self.rng.gen_range(0..node.untried.len()),
            ExpansionOrder::Ascending => 0,
        };
        let action = node.untried[index];
        let player = node.player;

        let mut board = node.board;
        let row = board.apply_move(action, player)?;
        let terminal = if board.detect_win(row, action as usize, player) {
            Some(Outcome::Win(player))
        } else if board.is_draw() {
            Some(Outcome::Draw)
        } else {
            None
        };

        Ok(self
            .tree
            .add_child(node_id, action, board, player.opponent(), terminal))
    }

    /// Play out from `node_id` and return the terminal outcome.
    ///
    /// Terminal nodes return their stored outcome without playing. The
    /// playout never adds nodes to the tree.
    pub fn simulate(&mut self, node_id: NodeId) -> Result<Outcome, SearchError> {
        let node = self.tree.get(node_id);
        if let Some(outcome) = node.terminal {
            return Ok(outcome);
        }

        let (board, player) = (node.board, node.player);
        playout(&board, player, self.config.rollout, &mut self.rng)
    }

    /// Fold `outcome` into every node from `node_id` up to the root, and into
    /// the store entry of every edge on that path.
    pub fn backpropagate(&mut self, node_id: NodeId, outcome: Outcome) {
        let reward = self.reward(outcome);
        self.tree.backpropagate(node_id, reward);

        let Some(store) = self.store.as_mut() else {
            return;
        };

        let mut current = node_id;
        loop {
            let node = self.tree.get(current);
            if node.parent.is_none() {
                break;
            }
            let parent = self.tree.get(node.parent);
            store.update(&parent.board, node.action, reward);
            current = node.parent;
        }
    }

    /// Reward of `outcome` for the searching player.
    pub fn reward(&self, outcome: Outcome) -> f64 {
        match outcome.winner() {
            Some(winner) if winner == self.searching_player => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        }
    }

    /// Most visited root action, ties to the lowest column.
    pub fn best_action(&self) -> Option<u8> {
        self.tree.best_action().map(|(action, _)| action)
    }

    /// Uniformly random legal column on `board`.
    pub fn random_action(&mut self, board: &Board) -> Option<u8> {
        board.legal_actions().choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollout::RolloutPolicy;

    fn play(columns: &[u8]) -> Board {
        let mut board = Board::new();
        let mut player = Player::Red;
        for &col in columns {
            board.apply_move(col, player).unwrap();
            player = player.opponent();
        }
        board
    }

    fn search(board: Board, player: Player) -> MctsSearch {
        MctsSearch::new(MctsConfig::for_testing(), board, player)
    }

    #[test]
    fn test_reward_is_relative_to_searching_player() {
        let s = search(Board::new(), Player::Yellow);
        assert_eq!(s.reward(Outcome::Win(Player::Yellow)), 1.0);
        assert_eq!(s.reward(Outcome::Win(Player::Red)), -1.0);
        assert_eq!(s.reward(Outcome::Draw), 0.0);
    }

    #[test]
    fn test_select_returns_root_until_fully_expanded() {
        let mut s = search(Board::new(), Player::Red);
        let root = s.tree().root();

        for expected in 0..7u8 {
            assert_eq!(s.select(), root);
            let child = s.expand(root).unwrap();
            assert_eq!(s.tree().get(child).action, expected);
            s.backpropagate(child, Outcome::Draw);
        }

        // Fully expanded, all children visited once: UCB picks among them
        let selected = s.select();
        assert_ne!(selected, root);
        assert_eq!(s.tree().get(selected).parent, root);
    }

    #[test]
    fn test_expand_creates_child_with_opponent_to_move() {
        let mut s = search(Board::new(), Player::Red);
        let root = s.tree().root();
        let child = s.expand(root).unwrap();

        let node = s.tree().get(child);
        assert_eq!(node.player, Player::Yellow);
        assert_eq!(node.board, play(&[0]));
        assert_eq!(node.untried.len(), 7);
        assert!(!s.tree().get(root).untried.contains(&0));
    }

    #[test]
    fn test_winning_expansion_is_terminal() {
        // Red can only win at 3 from here; ascending order reaches it on the 4th expansion
        let board = play(&[0, 0, 1, 1, 2, 2]);
        let mut s = search(board, Player::Red);
        let root = s.tree().root();

        let mut winning = None;
        for _ in 0..4 {
            winning = Some(s.expand(root).unwrap());
        }
        let winning = winning.unwrap();
        let node = s.tree().get(winning);
        assert_eq!(node.action, 3);
        assert_eq!(node.terminal, Some(Outcome::Win(Player::Red)));
        assert!(node.untried.is_empty());

        // Terminal node: expand is a no-op, simulate returns the stored outcome
        assert_eq!(s.expand(winning).unwrap(), winning);
        assert_eq!(s.simulate(winning).unwrap(), Outcome::Win(Player::Red));
    }

    #[test]
    fn test_simulate_does_not_grow_tree() {
        let mut s = search(Board::new(), Player::Red);
        let child = s.expand(s.tree().root()).unwrap();
        let size = s.tree().len();
        for _ in 0..20 {
            s.simulate(child).unwrap();
        }
        assert_eq!(s.tree().len(), size);
    }

    #[test]
    fn test_run_cycles_counts_visits() {
        let mut s = search(Board::new(), Player::Red);
        let stats = s.run_cycles(200).unwrap();

        assert_eq!(stats.cycles, 200);
        assert_eq!(stats.root_visits, 200);
        // One node per cycle at most; fewer once cycles end on terminal nodes
        assert!(stats.tree_size > 1 && stats.tree_size <= 201);
        assert!(s.best_action().is_some());
    }

    #[test]
    fn test_zero_budget_runs_nothing() {
        let mut s = search(Board::new(), Player::Red);
        let stats = s.run(Duration::ZERO).unwrap();
        assert_eq!(stats.cycles, 0);
        assert_eq!(s.best_action(), None);
    }

    #[test]
    fn test_store_records_same_reward_on_every_edge() {
        let mut s: MctsSearch = search(Board::new(), Player::Red).with_store(StatsTable::new());
        let root = s.tree().root();
        let child = s.expand(root).unwrap(); // Red plays 0
        let grandchild = s.expand(child).unwrap(); // Yellow plays 0

        s.backpropagate(grandchild, Outcome::Win(Player::Red));

        let store = s.store().unwrap();
        assert_eq!(store.len(), 2);
        let red_edge = store.get(&Board::new(), 0).unwrap();
        assert_eq!(red_edge.visits, 1);
        assert!((red_edge.mean_reward - 1.0).abs() < 1e-12);
        let yellow_edge = store.get(&play(&[0]), 0).unwrap();
        assert_eq!(yellow_edge.visits, 1);
        assert!((yellow_edge.mean_reward - 1.0).abs() < 1e-12);

        // Store means track the node values along the path
        let child_q = s.tree().get(child).q;
        assert!((red_edge.mean_reward - child_q).abs() < 1e-12);
        let grandchild_q = s.tree().get(grandchild).q;
        assert!((yellow_edge.mean_reward - grandchild_q).abs() < 1e-12);
    }

    #[test]
    fn test_store_survives_reset() {
        let mut s: MctsSearch = search(Board::new(), Player::Red).with_store(StatsTable::new());
        s.run_cycles(50).unwrap();
        let entries = s.store().unwrap().len();
        assert!(entries > 0);

        s.reset(&play(&[3]), Player::Yellow);
        assert_eq!(s.tree().len(), 1);
        assert_eq!(s.store().unwrap().len(), entries);
        assert!(s.take_store().is_some());
        assert!(s.store().is_none());
    }

    #[test]
    fn test_transplant_resets_when_player_changes() {
        let mut s = search(Board::new(), Player::Red);
        s.run_cycles(30).unwrap();
        let board = play(&[3]);

        assert!(!s.transplant(&board, Player::Yellow));
        assert_eq!(s.searching_player(), Player::Yellow);
        assert_eq!(s.tree().len(), 1);
    }

    #[test]
    fn test_random_rollout_search_runs() {
        let config = MctsConfig::for_testing()
            .with_rollout(RolloutPolicy::UniformRandom)
            .with_expansion(ExpansionOrder::Random);
        let mut s: MctsSearch = MctsSearch::new(config, play(&[3, 3]), Player::Red);
        let stats = s.run_cycles(100).unwrap();
        assert_eq!(stats.root_visits, 100);
    }

    #[test]
    fn test_seeded_searches_are_reproducible() {
        let config = MctsConfig::for_testing().with_expansion(ExpansionOrder::Random);
        let mut a: MctsSearch = MctsSearch::new(config.clone(), play(&[3]), Player::Yellow);
        let mut b: MctsSearch = MctsSearch::new(config, play(&[3]), Player::Yellow);
        a.run_cycles(300).unwrap();
        b.run_cycles(300).unwrap();
        assert_eq!(a.tree().root_visits(), b.tree().root_visits());
    }
}
