//! MCTS tree node representation.
//!
//! Each node holds the board reached by taking an action from its parent, the
//! player to move there, the actions not yet expanded and the visit statistics
//! used for UCB1 selection.

use games_connect4::{Board, Outcome, Player};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Parent node index (NONE for root). Only used for backpropagation.
    pub parent: NodeId,

    /// Column played from the parent to reach this node (0 for the root)
    pub action: u8,

    /// Board snapshot at this node
    pub board: Board,

    /// Player to move at this node
    pub player: Player,

    /// Legal columns not yet expanded, ascending.
    /// Empty for terminal nodes.
    pub untried: Vec<u8>,

    /// Children: Vec of (action, NodeId) pairs, kept in ascending action order.
    pub children: Vec<(u8, NodeId)>,

    /// Number of backpropagation passes through this node
    pub visit_count: u32,

    /// Cumulative reward W, relative to the searching player
    pub value_sum: f64,

    /// Mean reward Q = W / N, refreshed on every visit
    pub q: f64,

    /// Set when the move into this node ended the game
    pub terminal: Option<Outcome>,
}

impl MctsNode {
    /// Create a new root node.
    ///
    /// A root on a finished board is terminal and has nothing to expand.
    pub fn new_root(board: Board, player: Player) -> Self {
        Self::new_child(NodeId::NONE, 0, board, player, board.outcome())
    }

    /// Create a new child node.
    pub fn new_child(
        parent: NodeId,
        action: u8,
        board: Board,
        player: Player,
        terminal: Option<Outcome>,
    ) -> Self {
        let untried = if terminal.is_some() {
            Vec::new()
        } else {
            board.legal_actions()
        };

        Self {
            parent,
            action,
            board,
            player,
            untried,
            children: Vec::new(),
            visit_count: 0,
            value_sum: 0.0,
            q: 0.0,
            terminal,
        }
    }

    /// Record one backpropagation pass carrying `reward`.
    #[inline]
    pub fn record(&mut self, reward: f64) {
        self.visit_count += 1;
        self.value_sum += reward;
        self.q = self.value_sum / self.visit_count as f64;
    }

    /// Mean reward Q. Returns 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f64 {
        self.q
    }

    /// UCB1 score: `Q + c * sqrt(ln(parent N) / N)`.
    ///
    /// Takes the pre-computed `ln(max(1, parent N))`. Must not be called on an
    /// unvisited node; selection returns those before scoring.
    #[inline]
    pub fn ucb_score(&self, parent_ln_visits: f64, exploration: f64) -> f64 {
        debug_assert!(self.visit_count > 0, "UCB1 on an unvisited node");
        self.q + exploration * (parent_ln_visits / self.visit_count as f64).sqrt()
    }

    /// Check if this node ended the game.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    /// Selection stops here: something left to expand, or nothing to descend into.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        !self.untried.is_empty() || self.children.is_empty()
    }

    /// Child reached by `action`, if expanded.
    pub fn child(&self, action: u8) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, id)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_none() {
        assert!(NodeId::NONE.is_none());
        assert!(!NodeId::NONE.is_some());
        assert!(!NodeId(0).is_none());
        assert!(NodeId(0).is_some());
    }

    #[test]
    fn test_new_root() {
        let node = MctsNode::new_root(Board::new(), Player::Red);

        assert!(node.parent.is_none());
        assert_eq!(node.visit_count, 0);
        assert_eq!(node.untried, vec![0, 1, 2, 3, 4, 5, 6]);
        assert!(!node.is_terminal());
        assert!(node.children.is_empty());
        assert!(node.is_leaf());
    }

    #[test]
    fn test_terminal_child_has_nothing_to_expand() {
        let node = MctsNode::new_child(
            NodeId(0),
            3,
            Board::new(),
            Player::Yellow,
            Some(Outcome::Win(Player::Red)),
        );

        assert!(node.is_terminal());
        assert!(node.untried.is_empty());
        assert!(node.is_leaf());
    }

    #[test]
    fn test_record_keeps_q_in_sync() {
        let mut node = MctsNode::new_root(Board::new(), Player::Red);

        // Unvisited
        assert!(node.mean_value().abs() < 1e-12);

        for reward in [1.0, -1.0, 1.0, 0.0] {
            node.record(reward);
        }
        assert_eq!(node.visit_count, 4);
        assert!((node.value_sum - 1.0).abs() < 1e-12);
        assert!((node.mean_value() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_ucb_score() {
        let mut node = MctsNode::new_root(Board::new(), Player::Red);
        node.visit_count = 10;
        node.value_sum = 5.0;
        node.q = 0.5;

        // UCB = 0.5 + 1.0 * sqrt(ln(100) / 10) = 0.5 + 0.6786...
        let ucb = node.ucb_score((100f64).ln(), 1.0);
        assert!((ucb - 1.1786).abs() < 1e-3);

        // Exploration term vanishes when the parent has a single visit.
        let ucb = node.ucb_score((1f64).ln(), 1.0);
        assert!((ucb - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_is_leaf() {
        let mut node = MctsNode::new_root(Board::new(), Player::Red);

        // Untried actions remain
        node.children.push((0, NodeId(1)));
        assert!(node.is_leaf());

        // Fully expanded with children
        node.untried.clear();
        assert!(!node.is_leaf());
        assert_eq!(node.child(0), Some(NodeId(1)));
        assert_eq!(node.child(1), None);
    }
}
