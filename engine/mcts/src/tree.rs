//! MCTS tree structure with arena allocation.
//!
//! Nodes are stored in a contiguous Vec and referenced by NodeId indices. A
//! parent owns its children through the arena; the `parent` link is only an
//! index walked upward during backpropagation. Promoting a subtree to the root
//! compacts the arena so that discarded siblings are actually freed.

use std::collections::VecDeque;

use games_connect4::{Board, Outcome, Player};
use tracing::debug;

use crate::node::{MctsNode, NodeId};

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    /// Arena storing all nodes
    nodes: Vec<MctsNode>,

    /// Root node index (always 0 after construction, reset or transplant)
    root: NodeId,
}

impl MctsTree {
    /// Create a new tree rooted at `board` with `player` to move.
    pub fn new(board: Board, player: Player) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(board, player)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Discard every node and start over from a fresh root.
    pub fn reset(&mut self, board: Board, player: Player) {
        self.nodes.clear();
        self.nodes.push(MctsNode::new_root(board, player));
        self.root = NodeId(0);
    }

    /// Move the root to the node for (`board`, `player`), keeping its statistics.
    ///
    /// Matches the current root itself or one of its children; anything else
    /// falls back to [`MctsTree::reset`]. Returns true if a subtree was reused.
    pub fn transplant(&mut self, board: &Board, player: Player) -> bool {
        let root = self.get(self.root);
        if root.board == *board && root.player == player {
            debug!(nodes = self.len(), "Root already matches position");
            return true;
        }

        let matching = root
            .children
            .iter()
            .map(|(_, id)| *id)
            .find(|&id| {
                let child = self.get(id);
                child.board == *board && child.player == player
            });

        match matching {
            Some(id) => {
                self.promote(id);
                debug!(
                    nodes = self.len(),
                    visits = self.get(self.root).visit_count,
                    "Transplanted root onto existing subtree"
                );
                true
            }
            None => {
                self.reset(*board, player);
                debug!("No matching subtree, tree reset");
                false
            }
        }
    }

    /// Promote the root's child for `action` to be the new root.
    ///
    /// Returns false (and leaves the tree untouched) if that child does not exist.
    pub fn advance(&mut self, action: u8) -> bool {
        match self.get(self.root).child(action) {
            Some(id) => {
                self.promote(id);
                true
            }
            None => false,
        }
    }

    /// Rebuild the arena from the subtree under `new_root`.
    ///
    /// Breadth-first copy: ids are remapped, child order is preserved and the new
    /// root's parent link is cleared. Everything outside the subtree is dropped.
    fn promote(&mut self, new_root: NodeId) {
        let old = std::mem::take(&mut self.nodes);
        let mut queue = VecDeque::from([(new_root, NodeId::NONE)]);

        while let Some((old_id, parent)) = queue.pop_front() {
            let mut node = old[old_id.0 as usize].clone();
            let id = NodeId(self.nodes.len() as u32);

            node.parent = parent;
            if parent.is_some() {
                self.nodes[parent.0 as usize]
                    .children
                    .push((node.action, id));
            }

            let old_children = std::mem::take(&mut node.children);
            self.nodes.push(node);
            queue.extend(old_children.into_iter().map(|(_, child)| (child, id)));
        }

        self.root = NodeId(0);
    }

    /// Add a child to a parent node, consuming `action` from its untried set.
    /// Returns the new child's NodeId.
    pub fn add_child(
        &mut self,
        parent_id: NodeId,
        action: u8,
        board: Board,
        player: Player,
        terminal: Option<Outcome>,
    ) -> NodeId {
        let child_id = NodeId(self.nodes.len() as u32);
        self.nodes
            .push(MctsNode::new_child(parent_id, action, board, player, terminal));

        let parent = self.get_mut(parent_id);
        parent.untried.retain(|&a| a != action);
        let pos = parent
            .children
            .partition_point(|&(existing, _)| existing < action);
        parent.children.insert(pos, (action, child_id));

        child_id
    }

    /// Select the child of a node to descend into.
    ///
    /// Any unvisited child is returned first; otherwise the child with the
    /// highest UCB1 score. Ties go to the lowest column.
    pub fn select_child(&self, node_id: NodeId, exploration: f64) -> Option<NodeId> {
        let node = self.get(node_id);

        if let Some(&(_, id)) = node
            .children
            .iter()
            .find(|(_, id)| self.get(*id).visit_count == 0)
        {
            return Some(id);
        }

        // Pre-compute ln once instead of per child
        let parent_ln = (node.visit_count.max(1) as f64).ln();

        let mut best: Option<(NodeId, f64)> = None;
        for &(_, id) in &node.children {
            let score = self.get(id).ucb_score(parent_ln, exploration);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((id, score)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Record `reward` on every node from `leaf` up to the root inclusive.
    pub fn backpropagate(&mut self, leaf_id: NodeId, reward: f64) {
        let mut current_id = leaf_id;
        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.record(reward);
            current_id = node.parent;
        }
    }

    /// Get the best action from root based on visit counts.
    /// Returns (action, visit_count) or None if root has no children.
    /// Ties go to the lowest column.
    pub fn best_action(&self) -> Option<(u8, u32)> {
        let mut best: Option<(u8, u32)> = None;
        for &(action, id) in &self.get(self.root).children {
            let visits = self.get(id).visit_count;
            match best {
                Some((_, most)) if visits <= most => {}
                _ => best = Some((action, visits)),
            }
        }
        best
    }

    /// Visit counts of the root's children, ascending by column.
    pub fn root_visits(&self) -> Vec<(u8, u32)> {
        self.get(self.root)
            .children
            .iter()
            .map(|&(action, id)| (action, self.get(id).visit_count))
            .collect()
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visit_count,
            root_value: root.mean_value(),
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        let node = self.get(node_id);
        if node.children.is_empty() {
            return current_depth;
        }

        node.children
            .iter()
            .map(|(_, id)| self.compute_max_depth(*id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f64,
    pub max_depth: u32,
}
