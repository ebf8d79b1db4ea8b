//! MCTS-based policy
//!
//! Wraps the engine's [`MoveSelector`] so it can play in the arena. Every
//! `mount` starts a fresh search tree. When a store path is set, the
//! statistics table is loaded on the first `mount` and written back on
//! `finalize`.

use anyhow::Result;
use games_connect4::{Board, Player};
use mcts::{DecisionReason, MctsConfig, MoveSelector, StatsStore, StatsTable};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::persist;
use crate::policy::Policy;

/// Policy that searches with MCTS under a per-move time budget
pub struct MctsPolicy {
    name: String,
    selector: MoveSelector<StatsTable>,
    store_path: Option<PathBuf>,
    /// Moves decided by search rather than a shortcut
    searched_moves: u32,
}

impl std::fmt::Debug for MctsPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MctsPolicy")
            .field("name", &self.name)
            .field("store_path", &self.store_path)
            .field("tree_nodes", &self.selector().search().tree().len())
            .field("searched_moves", &self.searched_moves)
            .finish()
    }
}

impl MctsPolicy {
    pub fn new(config: MctsConfig) -> Self {
        Self {
            name: "mcts".to_string(),
            selector: MoveSelector::new(config),
            store_path: None,
            searched_moves: 0,
        }
    }

    /// Rename the policy (two MCTS players in one tournament need distinct names).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Persist the statistics store at `path` across runs.
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    pub fn selector(&self) -> &MoveSelector<StatsTable> {
        &self.selector
    }

    pub fn searched_moves(&self) -> u32 {
        self.searched_moves
    }
}

impl Policy for MctsPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn mount(&mut self) -> Result<()> {
        self.selector.search_mut().reset(&Board::new(), Player::Red);

        if self.selector.search().store().is_some() {
            return Ok(());
        }
        if let Some(path) = &self.store_path {
            let table = persist::load_table(path)?;
            info!(
                policy = %self.name,
                path = %path.display(),
                entries = table.len(),
                "Mounted statistics store"
            );
            self.selector.search_mut().set_store(Some(table));
        }
        Ok(())
    }

    fn act(&mut self, board: &Board) -> Result<u8> {
        let decision = self.selector.act(board)?;
        if let DecisionReason::Search { cycles, .. } = decision.reason {
            self.searched_moves += 1;
            debug!(policy = %self.name, column = decision.column, cycles, "Searched move");
        }
        Ok(decision.column)
    }

    fn finalize(&mut self) -> Result<()> {
        let (Some(path), Some(table)) = (&self.store_path, self.selector.search().store()) else {
            return Ok(());
        };
        persist::save_table(path, table)?;
        info!(
            policy = %self.name,
            path = %path.display(),
            entries = table.len(),
            "Flushed statistics store"
        );
        Ok(())
    }
}
