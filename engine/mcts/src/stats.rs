//! Statistics Store: (position, action) -> (visits, mean reward).
//!
//! The store outlives any single search tree. The search only ever calls
//! [`StatsStore::update`]; how the table is shared or persisted is up to the
//! owner.

use std::collections::HashMap;

use games_connect4::Board;

/// Aggregated statistics for one (board, action) edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeStats {
    pub visits: u64,
    pub mean_reward: f64,
}

impl EdgeStats {
    /// One-pass running mean update.
    #[inline]
    pub fn record(&mut self, reward: f64) {
        self.visits += 1;
        self.mean_reward += (reward - self.mean_reward) / self.visits as f64;
    }
}

/// Injectable get/update interface over an edge statistics table.
pub trait StatsStore {
    /// Statistics for playing `action` from `board`, if any were recorded.
    fn get(&self, board: &Board, action: u8) -> Option<EdgeStats>;

    /// Fold one more `reward` into the (board, action) entry, creating it if needed.
    fn update(&mut self, board: &Board, action: u8, reward: f64);

    /// Number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory [`StatsStore`] backed by a HashMap.
#[derive(Debug, Clone, Default)]
pub struct StatsTable {
    entries: HashMap<(Board, u8), EdgeStats>,
}

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry wholesale (used when loading a persisted table).
    pub fn insert(&mut self, board: Board, action: u8, stats: EdgeStats) {
        self.entries.insert((board, action), stats);
    }

    /// Iterate over all entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&Board, u8, &EdgeStats)> {
        self.entries
            .iter()
            .map(|((board, action), stats)| (board, *action, stats))
    }
}

impl StatsStore for StatsTable {
    fn get(&self, board: &Board, action: u8) -> Option<EdgeStats> {
        self.entries.get(&(*board, action)).copied()
    }

    fn update(&mut self, board: &Board, action: u8, reward: f64) {
        self.entries
            .entry((*board, action))
            .or_default()
            .record(reward);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
