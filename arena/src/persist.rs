//! JSON persistence for the edge statistics table.
//!
//! The file is one object keyed by `"<board key>:<column>"`:
//!
//! ```json
//! { "...(42 chars)...:3": { "visits": 12, "mean_reward": 0.25 } }
//! ```
//!
//! Writes go to a temp file that is renamed over the target, so readers never
//! observe a half-written store.

use anyhow::{anyhow, Context, Result};
use games_connect4::Board;
use mcts::{EdgeStats, StatsStore, StatsTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One persisted edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub visits: u64,
    pub mean_reward: f64,
}

impl From<EdgeStats> for EdgeRecord {
    fn from(stats: EdgeStats) -> Self {
        Self {
            visits: stats.visits,
            mean_reward: stats.mean_reward,
        }
    }
}

impl From<EdgeRecord> for EdgeStats {
    fn from(record: EdgeRecord) -> Self {
        Self {
            visits: record.visits,
            mean_reward: record.mean_reward,
        }
    }
}

fn edge_key(board: &Board, column: u8) -> String {
    format!("{}:{}", board.to_key(), column)
}

fn parse_edge_key(key: &str) -> Result<(Board, u8)> {
    let (board_key, column) = key
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("store key {:?} has no column suffix", key))?;
    let board = Board::from_key(board_key)?;
    let column: u8 = column
        .parse()
        .with_context(|| format!("store key {:?} has a bad column", key))?;
    if usize::from(column) >= games_connect4::COLS {
        return Err(anyhow!("store key {:?} has column {} out of range", key, column));
    }
    Ok((board, column))
}

/// Load a table from `path`. A missing file is an empty table; anything
/// unreadable or malformed is an error.
pub fn load_table(path: &Path) -> Result<StatsTable> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No statistics store yet, starting empty");
            return Ok(StatsTable::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read store {}", path.display()))
        }
    };

    let records: BTreeMap<String, EdgeRecord> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse store {}", path.display()))?;

    let mut table = StatsTable::new();
    for (key, record) in records {
        let (board, column) = parse_edge_key(&key)?;
        table.insert(board, column, record.into());
    }

    debug!(path = %path.display(), entries = table.len(), "Loaded statistics store");
    Ok(table)
}

/// Write `table` to `path` atomically, creating parent directories as needed.
pub fn save_table(path: &Path, table: &StatsTable) -> Result<()> {
    let records: BTreeMap<String, EdgeRecord> = table
        .iter()
        .map(|(board, column, stats)| (edge_key(board, column), (*stats).into()))
        .collect();

    let json = serde_json::to_string(&records).context("failed to serialize store")?;
    write_atomic(path, json.as_bytes())?;

    debug!(path = %path.display(), entries = records.len(), "Wrote statistics store");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Write to a temp file then rename (atomic on most filesystems).
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let tmp = temp_path(path);
    {
        let mut file = fs::File::create(&tmp)
            .with_context(|| format!("failed to create {}", tmp.display()))?;
        file.write_all(bytes)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
    }

    if let Err(e) = fs::rename(&tmp, path) {
        warn!(path = %path.display(), error = %e, "Failed to rename temp file");
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("failed to replace {}", path.display()));
    }
    Ok(())
}
