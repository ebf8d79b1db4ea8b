//! Monte Carlo Tree Search (MCTS) move selection for Connect 4.
//!
//! # Overview
//!
//! MCTS builds a search tree by repeating a four-phase cycle until the time
//! budget runs out:
//!
//! 1. **Selection**: Descend from the root using UCB1 (Upper Confidence Bound)
//!    to balance exploration and exploitation
//! 2. **Expansion**: Add one child for an action not yet tried
//! 3. **Simulation**: Play the new position out to the end of the game with a
//!    rollout policy (win now, block, center, random)
//! 4. **Backpropagation**: Update visit counts and rewards along the path from
//!    the new node to the root
//!
//! # Usage
//!
//! ```rust
//! use games_connect4::{Board, Player};
//! use mcts::{MctsConfig, MoveSelector};
//! use std::time::Duration;
//!
//! let mut board = Board::new();
//! board.apply_move(3, Player::Red).unwrap();
//!
//! let config = MctsConfig::for_testing().with_time_budget(Duration::from_millis(20));
//! let mut selector: MoveSelector = MoveSelector::new(config);
//! let decision = selector.act(&board).unwrap();
//! assert!(board.is_legal(decision.column));
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `exploration`: UCB1 exploration constant (default: sqrt(2))
//! - `time_budget`: Wall-clock time per move (default: 1s)
//! - `expansion`: Random or ascending choice of the next untried action
//! - `rollout`: Heuristic or uniform random playouts
//!
//! # Architecture
//!
//! ```text
//! MoveSelector ── shortcuts (win / block / opening)
//!      │
//!      ▼
//! MctsSearch ──── select → expand → simulate → backpropagate
//!      │                                           │
//!      ▼                                           ▼
//! MctsTree (arena, root transplant)      StatsStore (optional)
//! ```

pub mod config;
pub mod node;
pub mod rollout;
pub mod search;
pub mod selector;
pub mod stats;
pub mod tree;

// Re-export main types
pub use config::{ExpansionOrder, MctsConfig, ParseOptionError, DEFAULT_EXPLORATION};
pub use node::{MctsNode, NodeId};
pub use rollout::{playout, RolloutPolicy};
pub use search::{MctsSearch, SearchError, SearchStats};
pub use selector::{Decision, DecisionReason, MoveSelector};
pub use stats::{EdgeStats, StatsStore, StatsTable};
pub use tree::{MctsTree, TreeStats};
