//! MCTS configuration parameters.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::rollout::RolloutPolicy;

/// Default UCB1 exploration constant.
pub const DEFAULT_EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Unknown value for a string-typed search option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {option} value {value:?}")]
pub struct ParseOptionError {
    pub option: &'static str,
    pub value: String,
}

/// Which untried action `expand` picks next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpansionOrder {
    /// Uniformly random among the untried actions.
    #[default]
    Random,
    /// Lowest untried column first.
    Ascending,
}

impl fmt::Display for ExpansionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpansionOrder::Random => write!(f, "random"),
            ExpansionOrder::Ascending => write!(f, "ascending"),
        }
    }
}

impl FromStr for ExpansionOrder {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(ExpansionOrder::Random),
            "ascending" => Ok(ExpansionOrder::Ascending),
            _ => Err(ParseOptionError {
                option: "expansion",
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Exploration constant c in the UCB1 formula.
    /// Higher values encourage exploration, lower values favor exploitation.
    pub exploration: f64,

    /// Wall-clock budget for one move search.
    pub time_budget: Duration,

    /// Order in which untried actions are expanded.
    pub expansion: ExpansionOrder,

    /// Playout policy used by the simulate phase.
    pub rollout: RolloutPolicy,

    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration: DEFAULT_EXPLORATION,
            time_budget: Duration::from_millis(1000),
            expansion: ExpansionOrder::Random,
            rollout: RolloutPolicy::Heuristic,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Config for real games.
    pub fn for_play() -> Self {
        Self::default()
    }

    /// Create a fast, reproducible config for testing.
    pub fn for_testing() -> Self {
        Self {
            exploration: DEFAULT_EXPLORATION,
            time_budget: Duration::from_millis(50),
            expansion: ExpansionOrder::Ascending,
            rollout: RolloutPolicy::Heuristic,
            seed: Some(42),
        }
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: set the per-move time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Builder pattern: set the expansion order.
    pub fn with_expansion(mut self, expansion: ExpansionOrder) -> Self {
        self.expansion = expansion;
        self
    }

    /// Builder pattern: set the rollout policy.
    pub fn with_rollout(mut self, rollout: RolloutPolicy) -> Self {
        self.rollout = rollout;
        self
    }

    /// Builder pattern: set (or clear) the RNG seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert!((config.exploration - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(config.time_budget, Duration::from_secs(1));
        assert_eq!(config.expansion, ExpansionOrder::Random);
        assert_eq!(config.rollout, RolloutPolicy::Heuristic);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_builder_pattern() {
        let config = MctsConfig::for_play()
            .with_exploration(1.0)
            .with_time_budget(Duration::from_millis(250))
            .with_expansion(ExpansionOrder::Ascending)
            .with_rollout(RolloutPolicy::UniformRandom)
            .with_seed(Some(7));

        assert!((config.exploration - 1.0).abs() < 1e-12);
        assert_eq!(config.time_budget, Duration::from_millis(250));
        assert_eq!(config.expansion, ExpansionOrder::Ascending);
        assert_eq!(config.rollout, RolloutPolicy::UniformRandom);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_testing_config_is_seeded() {
        let config = MctsConfig::for_testing();
        assert!(config.seed.is_some());
        assert!(config.time_budget < Duration::from_secs(1));
    }

    #[test]
    fn test_parse_expansion() {
        assert_eq!("random".parse::<ExpansionOrder>().unwrap(), ExpansionOrder::Random);
        assert_eq!("ASCENDING".parse::<ExpansionOrder>().unwrap(), ExpansionOrder::Ascending);

        let err = "sideways".parse::<ExpansionOrder>().unwrap_err();
        assert_eq!(err.option, "expansion");
        assert_eq!(err.to_string(), "unknown expansion value \"sideways\"");
    }
}
