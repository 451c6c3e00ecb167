use serde::Deserialize;
use web_time::Duration;

use crate::ai::Score;
use crate::ai::heuristic::{DEFAULT_BASE, MAX_BASE};
use crate::board::NUM_CELLS;
use crate::error::ConfigError;

const DEFAULT_MAX_DEPTH: u8 = 8;
const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Search and evaluation settings. Every field is optional when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deepest iteration of the iterative-deepening search, in plies.
    pub max_depth: u8,
    /// Wall-clock budget for one `get_best_move` call.
    pub timeout_ms: u64,
    pub heuristic_base: Score,
    pub alpha_beta: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            heuristic_base: DEFAULT_BASE,
            alpha_beta: true,
        }
    }
}

impl EngineConfig {
    /// Difficulty presets. Level 1 looks one ply ahead, level 6 ten plies.
    pub fn for_level(level: u8) -> Result<Self, ConfigError> {
        let max_depth = match level {
            1 => 1,
            2 => 2,
            3 => 4,
            4 => 6,
            5 => 8,
            6 => 10,
            _ => return Err(ConfigError::Level(level)),
        };
        Ok(Self {
            max_depth,
            ..Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 || self.max_depth as usize > NUM_CELLS {
            return Err(ConfigError::Depth {
                value: self.max_depth,
                max: NUM_CELLS as u8,
            });
        }
        if !(2..=MAX_BASE).contains(&self.heuristic_base) {
            return Err(ConfigError::HeuristicBase {
                value: self.heuristic_base,
                max: MAX_BASE,
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
