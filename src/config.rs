//! Engine configuration
//!
//! Loaded from TOML, e.g.
//!
//! ```toml
//! depth = 4
//! strategy = "search"
//! seed = 7
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChessError, Result};

/// Default search depth in plies
pub const DEFAULT_DEPTH: u32 = 3;

/// Upper bound on configurable depth
pub const MAX_SEARCH_DEPTH: u32 = 32;

/// How the automated opponent picks its move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Negamax alpha-beta search to the configured depth
    #[default]
    Search,
    /// Uniformly random legal move
    Random,
}

impl std::str::FromStr for Strategy {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "search" => Ok(Strategy::Search),
            "random" => Ok(Strategy::Random),
            other => Err(ChessError::Config(format!("unknown strategy '{}'", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Search depth in plies
    pub depth: u32,
    pub strategy: Strategy,
    /// Seed for the move shuffle; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Alpha-beta cutoffs. Disabling gives plain minimax with the same result.
    pub pruning: bool,
    /// Compare the position against a snapshot after every unmake
    pub verify_unmake: bool,
    /// Optional wall-clock budget for one move
    pub move_time_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            depth: DEFAULT_DEPTH,
            strategy: Strategy::Search,
            seed: None,
            pruning: true,
            verify_unmake: cfg!(debug_assertions),
            move_time_ms: None,
        }
    }
}

impl EngineConfig {
    /// Search-based config at the given depth
    pub fn with_depth(depth: u32) -> Self {
        EngineConfig {
            depth,
            ..EngineConfig::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 || self.depth > MAX_SEARCH_DEPTH {
            return Err(ChessError::Config(format!(
                "depth must be between 1 and {}, got {}",
                MAX_SEARCH_DEPTH, self.depth
            )));
        }
        if self.move_time_ms == Some(0) {
            return Err(ChessError::Config("move_time_ms must be positive".to_string()));
        }
        Ok(())
    }
}
