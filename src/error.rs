//! Error types for DuelChess
//!
//! Illegal input is reported as an ordinary error. `InvariantViolation`
//! signals an internal bookkeeping bug (king count, make/unmake drift) and is
//! never recovered from inside a search.

use thiserror::Error;

/// Errors that can occur in the chess core
#[derive(Error, Debug)]
pub enum ChessError {
    /// A move that is not in the position's legal-move set
    #[error("Illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },

    /// Internal state corruption
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Malformed FEN string
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    /// Move text that is not coordinate notation
    #[error("Invalid move text '{0}'")]
    InvalidMoveText(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Background search thread ended without delivering a result
    #[error("Search worker disconnected before producing a result")]
    WorkerDisconnected,
}

/// Result type alias for chess core operations
pub type Result<T> = std::result::Result<T, ChessError>;

impl ChessError {
    pub(crate) fn fen(fen: &str, reason: impl Into<String>) -> Self {
        ChessError::InvalidFen {
            fen: fen.to_string(),
            reason: reason.into(),
        }
    }
}
