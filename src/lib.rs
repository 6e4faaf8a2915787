//! DuelChess - chess rules core and alpha-beta opponent
//!
//! - Full legal move generation (castling, en passant, promotion)
//! - Checked apply / exact undo of moves
//! - Material + piece-square evaluation
//! - Fixed-depth negamax search with alpha-beta pruning and shuffled tie-breaks
//! - Optional background search with cancellation
//! - Minimal UCI front-end

pub mod types;
pub mod bitboard;
pub mod error;
pub mod config;
pub mod position;
pub mod move_generator;
pub mod evaluation;
pub mod search;
pub mod worker;
pub mod game;
pub mod uci;

pub use config::{EngineConfig, Strategy};
pub use error::{ChessError, Result};
pub use game::Game;
pub use move_generator::{GameStatus, MoveGenerator};
pub use position::{Move, Position, UndoInfo};
pub use search::{SearchEngine, SearchResult};
pub use types::Color;
pub use worker::{spawn_search, SearchHandle};
