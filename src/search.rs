//! DuelChess - Search Engine Module
//!
//! Fixed-depth negamax with alpha-beta pruning. Every node returns a score
//! from the point of view of the side to move there; the parent negates it
//! and hands the child the negated, swapped window (see [`Window::flip`]).
//!
//! Root moves are shuffled before the search so that equally scored moves
//! are picked unpredictably. The shuffle RNG can be seeded for reproducible
//! play.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::{EngineConfig, Strategy};
use crate::error::{ChessError, Result};
use crate::evaluation::{score_position, INFINITY};
use crate::move_generator::MoveGenerator;
use crate::position::{Move, Position};

/// How often (in nodes) the deadline is compared against the clock
const TIME_CHECK_INTERVAL: u64 = 1024;

/// Outcome of one move decision
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// Chosen move, or None when the position has no legal moves
    pub best_move: Option<Move>,
    /// Score backing the choice, from the mover's perspective
    pub score: i32,
    pub depth: u32,
    pub nodes: u64,
    /// True if a stop request or deadline cut the search short
    pub stopped: bool,
}

/// Alpha-beta bounds, from the perspective of the side to move at a node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub alpha: i32,
    pub beta: i32,
}

impl Window {
    pub fn full() -> Self {
        Window {
            alpha: -INFINITY,
            beta: INFINITY,
        }
    }

    /// The same bounds seen from the opponent's side: negated and swapped
    #[inline]
    pub fn flip(self) -> Window {
        Window {
            alpha: -self.beta,
            beta: -self.alpha,
        }
    }

    /// Raise alpha to `score` if it improves on it
    #[inline]
    pub fn raise(&mut self, score: i32) {
        if score > self.alpha {
            self.alpha = score;
        }
    }

    /// No remaining sibling can change the parent's decision
    #[inline]
    pub fn is_closed(self) -> bool {
        self.alpha >= self.beta
    }
}

/// Best score and move found at one node
#[derive(Clone, Copy, Debug)]
struct NodeScore {
    score: i32,
    best_move: Option<Move>,
}

pub struct SearchEngine {
    config: EngineConfig,
    move_generator: MoveGenerator,
    rng: StdRng,
    nodes_searched: u64,
    stop_search: Arc<AtomicBool>,
    deadline: Option<Instant>,
    /// Set once the first root move has been fully evaluated
    can_stop: bool,
    stopped: bool,
}

impl SearchEngine {
    pub fn new(config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        SearchEngine {
            config,
            move_generator: MoveGenerator::new(),
            rng,
            nodes_searched: 0,
            stop_search: Arc::new(AtomicBool::new(false)),
            deadline: None,
            can_stop: false,
            stopped: false,
        }
    }

    /// Validated construction
    pub fn try_new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(SearchEngine::new(config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration. A new seed reseeds the shuffle RNG.
    pub fn set_config(&mut self, config: EngineConfig) -> Result<()> {
        config.validate()?;
        if config.seed != self.config.seed {
            if let Some(seed) = config.seed {
                self.reseed(seed);
            }
        }
        self.config = config;
        Ok(())
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Flag that aborts a running search once it is set
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_search)
    }

    pub fn stop(&self) {
        self.stop_search.store(true, Ordering::SeqCst);
    }

    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    /// Pick a move for the side to move. `legal_moves` must be the legal moves
    /// of `position`; the position itself is never modified.
    pub fn choose_move(&mut self, position: &Position, legal_moves: &[Move]) -> Result<SearchResult> {
        let start = Instant::now();
        self.nodes_searched = 0;
        self.can_stop = false;
        self.stopped = false;
        self.deadline = self
            .config
            .move_time_ms
            .map(|ms| start + Duration::from_millis(ms));

        let depth = self.config.depth;
        let turn_factor = position.side_to_move().sign();

        let result = if legal_moves.is_empty() {
            let status = self.move_generator.game_status(position, legal_moves);
            SearchResult {
                best_move: None,
                score: turn_factor * score_position(position, status, depth),
                depth,
                nodes: 0,
                stopped: false,
            }
        } else {
            match self.config.strategy {
                Strategy::Random => SearchResult {
                    best_move: self.find_random_move(legal_moves),
                    score: 0,
                    depth: 0,
                    nodes: 0,
                    stopped: false,
                },
                Strategy::Search => self.search_root(position, legal_moves, depth, turn_factor)?,
            }
        };

        self.stop_search.store(false, Ordering::SeqCst);

        if result.stopped {
            warn!(
                "search stopped early after {} nodes, best {:?}",
                result.nodes,
                result.best_move.map(|m| m.to_uci())
            );
        }
        debug!(
            "depth {} score {} nodes {} time {:?} best {}",
            result.depth,
            result.score,
            result.nodes,
            start.elapsed(),
            result.best_move.map_or_else(|| "(none)".to_string(), |m| m.to_uci())
        );
        Ok(result)
    }

    /// Uniformly random choice among the given moves
    pub fn find_random_move(&mut self, legal_moves: &[Move]) -> Option<Move> {
        legal_moves.choose(&mut self.rng).copied()
    }

    fn search_root(
        &mut self,
        position: &Position,
        legal_moves: &[Move],
        depth: u32,
        turn_factor: i32,
    ) -> Result<SearchResult> {
        let mut moves = legal_moves.to_vec();
        moves.shuffle(&mut self.rng);

        let mut scratch = position.clone();
        let node = self.evaluate_moves(&mut scratch, &moves, depth, Window::full(), turn_factor, true)?;

        if scratch != *position {
            return Err(ChessError::InvariantViolation(format!(
                "search left {} instead of {}",
                scratch.to_fen(),
                position.to_fen()
            )));
        }

        Ok(SearchResult {
            best_move: node.best_move,
            score: node.score,
            depth,
            nodes: self.nodes_searched,
            stopped: self.stopped,
        })
    }

    /// Negamax over `moves` (the legal moves of `position`). Returns the best
    /// score for the side to move; when the window closes early the score is a
    /// bound, which the parent never prefers over its exact best.
    fn evaluate_moves(
        &mut self,
        position: &mut Position,
        moves: &[Move],
        depth: u32,
        window: Window,
        turn_factor: i32,
        is_root: bool,
    ) -> Result<NodeScore> {
        debug_assert_eq!(turn_factor, position.side_to_move().sign());
        self.nodes_searched += 1;

        if depth == 0 || moves.is_empty() {
            let status = self.move_generator.game_status(position, moves);
            return Ok(NodeScore {
                score: turn_factor * score_position(position, status, depth),
                best_move: None,
            });
        }

        let mut window = window;
        let beta = window.beta;
        let mut best = NodeScore {
            score: -INFINITY,
            best_move: None,
        };

        for mv in moves {
            if self.should_stop() {
                break;
            }

            let snapshot = self.config.verify_unmake.then(|| position.clone());
            let undo = position.make_move(mv);
            let replies = self.move_generator.legal_moves(position);
            let child = self.evaluate_moves(position, &replies, depth - 1, window.flip(), -turn_factor, false)?;
            position.unmake_move(mv, &undo);

            if let Some(snapshot) = snapshot {
                if *position != snapshot {
                    return Err(ChessError::InvariantViolation(format!(
                        "unmake of {} left {} instead of {}",
                        mv,
                        position.to_fen(),
                        snapshot.to_fen()
                    )));
                }
            }

            // An interrupted child's score is not trustworthy
            if self.stopped {
                break;
            }

            let score = -child.score;
            if is_root {
                trace!("root move {} score {}", mv, score);
                self.can_stop = true;
            }

            if score > best.score {
                best = NodeScore {
                    score,
                    best_move: Some(*mv),
                };
            }

            if self.config.pruning {
                window.raise(best.score);
                if window.is_closed() {
                    debug_assert!(best.score >= beta);
                    break;
                }
            }
        }

        Ok(best)
    }

    fn should_stop(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        if !self.can_stop {
            return false;
        }
        if self.stop_search.load(Ordering::Relaxed) {
            self.stopped = true;
        } else if let Some(deadline) = self.deadline {
            if self.nodes_searched % TIME_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                self.stopped = true;
            }
        }
        self.stopped
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        SearchEngine::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(depth: u32, seed: u64) -> SearchEngine {
        SearchEngine::new(EngineConfig {
            depth,
            seed: Some(seed),
            ..EngineConfig::default()
        })
    }

    #[test]
    fn window_flip_negates_and_swaps() {
        let w = Window { alpha: -30, beta: 120 };
        assert_eq!(w.flip(), Window { alpha: -120, beta: 30 });
        assert_eq!(w.flip().flip(), w);
        assert_eq!(Window::full().flip(), Window::full());
    }

    #[test]
    fn window_closes_when_alpha_reaches_beta() {
        let mut w = Window { alpha: 0, beta: 50 };
        w.raise(-10);
        assert_eq!(w.alpha, 0);
        w.raise(50);
        assert!(w.is_closed());
    }

    #[test]
    fn no_legal_moves_returns_no_move() {
        let pos = Position::from_fen("k7/8/1Q6/8/8/8/8/1K6 b - - 0 1").unwrap();
        let result = seeded(3, 1).choose_move(&pos, &[]).unwrap();
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn random_strategy_returns_a_legal_move() {
        let pos = Position::startpos();
        let moves = MoveGenerator::new().legal_moves(&pos);
        let mut engine = SearchEngine::new(EngineConfig {
            strategy: Strategy::Random,
            seed: Some(9),
            ..EngineConfig::default()
        });
        for _ in 0..10 {
            let result = engine.choose_move(&pos, &moves).unwrap();
            assert!(moves.contains(&result.best_move.unwrap()));
            assert_eq!(result.nodes, 0);
        }
    }

    #[test]
    fn same_seed_same_choice() {
        let pos = Position::startpos();
        let moves = MoveGenerator::new().legal_moves(&pos);
        let a = seeded(2, 1234).choose_move(&pos, &moves).unwrap();
        let b = seeded(2, 1234).choose_move(&pos, &moves).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn search_does_not_mutate_input() {
        let pos = Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
        let before = pos.clone();
        let moves = MoveGenerator::new().legal_moves(&pos);
        seeded(2, 5).choose_move(&pos, &moves).unwrap();
        assert_eq!(pos, before);
    }

    #[test]
    fn stop_before_search_still_evaluates_first_root_move() {
        let pos = Position::startpos();
        let moves = MoveGenerator::new().legal_moves(&pos);
        let mut engine = seeded(3, 3);
        engine.stop();
        let result = engine.choose_move(&pos, &moves).unwrap();
        assert!(result.stopped);
        assert!(moves.contains(&result.best_move.unwrap()));
        // the flag is cleared for the next call
        assert!(!engine.stop_handle().load(Ordering::SeqCst));
    }

    #[test]
    fn try_new_rejects_zero_depth() {
        assert!(SearchEngine::try_new(EngineConfig::with_depth(0)).is_err());
        assert!(SearchEngine::try_new(EngineConfig::with_depth(1)).is_ok());
    }
}
