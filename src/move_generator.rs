//! DuelChess - Move Generator Module
//!
//! Legal move generation, including castling, en passant and promotion.
//! Pseudo-legal moves are generated per piece and then filtered by playing
//! each one and testing whether the mover's king is left attacked.

use crate::bitboard::{self, KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS};
use crate::position::{Move, Position};
use crate::types::*;

/// Direction (file delta, rank delta) pairs for sliding pieces
const ROOK_DIRECTIONS: [(i32, i32); 4] = [(0, 1), (0, -1), (-1, 0), (1, 0)];
const BISHOP_DIRECTIONS: [(i32, i32); 4] = [(-1, 1), (1, 1), (1, -1), (-1, -1)];
const QUEEN_DIRECTIONS: [(i32, i32); 8] = [
    (0, 1), (0, -1), (-1, 0), (1, 0),
    (-1, 1), (1, 1), (1, -1), (-1, -1),
];

/// Outcome of a position given its legal moves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    /// The contained colour has been checkmated
    Checkmate(Color),
    Stalemate,
}

impl GameStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != GameStatus::Ongoing
    }
}

/// One step from `sq` by (df, dr), or None if it leaves the board
#[inline]
fn step(sq: usize, df: i32, dr: i32) -> Option<usize> {
    let file = bitboard::file_of(sq) as i32 + df;
    let rank = bitboard::rank_of(sq) as i32 + dr;
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some((rank * 8 + file) as usize)
    } else {
        None
    }
}

/// Check if a square is attacked by any piece of the given color
pub fn is_square_attacked(position: &Position, sq: usize, by: Color) -> bool {
    let squares = position.squares();

    // A `by` pawn attacks sq from the squares an opposite pawn on sq would attack
    let pawn = make_piece(by, PAWN);
    if bitboard::squares(PAWN_ATTACKS[by.opposite().index()][sq]).any(|s| squares[s] == pawn) {
        return true;
    }

    let knight = make_piece(by, KNIGHT);
    if bitboard::squares(KNIGHT_ATTACKS[sq]).any(|s| squares[s] == knight) {
        return true;
    }

    let king = make_piece(by, KING);
    if bitboard::squares(KING_ATTACKS[sq]).any(|s| squares[s] == king) {
        return true;
    }

    let queen = make_piece(by, QUEEN);
    let rook = make_piece(by, ROOK);
    if ROOK_DIRECTIONS
        .iter()
        .any(|&(df, dr)| matches!(first_piece_along(squares, sq, df, dr), Some(p) if p == rook || p == queen))
    {
        return true;
    }

    let bishop = make_piece(by, BISHOP);
    BISHOP_DIRECTIONS
        .iter()
        .any(|&(df, dr)| matches!(first_piece_along(squares, sq, df, dr), Some(p) if p == bishop || p == queen))
}

/// First non-empty square content along a ray
fn first_piece_along(squares: &[u8; 64], sq: usize, df: i32, dr: i32) -> Option<u8> {
    let mut current = sq;
    while let Some(next) = step(current, df, dr) {
        if squares[next] != EMPTY {
            return Some(squares[next]);
        }
        current = next;
    }
    None
}

/// Move generator for chess positions
#[derive(Clone, Copy, Debug, Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        MoveGenerator
    }

    /// Generate all legal moves for the current position, in piece-scan order
    pub fn legal_moves(&self, position: &Position) -> Vec<Move> {
        let pseudo_legal = self.pseudo_legal_moves(position);
        let mut scratch = position.clone();
        let mover = position.side_to_move();

        pseudo_legal
            .into_iter()
            .filter(|mv| {
                let undo = scratch.make_move(mv);
                let in_check = scratch.is_king_in_check(mover);
                scratch.unmake_move(mv, &undo);
                !in_check
            })
            .collect()
    }

    /// Generate all pseudo-legal moves (may leave king in check)
    pub fn pseudo_legal_moves(&self, position: &Position) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        let us = position.side_to_move();

        for sq in 0..64 {
            let piece = position.piece_at(sq);
            if piece == EMPTY || get_piece_color(piece) != us.bits() {
                continue;
            }

            match get_piece_type(piece) {
                PAWN => self.generate_pawn_moves(position, sq, us, &mut moves),
                KNIGHT => self.generate_leaper_moves(position, sq, us, KNIGHT_ATTACKS[sq], &mut moves),
                BISHOP => self.generate_sliding_moves(position, sq, us, &BISHOP_DIRECTIONS, &mut moves),
                ROOK => self.generate_sliding_moves(position, sq, us, &ROOK_DIRECTIONS, &mut moves),
                QUEEN => self.generate_sliding_moves(position, sq, us, &QUEEN_DIRECTIONS, &mut moves),
                KING => {
                    self.generate_leaper_moves(position, sq, us, KING_ATTACKS[sq], &mut moves);
                    self.generate_castling_moves(position, sq, us, &mut moves);
                }
                _ => {}
            }
        }

        moves
    }

    fn push_pawn_move(from_sq: usize, to_sq: usize, flags: u8, promo_rank: usize, moves: &mut Vec<Move>) {
        if to_sq / 8 == promo_rank {
            for promo in PROMOTION_KINDS {
                moves.push(Move::with_promotion(from_sq, to_sq, promo, flags));
            }
        } else {
            moves.push(Move::new(from_sq, to_sq, flags));
        }
    }

    fn generate_pawn_moves(&self, position: &Position, sq: usize, us: Color, moves: &mut Vec<Move>) {
        let (forward, start_rank, promo_rank) = match us {
            Color::White => (1, 1, 7),
            Color::Black => (-1, 6, 0),
        };

        // Pushes
        if let Some(to_sq) = step(sq, 0, forward) {
            if position.piece_at(to_sq) == EMPTY {
                Self::push_pawn_move(sq, to_sq, 0, promo_rank, moves);

                if sq / 8 == start_rank {
                    if let Some(to_sq2) = step(to_sq, 0, forward) {
                        if position.piece_at(to_sq2) == EMPTY {
                            moves.push(Move::new(sq, to_sq2, FLAG_DOUBLE_PUSH));
                        }
                    }
                }
            }
        }

        // Captures
        for to_sq in bitboard::squares(PAWN_ATTACKS[us.index()][sq]) {
            let target = position.piece_at(to_sq);
            if target != EMPTY && get_piece_color(target) != us.bits() {
                Self::push_pawn_move(sq, to_sq, FLAG_CAPTURE, promo_rank, moves);
            } else if target == EMPTY && position.en_passant_square() == Some(to_sq) {
                moves.push(Move::en_passant(sq, to_sq));
            }
        }
    }

    /// Knight and king single steps from a precomputed attack set
    fn generate_leaper_moves(&self, position: &Position, sq: usize, us: Color, targets: u64, moves: &mut Vec<Move>) {
        for to_sq in bitboard::squares(targets) {
            let target = position.piece_at(to_sq);
            if target == EMPTY {
                moves.push(Move::new(sq, to_sq, 0));
            } else if get_piece_color(target) != us.bits() {
                moves.push(Move::new(sq, to_sq, FLAG_CAPTURE));
            }
        }
    }

    /// Generate moves for sliding pieces (bishop, rook, queen)
    fn generate_sliding_moves(
        &self,
        position: &Position,
        sq: usize,
        us: Color,
        directions: &[(i32, i32)],
        moves: &mut Vec<Move>,
    ) {
        for &(df, dr) in directions {
            let mut current = sq;
            while let Some(next) = step(current, df, dr) {
                let target = position.piece_at(next);
                if target == EMPTY {
                    moves.push(Move::new(sq, next, 0));
                } else {
                    if get_piece_color(target) != us.bits() {
                        moves.push(Move::new(sq, next, FLAG_CAPTURE));
                    }
                    break;
                }
                current = next;
            }
        }
    }

    /// Castling: rights held, king and rook on their home squares, the squares
    /// between them empty, and the king neither in, passing through, nor
    /// landing on an attacked square.
    fn generate_castling_moves(&self, position: &Position, sq: usize, us: Color, moves: &mut Vec<Move>) {
        let (home, kingside, queenside) = match us {
            Color::White => (4, CASTLE_WK, CASTLE_WQ),
            Color::Black => (60, CASTLE_BK, CASTLE_BQ),
        };
        if sq != home || position.castling_rights() & (kingside | queenside) == 0 {
            return;
        }
        let them = us.opposite();
        if is_square_attacked(position, sq, them) {
            return;
        }

        let rook = make_piece(us, ROOK);
        let empty = |squares: &[usize]| squares.iter().all(|&s| position.piece_at(s) == EMPTY);
        let safe = |squares: &[usize]| squares.iter().all(|&s| !is_square_attacked(position, s, them));

        if position.has_castling_right(kingside)
            && position.piece_at(home + 3) == rook
            && empty(&[home + 1, home + 2])
            && safe(&[home + 1, home + 2])
        {
            moves.push(Move::castling(sq, home + 2));
        }

        if position.has_castling_right(queenside)
            && position.piece_at(home - 4) == rook
            && empty(&[home - 1, home - 2, home - 3])
            && safe(&[home - 1, home - 2])
        {
            moves.push(Move::castling(sq, home - 2));
        }
    }

    /// Check if the side to move's king is in check
    pub fn is_in_check(&self, position: &Position) -> bool {
        position.is_king_in_check(position.side_to_move())
    }

    /// Classify a position from its legal moves
    pub fn game_status(&self, position: &Position, legal_moves: &[Move]) -> GameStatus {
        if !legal_moves.is_empty() {
            GameStatus::Ongoing
        } else if self.is_in_check(position) {
            GameStatus::Checkmate(position.side_to_move())
        } else {
            GameStatus::Stalemate
        }
    }

    /// Count leaf nodes of the legal move tree to the given depth
    pub fn perft(&self, position: &Position, depth: u32) -> u64 {
        let mut scratch = position.clone();
        self.perft_inner(&mut scratch, depth)
    }

    /// Per-root-move perft counts, for locating move generation bugs
    pub fn divide(&self, position: &Position, depth: u32) -> Vec<(Move, u64)> {
        let mut scratch = position.clone();
        self.legal_moves(position)
            .into_iter()
            .map(|mv| {
                let undo = scratch.make_move(&mv);
                let nodes = self.perft_inner(&mut scratch, depth.saturating_sub(1));
                scratch.unmake_move(&mv, &undo);
                (mv, nodes)
            })
            .collect()
    }

    fn perft_inner(&self, position: &mut Position, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }

        let moves = self.legal_moves(position);
        if depth == 1 {
            return moves.len() as u64;
        }

        let mut nodes = 0u64;
        for mv in moves {
            let undo = position.make_move(&mv);
            nodes += self.perft_inner(position, depth - 1);
            position.unmake_move(&mv, &undo);
        }
        nodes
    }
}
