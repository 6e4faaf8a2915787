//! DuelChess - Position Representation Module
//!
//! The game state: square contents, side to move, castling rights, en passant
//! target and move clocks. Moves are applied in place and reverted with the
//! `UndoInfo` captured at application time.

use std::fmt;

use crate::error::{ChessError, Result};
use crate::move_generator::{is_square_attacked, MoveGenerator};
use crate::types::*;

/// Starting position FEN
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A chess move. Only meaningful relative to the position it was generated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from_sq: usize,
    pub to_sq: usize,
    /// Promotion piece kind, or `EMPTY`
    pub promotion: u8,
    /// Combination of the `FLAG_*` move-kind tags
    pub flags: u8,
}

impl Move {
    /// Create a move with the given move-kind tags
    pub fn new(from_sq: usize, to_sq: usize, flags: u8) -> Self {
        Move {
            from_sq,
            to_sq,
            promotion: EMPTY,
            flags,
        }
    }

    /// Create a promotion move
    pub fn with_promotion(from_sq: usize, to_sq: usize, promotion: u8, flags: u8) -> Self {
        Move {
            from_sq,
            to_sq,
            promotion,
            flags: flags | FLAG_PROMOTION,
        }
    }

    /// Create a castling move; the side is taken from the king's destination file
    pub fn castling(from_sq: usize, to_sq: usize) -> Self {
        let flag = if to_sq % 8 == 6 {
            FLAG_CASTLE_KINGSIDE
        } else {
            FLAG_CASTLE_QUEENSIDE
        };
        Move::new(from_sq, to_sq, flag)
    }

    /// Create an en passant move
    pub fn en_passant(from_sq: usize, to_sq: usize) -> Self {
        Move::new(from_sq, to_sq, FLAG_EN_PASSANT | FLAG_CAPTURE)
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.flags & FLAG_CAPTURE != 0
    }

    #[inline]
    pub fn is_castling(&self) -> bool {
        self.flags & (FLAG_CASTLE_KINGSIDE | FLAG_CASTLE_QUEENSIDE) != 0
    }

    #[inline]
    pub fn is_en_passant(&self) -> bool {
        self.flags & FLAG_EN_PASSANT != 0
    }

    #[inline]
    pub fn is_double_push(&self) -> bool {
        self.flags & FLAG_DOUBLE_PUSH != 0
    }

    #[inline]
    pub fn is_promotion(&self) -> bool {
        self.flags & FLAG_PROMOTION != 0
    }

    /// Convert move to coordinate notation (e.g., "e2e4", "e7e8q")
    pub fn to_uci(&self) -> String {
        let mut uci = format!("{}{}", square_name(self.from_sq), square_name(self.to_sq));
        if let Some(c) = promotion_char(self.promotion) {
            uci.push(c);
        }
        uci
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// State needed to revert a move exactly
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UndoInfo {
    pub captured_piece: u8,
    pub moved_piece: u8,
    pub castling_rights: u8,
    pub en_passant: Option<usize>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

/// Rook relocation for a castling king move: (rook from, rook to)
fn castling_rook_squares(king_to: usize) -> Option<(usize, usize)> {
    match king_to {
        6 => Some((7, 5)),    // White kingside (g1)
        2 => Some((0, 3)),    // White queenside (c1)
        62 => Some((63, 61)), // Black kingside (g8)
        58 => Some((56, 59)), // Black queenside (c8)
        _ => None,
    }
}

/// Chess position
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    /// 0=a1, 1=b1, ..., 63=h8
    squares: [u8; 64],
    side_to_move: Color,
    /// Bitmask of `CASTLE_*` rights
    castling_rights: u8,
    /// Square a pawn skipped over on the previous move
    en_passant: Option<usize>,
    /// Plies since the last pawn move or capture
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Position {
    /// The standard initial layout
    pub fn startpos() -> Self {
        let mut squares = [EMPTY; 64];
        let back_rank = [ROOK, KNIGHT, BISHOP, QUEEN, KING, BISHOP, KNIGHT, ROOK];
        for (file, &kind) in back_rank.iter().enumerate() {
            squares[file] = WHITE | kind;
            squares[8 + file] = WHITE_PAWN;
            squares[48 + file] = BLACK_PAWN;
            squares[56 + file] = BLACK | kind;
        }
        Position {
            squares,
            side_to_move: Color::White,
            castling_rights: CASTLE_ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Create a position from a FEN string. The clock fields are optional.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 || parts.len() > 6 {
            return Err(ChessError::fen(fen, "expected 4 to 6 fields"));
        }

        let mut squares = [EMPTY; 64];
        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::fen(fen, "expected 8 ranks"));
        }
        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in rank_text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(ChessError::fen(fen, format!("bad empty count '{}'", c)));
                    }
                    file += skip as usize;
                } else if let Some(piece) = fen_to_piece(c) {
                    if file >= 8 {
                        return Err(ChessError::fen(fen, format!("rank {} overflows", rank + 1)));
                    }
                    squares[rank * 8 + file] = piece;
                    file += 1;
                } else {
                    return Err(ChessError::fen(fen, format!("unknown piece '{}'", c)));
                }
            }
            if file != 8 {
                return Err(ChessError::fen(fen, format!("rank {} has {} files", rank + 1, file)));
            }
        }

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(ChessError::fen(fen, format!("bad side to move '{}'", other))),
        };

        let mut castling_rights = 0;
        if parts[2] != "-" {
            for c in parts[2].chars() {
                castling_rights |= match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    _ => return Err(ChessError::fen(fen, format!("bad castling flag '{}'", c))),
                };
            }
        }

        let en_passant = if parts[3] == "-" {
            None
        } else {
            let sq = parse_square(parts[3])
                .ok_or_else(|| ChessError::fen(fen, "bad en passant square"))?;
            let expected_rank = if side_to_move == Color::White { 5 } else { 2 };
            if sq / 8 != expected_rank {
                return Err(ChessError::fen(fen, "en passant square on wrong rank"));
            }
            // The pawn that just double-pushed sits behind the target square
            let pushed_to = if side_to_move == Color::White { sq - 8 } else { sq + 8 };
            if squares[sq] != EMPTY || squares[pushed_to] != make_piece(side_to_move.opposite(), PAWN) {
                return Err(ChessError::fen(fen, "no double-pushed pawn behind en passant square"));
            }
            Some(sq)
        };

        let halfmove_clock = match parts.get(4) {
            Some(text) => text
                .parse()
                .map_err(|_| ChessError::fen(fen, "bad halfmove clock"))?,
            None => 0,
        };
        let fullmove_number = match parts.get(5) {
            Some(text) => text
                .parse()
                .map_err(|_| ChessError::fen(fen, "bad fullmove number"))?,
            None => 1,
        };

        let position = Position {
            squares,
            side_to_move,
            castling_rights,
            en_passant,
            halfmove_clock,
            fullmove_number,
        };
        position
            .verify_invariants()
            .map_err(|e| ChessError::fen(fen, e.to_string()))?;
        Ok(position)
    }

    /// Generate FEN string from current position
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8).rev() {
            let mut empty_count = 0;
            for file in 0..8 {
                let piece = self.squares[rank * 8 + file];
                match piece_to_fen(piece) {
                    None => empty_count += 1,
                    Some(c) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(c);
                    }
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if self.side_to_move == Color::White { 'w' } else { 'b' });

        fen.push(' ');
        if self.castling_rights == 0 {
            fen.push('-');
        } else {
            if self.castling_rights & CASTLE_WK != 0 { fen.push('K'); }
            if self.castling_rights & CASTLE_WQ != 0 { fen.push('Q'); }
            if self.castling_rights & CASTLE_BK != 0 { fen.push('k'); }
            if self.castling_rights & CASTLE_BQ != 0 { fen.push('q'); }
        }

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&square_name(sq)),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }

    #[inline]
    pub fn piece_at(&self, sq: usize) -> u8 {
        self.squares[sq]
    }

    #[inline]
    pub fn squares(&self) -> &[u8; 64] {
        &self.squares
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> u8 {
        self.castling_rights
    }

    /// True if the given `CASTLE_*` right is still held
    #[inline]
    pub fn has_castling_right(&self, right: u8) -> bool {
        self.castling_rights & right != 0
    }

    #[inline]
    pub fn en_passant_square(&self) -> Option<usize> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Find the king's square for the specified color
    pub fn find_king(&self, color: Color) -> Option<usize> {
        let king = make_piece(color, KING);
        self.squares.iter().position(|&p| p == king)
    }

    /// True if `color`'s king is attacked by any opposing piece.
    /// A missing king counts as not in check.
    pub fn is_king_in_check(&self, color: Color) -> bool {
        match self.find_king(color) {
            Some(sq) => is_square_attacked(self, sq, color.opposite()),
            None => false,
        }
    }

    /// Check the structural invariants: exactly one king per colour, and the
    /// side that just moved has not left its king capturable.
    pub fn verify_invariants(&self) -> Result<()> {
        for color in [Color::White, Color::Black] {
            let king = make_piece(color, KING);
            let count = self.squares.iter().filter(|&&p| p == king).count();
            if count != 1 {
                return Err(ChessError::InvariantViolation(format!(
                    "{} has {} kings",
                    color, count
                )));
            }
        }
        if self.is_king_in_check(self.side_to_move.opposite()) {
            return Err(ChessError::InvariantViolation(format!(
                "{} to move can capture the opposing king",
                self.side_to_move
            )));
        }
        Ok(())
    }

    /// Apply a move after verifying it is in this position's legal-move set.
    /// On error the position is left untouched.
    pub fn apply(&mut self, mv: &Move) -> Result<UndoInfo> {
        let legal = MoveGenerator::new().legal_moves(self);
        if !legal.contains(mv) {
            return Err(ChessError::IllegalMove {
                mv: mv.to_uci(),
                fen: self.to_fen(),
            });
        }
        Ok(self.make_move(mv))
    }

    /// Revert a move applied with `apply`, restoring the exact prior state
    pub fn undo(&mut self, mv: &Move, undo: &UndoInfo) {
        self.unmake_move(mv, undo);
    }

    /// Execute a move without legality checking. Returns UndoInfo for undoing
    /// the move later.
    pub(crate) fn make_move(&mut self, mv: &Move) -> UndoInfo {
        let from_sq = mv.from_sq;
        let to_sq = mv.to_sq;
        let piece = self.squares[from_sq];
        let us = self.side_to_move;

        let undo = UndoInfo {
            captured_piece: if mv.is_en_passant() {
                make_piece(us.opposite(), PAWN)
            } else {
                self.squares[to_sq]
            },
            moved_piece: piece,
            castling_rights: self.castling_rights,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        };

        let piece_type = get_piece_type(piece);
        if piece_type == PAWN || undo.captured_piece != EMPTY {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        // The captured pawn sits beside the mover, one rank behind the target
        if mv.is_en_passant() {
            match us {
                Color::White => self.squares[to_sq - 8] = EMPTY,
                Color::Black => self.squares[to_sq + 8] = EMPTY,
            }
        }

        if mv.is_castling() {
            if let Some((rook_from, rook_to)) = castling_rook_squares(to_sq) {
                self.squares[rook_from] = EMPTY;
                self.squares[rook_to] = make_piece(us, ROOK);
            }
        }

        self.squares[to_sq] = if mv.promotion != EMPTY {
            make_piece(us, mv.promotion)
        } else {
            piece
        };
        self.squares[from_sq] = EMPTY;

        if piece_type == KING {
            self.castling_rights &= match us {
                Color::White => !(CASTLE_WK | CASTLE_WQ),
                Color::Black => !(CASTLE_BK | CASTLE_BQ),
            };
        }

        // A rook leaving or being captured on its home corner
        if from_sq == 0 || to_sq == 0 { self.castling_rights &= !CASTLE_WQ; }
        if from_sq == 7 || to_sq == 7 { self.castling_rights &= !CASTLE_WK; }
        if from_sq == 56 || to_sq == 56 { self.castling_rights &= !CASTLE_BQ; }
        if from_sq == 63 || to_sq == 63 { self.castling_rights &= !CASTLE_BK; }

        self.en_passant = if mv.is_double_push() {
            Some((from_sq + to_sq) / 2)
        } else {
            None
        };

        if us == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = us.opposite();

        undo
    }

    /// Undo a move using saved UndoInfo
    pub(crate) fn unmake_move(&mut self, mv: &Move, undo: &UndoInfo) {
        self.side_to_move = self.side_to_move.opposite();
        let us = self.side_to_move;

        let from_sq = mv.from_sq;
        let to_sq = mv.to_sq;

        self.squares[from_sq] = undo.moved_piece;

        if mv.is_en_passant() {
            self.squares[to_sq] = EMPTY;
            match us {
                Color::White => self.squares[to_sq - 8] = undo.captured_piece,
                Color::Black => self.squares[to_sq + 8] = undo.captured_piece,
            }
        } else {
            self.squares[to_sq] = undo.captured_piece;
        }

        if mv.is_castling() {
            if let Some((rook_from, rook_to)) = castling_rook_squares(to_sq) {
                self.squares[rook_to] = EMPTY;
                self.squares[rook_from] = make_piece(us, ROOK);
            }
        }

        self.castling_rights = undo.castling_rights;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
    }

    /// Display the position as a string
    pub fn display(&self) -> String {
        let mut lines = Vec::new();
        lines.push("  +---+---+---+---+---+---+---+---+".to_string());

        for rank in (0..8).rev() {
            let mut row = format!("{} |", rank + 1);
            for file in 0..8 {
                match piece_to_fen(self.squares[rank * 8 + file]) {
                    Some(c) => row.push_str(&format!(" {} |", c)),
                    None => row.push_str("   |"),
                }
            }
            lines.push(row);
            lines.push("  +---+---+---+---+---+---+---+---+".to_string());
        }
        lines.push("    a   b   c   d   e   f   g   h".to_string());

        lines.join("\n")
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
