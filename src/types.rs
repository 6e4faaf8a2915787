//! DuelChess - Type definitions and constants
//!
//! Square contents are packed into a single byte: the lower 3 bits hold the
//! piece kind and bits 3-4 hold the colour. Squares are indexed 0-63 with
//! 0 = a1 and 63 = h8.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Piece type constants (lower 3 bits)
pub const EMPTY: u8 = 0;
pub const PAWN: u8 = 1;
pub const KNIGHT: u8 = 2;
pub const BISHOP: u8 = 3;
pub const ROOK: u8 = 4;
pub const QUEEN: u8 = 5;
pub const KING: u8 = 6;

/// Color constants (bits 3-4)
pub const WHITE: u8 = 8;
pub const BLACK: u8 = 16;

/// Piece masks
pub const PIECE_MASK: u8 = 0b111;
pub const COLOR_MASK: u8 = 0b11000;

pub const WHITE_PAWN: u8 = WHITE | PAWN;
pub const WHITE_KNIGHT: u8 = WHITE | KNIGHT;
pub const WHITE_BISHOP: u8 = WHITE | BISHOP;
pub const WHITE_ROOK: u8 = WHITE | ROOK;
pub const WHITE_QUEEN: u8 = WHITE | QUEEN;
pub const WHITE_KING: u8 = WHITE | KING;

pub const BLACK_PAWN: u8 = BLACK | PAWN;
pub const BLACK_KNIGHT: u8 = BLACK | KNIGHT;
pub const BLACK_BISHOP: u8 = BLACK | BISHOP;
pub const BLACK_ROOK: u8 = BLACK | ROOK;
pub const BLACK_QUEEN: u8 = BLACK | QUEEN;
pub const BLACK_KING: u8 = BLACK | KING;

/// Pieces a pawn may promote to, in generation order
pub const PROMOTION_KINDS: [u8; 4] = [QUEEN, ROOK, BISHOP, KNIGHT];

/// Castling rights bitmasks
pub const CASTLE_WK: u8 = 1; // White kingside
pub const CASTLE_WQ: u8 = 2; // White queenside
pub const CASTLE_BK: u8 = 4; // Black kingside
pub const CASTLE_BQ: u8 = 8; // Black queenside
pub const CASTLE_ALL: u8 = CASTLE_WK | CASTLE_WQ | CASTLE_BK | CASTLE_BQ;

/// Move-kind tags. A move carries any combination of these
/// (a capturing promotion has both `FLAG_CAPTURE` and `FLAG_PROMOTION`).
pub const FLAG_CAPTURE: u8 = 1;
pub const FLAG_CASTLE_KINGSIDE: u8 = 2;
pub const FLAG_CASTLE_QUEENSIDE: u8 = 4;
pub const FLAG_EN_PASSANT: u8 = 8;
pub const FLAG_DOUBLE_PUSH: u8 = 16;
pub const FLAG_PROMOTION: u8 = 32;

/// File and rank names for coordinate notation
pub const FILE_NAMES: &[u8; 8] = b"abcdefgh";
pub const RANK_NAMES: &[u8; 8] = b"12345678";

/// Side in the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Colour bits used in the packed square encoding
    #[inline]
    pub fn bits(self) -> u8 {
        match self {
            Color::White => WHITE,
            Color::Black => BLACK,
        }
    }

    /// +1 for white, -1 for black. Multiplies a white-relative score into
    /// this side's point of view.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Index into per-colour tables (0 = white, 1 = black)
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// Extract piece type from piece value
#[inline]
pub fn get_piece_type(piece: u8) -> u8 {
    piece & PIECE_MASK
}

/// Extract colour bits from piece value
#[inline]
pub fn get_piece_color(piece: u8) -> u8 {
    piece & COLOR_MASK
}

/// Colour of a non-empty piece
#[inline]
pub fn piece_color(piece: u8) -> Option<Color> {
    match piece & COLOR_MASK {
        WHITE => Some(Color::White),
        BLACK => Some(Color::Black),
        _ => None,
    }
}

#[inline]
pub fn make_piece(color: Color, kind: u8) -> u8 {
    color.bits() | kind
}

/// Convert square index (0-63) to algebraic notation (e.g., "e4")
pub fn square_name(sq: usize) -> String {
    let file = sq % 8;
    let rank = sq / 8;
    format!("{}{}", FILE_NAMES[file] as char, RANK_NAMES[rank] as char)
}

/// Convert algebraic notation to square index
pub fn parse_square(name: &str) -> Option<usize> {
    let mut chars = name.chars();
    let file = match chars.next()? {
        c @ 'a'..='h' => (c as usize) - ('a' as usize),
        _ => return None,
    };
    let rank = match chars.next()? {
        c @ '1'..='8' => (c as usize) - ('1' as usize),
        _ => return None,
    };
    if chars.next().is_some() {
        return None;
    }
    Some(rank * 8 + file)
}

/// FEN piece character to piece value
pub fn fen_to_piece(c: char) -> Option<u8> {
    match c {
        'P' => Some(WHITE_PAWN),
        'N' => Some(WHITE_KNIGHT),
        'B' => Some(WHITE_BISHOP),
        'R' => Some(WHITE_ROOK),
        'Q' => Some(WHITE_QUEEN),
        'K' => Some(WHITE_KING),
        'p' => Some(BLACK_PAWN),
        'n' => Some(BLACK_KNIGHT),
        'b' => Some(BLACK_BISHOP),
        'r' => Some(BLACK_ROOK),
        'q' => Some(BLACK_QUEEN),
        'k' => Some(BLACK_KING),
        _ => None,
    }
}

/// Piece value to FEN character
pub fn piece_to_fen(piece: u8) -> Option<char> {
    match piece {
        WHITE_PAWN => Some('P'),
        WHITE_KNIGHT => Some('N'),
        WHITE_BISHOP => Some('B'),
        WHITE_ROOK => Some('R'),
        WHITE_QUEEN => Some('Q'),
        WHITE_KING => Some('K'),
        BLACK_PAWN => Some('p'),
        BLACK_KNIGHT => Some('n'),
        BLACK_BISHOP => Some('b'),
        BLACK_ROOK => Some('r'),
        BLACK_QUEEN => Some('q'),
        BLACK_KING => Some('k'),
        _ => None,
    }
}

/// Promotion piece kind to its lowercase coordinate-notation suffix
pub fn promotion_char(kind: u8) -> Option<char> {
    match kind {
        QUEEN => Some('q'),
        ROOK => Some('r'),
        BISHOP => Some('b'),
        KNIGHT => Some('n'),
        _ => None,
    }
}

/// Coordinate-notation promotion suffix to piece kind
pub fn promotion_from_char(c: char) -> Option<u8> {
    match c.to_ascii_lowercase() {
        'q' => Some(QUEEN),
        'r' => Some(ROOK),
        'b' => Some(BISHOP),
        'n' => Some(KNIGHT),
        _ => None,
    }
}
